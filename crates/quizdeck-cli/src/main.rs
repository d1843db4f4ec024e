//! quizdeck CLI — take and author school exam question sets.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use quizdeck_core::model::{ExamType, Filter, Grade, Semester, Subject};

mod commands;

#[derive(Parser)]
#[command(name = "quizdeck", version, about = "Exam practice quizzes and question set authoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Filter flags shared by the commands that work on one filter.
///
/// Unset flags fall back to the config's `default_filter`.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Grade (grade2, grade3, grade10, grade11, grade12)
    #[arg(long)]
    grade: Option<Grade>,

    /// Semester (sem1, sem2)
    #[arg(long)]
    semester: Option<Semester>,

    /// Exam type (mid, final)
    #[arg(long)]
    exam_type: Option<ExamType>,

    /// Subject (korean, math, english, science, social)
    #[arg(long)]
    subject: Option<Subject>,
}

impl FilterArgs {
    pub fn resolve(&self, default: Filter) -> Filter {
        Filter {
            grade: self.grade.unwrap_or(default.grade),
            semester: self.semester.unwrap_or(default.semester),
            exam_type: self.exam_type.unwrap_or(default.exam_type),
            subject: self.subject.unwrap_or(default.subject),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the question sets available for a filter
    Sets {
        #[command(flatten)]
        filter: FilterArgs,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Take a quiz and print the score
    Take {
        #[command(flatten)]
        filter: FilterArgs,

        /// Question set id or name
        #[arg(long)]
        set: String,

        /// Comma-separated answers; choice numbers start at 1 (prompts on stdin if omitted).
        /// Text answers containing commas need `--answer`
        #[arg(long)]
        answers: Option<String>,

        /// One answer, repeated once per question in order
        #[arg(long = "answer", conflicts_with = "answers")]
        answer: Vec<String>,

        /// Directory to write the JSON report to
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Edit a draft question set interactively over stdin
    Author {
        #[command(flatten)]
        filter: FilterArgs,

        /// Start from an exported draft file
        #[arg(long)]
        from: Option<PathBuf>,

        /// Draft title
        #[arg(long)]
        title: Option<String>,

        /// Directory `export` writes to
        #[arg(long, default_value = ".")]
        output: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Submit an exported draft file as a new question set
    Upload {
        #[command(flatten)]
        filter: FilterArgs,

        /// Exported draft JSON
        #[arg(long)]
        file: PathBuf,

        /// Set name (defaults to the draft title)
        #[arg(long)]
        name: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Push every set of a static data directory into the configured store
    Import {
        /// Directory holding `<grade>_<semester>_<examType>_<subject>/index.json` folders
        #[arg(long)]
        data: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate question set JSON files
    Validate {
        /// Path to a set file or directory
        #[arg(long)]
        path: PathBuf,
    },

    /// Create starter config and sample data
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quizdeck=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sets { filter, config } => commands::sets::execute(filter, config).await,
        Commands::Take {
            filter,
            set,
            answers,
            answer,
            output,
            config,
        } => commands::take::execute(filter, set, answers, answer, output, config).await,
        Commands::Author {
            filter,
            from,
            title,
            output,
            config,
        } => commands::author::execute(filter, from, title, output, config).await,
        Commands::Upload {
            filter,
            file,
            name,
            config,
        } => commands::upload::execute(filter, file, name, config).await,
        Commands::Import { data, config } => commands::import::execute(data, config).await,
        Commands::Validate { path } => commands::validate::execute(path),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
