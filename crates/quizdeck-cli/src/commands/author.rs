//! The `quizdeck author` command: a line-oriented draft editor.
//!
//! Question and choice numbers typed by the user start at 1.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use quizdeck_core::draft::{Draft, DraftField};
use quizdeck_core::error::DraftError;
use quizdeck_core::messages;
use quizdeck_core::model::Filter;
use quizdeck_core::traits::QuestionStore;

use crate::FilterArgs;

const HELP: &str = "\
commands:
  title <text>                    set the draft title
  add                             append a blank question
  remove <q>                      remove question q
  set <q> <field> <value>         fields: passageTitle passage question answer explanation type
  choice <q> <c> <text>           set choice c of question q
  add-choice <q>                  append an empty choice
  remove-choice <q> <c>           remove choice c
  image <q> <path>                attach an image file
  clear-image <q>                 remove the image
  show                            print the draft as JSON
  export [dir]                    write <filter>_set.json
  submit [name]                   send the draft to the store
  quit                            leave the editor";

pub async fn execute(
    filter: FilterArgs,
    from: Option<PathBuf>,
    title: Option<String>,
    output: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (config, store) = super::open_store(config_path.as_deref())?;
    let filter = filter.resolve(config.default_filter);

    let mut draft = match &from {
        Some(path) => Draft::load_export(path)?,
        None => Draft::with_template_question(),
    };
    if let Some(title) = title {
        draft.set_title(title);
    }

    let mut editor = Editor {
        draft,
        filter,
        output,
        store: store.as_ref(),
    };

    println!("{}", filter.heading());
    println!("Type `help` for commands.");
    let stdin = io::stdin();
    editor.run(&mut stdin.lock(), &mut io::stdout()).await
}

enum Flow {
    Continue,
    Quit,
}

struct Editor<'a> {
    draft: Draft,
    filter: Filter,
    output: PathBuf,
    store: &'a dyn QuestionStore,
}

impl Editor<'_> {
    async fn run(&mut self, input: &mut impl BufRead, out: &mut impl Write) -> Result<()> {
        loop {
            write!(out, "author> ")?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                return Ok(());
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match self.handle(line, out).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => return Ok(()),
                Err(e) => writeln!(out, "error: {e:#}")?,
            }
        }
    }

    async fn handle(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        let (command, rest) = split_word(line);
        match command {
            "help" => writeln!(out, "{HELP}")?,
            "quit" | "exit" => return Ok(Flow::Quit),
            "title" => {
                self.draft.set_title(rest);
                writeln!(out, "title: {rest}")?;
            }
            "add" => {
                let len = self.draft.add_question();
                writeln!(out, "question {len} added")?;
            }
            "remove" => {
                let q = parse_number(rest, "question")?;
                if self.draft.remove_question(q) {
                    writeln!(out, "question {} removed", q + 1)?;
                } else {
                    writeln!(out, "no question {}", q + 1)?;
                }
            }
            "set" => {
                let (q, rest) = split_word(rest);
                let (field, value) = split_word(rest);
                let q = parse_number(q, "question")?;
                let field: DraftField = field.parse()?;
                self.set_field(q, field, value)?;
                writeln!(out, "question {} {field} updated", q + 1)?;
            }
            "choice" => {
                let (q, rest) = split_word(rest);
                let (c, text) = split_word(rest);
                let q = parse_number(q, "question")?;
                let c = parse_number(c, "choice")?;
                self.draft.update_choice(q, c, text)?;
                writeln!(out, "question {} choice {} updated", q + 1, c + 1)?;
            }
            "add-choice" => {
                let q = parse_number(rest, "question")?;
                let count = self.draft.add_choice(q)?;
                writeln!(out, "question {} now has {count} choices", q + 1)?;
            }
            "remove-choice" => {
                let (q, c) = split_word(rest);
                let q = parse_number(q, "question")?;
                let c = parse_number(c, "choice")?;
                self.draft.remove_choice(q, c)?;
                writeln!(out, "question {} choice {} removed", q + 1, c + 1)?;
            }
            "image" => {
                let (q, path) = split_word(rest);
                let q = parse_number(q, "question")?;
                anyhow::ensure!(!path.is_empty(), "usage: image <q> <path>");
                self.draft.attach_image(q, Path::new(path)).await?;
                writeln!(out, "image attached to question {}", q + 1)?;
            }
            "clear-image" => {
                let q = parse_number(rest, "question")?;
                self.draft.clear_image(q)?;
                writeln!(out, "image removed from question {}", q + 1)?;
            }
            "show" => writeln!(out, "{}", self.draft.to_json()?)?,
            "export" => {
                let dir = if rest.is_empty() {
                    self.output.clone()
                } else {
                    PathBuf::from(rest)
                };
                let path = self.draft.save_export(&dir, &self.filter)?;
                writeln!(out, "exported to {}", path.display())?;
            }
            "submit" => {
                let name = if rest.is_empty() {
                    self.draft.title().to_string()
                } else {
                    rest.to_string()
                };
                self.submit(&name, out).await?;
            }
            other => anyhow::bail!("unknown command '{other}' (try `help`)"),
        }
        Ok(Flow::Continue)
    }

    /// `answer` on an objective question is a 1-based choice number.
    fn set_field(&mut self, q: usize, field: DraftField, value: &str) -> Result<()> {
        let objective = self
            .draft
            .questions()
            .get(q)
            .map(|question| question.is_objective())
            .ok_or(DraftError::QuestionOutOfRange {
                index: q,
                len: self.draft.len(),
            })?;

        if field == DraftField::Answer && objective {
            let choice = parse_number(value, "choice")?;
            self.draft
                .update_field(q, field, &choice.to_string())?;
        } else {
            self.draft.update_field(q, field, value)?;
        }
        Ok(())
    }

    async fn submit(&mut self, name: &str, out: &mut impl Write) -> Result<()> {
        match self.draft.submit_draft(self.store, &self.filter, name).await {
            Ok(id) => writeln!(out, "submitted as {id}")?,
            Err(e) => match e.downcast_ref::<DraftError>() {
                Some(DraftError::MissingTitle) => writeln!(out, "{}", messages::TITLE_REQUIRED)?,
                Some(DraftError::EmptyDraft) => writeln!(out, "{e}")?,
                _ => writeln!(out, "{} ({e:#})", messages::SUBMIT_FAILED)?,
            },
        }
        Ok(())
    }
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    }
}

/// Parse a 1-based number typed by the user into a 0-based index.
fn parse_number(s: &str, what: &str) -> Result<usize> {
    let n: usize = s
        .trim()
        .parse()
        .with_context(|| format!("expected a {what} number, got '{s}'"))?;
    anyhow::ensure!(n >= 1, "{what} numbers start at 1");
    Ok(n - 1)
}
