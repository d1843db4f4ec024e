//! The `quizdeck take` command.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use quizdeck_core::context::QuizContext;
use quizdeck_core::messages;
use quizdeck_core::model::{AnswerValue, Question, QuestionType};
use quizdeck_core::report::QuizReport;

use crate::FilterArgs;

pub async fn execute(
    filter: FilterArgs,
    set_key: String,
    answers: Option<String>,
    answer: Vec<String>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (config, store) = super::open_store(config_path.as_deref())?;
    let filter = filter.resolve(config.default_filter);

    let mut ctx = QuizContext::new(filter).with_timeout(config.request_timeout());
    if ctx.refresh_sets(store.as_ref()).await.is_empty() {
        anyhow::bail!(
            "{}",
            ctx.sets_error().unwrap_or(messages::NO_SETS_AVAILABLE)
        );
    }

    if let Err(e) = ctx.select_set(store.as_ref(), &set_key).await {
        let message = ctx
            .session()
            .error()
            .unwrap_or(messages::LOAD_QUESTIONS_FAILED)
            .to_string();
        return Err(anyhow::Error::new(e).context(message));
    }

    let questions = ctx.session().questions().to_vec();
    let given = if !answer.is_empty() {
        parse_answers(&questions, &answer)?
    } else if let Some(list) = answers {
        parse_answer_list(&questions, &list)?
    } else {
        let stdin = io::stdin();
        prompt_answers(&questions, &mut stdin.lock(), &mut io::stdout())?
    };

    let session = ctx.session_mut();
    for (i, answer) in given.into_iter().enumerate() {
        session.record_answer(i, answer);
    }
    session.submit();

    let report = QuizReport::from_session(ctx.session(), filter)?;
    print_report(&report);

    if let Some(dir) = output {
        let path = dir.join(report.file_name());
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

/// Parse one answer token. Objective answers are 1-based choice numbers.
/// A blank token leaves the question unanswered.
fn parse_answer(question: &Question, token: &str) -> Result<AnswerValue> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(AnswerValue::unset());
    }
    match question.kind {
        QuestionType::Objective => {
            let n: usize = token
                .parse()
                .with_context(|| format!("'{token}' is not a choice number"))?;
            anyhow::ensure!(
                (1..=question.choices.len()).contains(&n),
                "choice {n} out of range (1-{})",
                question.choices.len()
            );
            Ok(AnswerValue::Choice(n - 1))
        }
        QuestionType::Subjective => Ok(AnswerValue::Text(token.to_string())),
    }
}

/// `--answers 2,서울,` form. Text answers cannot contain commas here.
fn parse_answer_list(questions: &[Question], list: &str) -> Result<Vec<AnswerValue>> {
    let tokens: Vec<&str> = list.split(',').collect();
    parse_answers(questions, &tokens)
}

/// One token per question, in order.
fn parse_answers(questions: &[Question], tokens: &[impl AsRef<str>]) -> Result<Vec<AnswerValue>> {
    anyhow::ensure!(
        tokens.len() <= questions.len(),
        "{} answers given for {} questions",
        tokens.len(),
        questions.len()
    );
    tokens
        .iter()
        .zip(questions)
        .enumerate()
        .map(|(i, (token, q))| {
            parse_answer(q, token.as_ref()).with_context(|| format!("answer {}", i + 1))
        })
        .collect()
}

fn prompt_answers(
    questions: &[Question],
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<Vec<AnswerValue>> {
    let mut answers = Vec::with_capacity(questions.len());
    for (i, q) in questions.iter().enumerate() {
        writeln!(out)?;
        if !q.passage_title.is_empty() {
            writeln!(out, "[{}]", q.passage_title)?;
        }
        if !q.passage.is_empty() {
            writeln!(out, "{}", q.passage)?;
        }
        if q.has_image() {
            writeln!(out, "(image attached)")?;
        }
        writeln!(out, "{}. {}", i + 1, q.question)?;
        if q.is_objective() {
            for (c, choice) in q.choices.iter().enumerate() {
                writeln!(out, "  {}) {choice}", c + 1)?;
            }
        }

        loop {
            write!(out, "> ")?;
            out.flush()?;
            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                answers.resize(questions.len(), AnswerValue::unset());
                return Ok(answers);
            }
            match parse_answer(q, &line) {
                Ok(answer) => {
                    answers.push(answer);
                    break;
                }
                Err(e) => writeln!(out, "{e:#}")?,
            }
        }
    }
    Ok(answers)
}

fn print_report(report: &QuizReport) {
    println!(
        "{}",
        messages::score_line(report.percent, report.correct, report.total)
    );

    let mut table = Table::new();
    table.set_header(vec!["#", "Your answer", "Correct answer", "Result"]);
    for item in &report.items {
        table.add_row(vec![
            Cell::new(item.number),
            Cell::new(&item.your_answer),
            Cell::new(&item.correct_answer),
            Cell::new(if item.is_correct {
                messages::CORRECT
            } else {
                messages::INCORRECT
            }),
        ]);
    }
    println!("{table}");

    for item in report.items.iter().filter(|i| !i.explanation.is_empty()) {
        println!("{}. {}", item.number, item.explanation);
    }
}
