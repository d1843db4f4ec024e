//! Scoring of answered question lists.

use serde::{Deserialize, Serialize};

use crate::model::{AnswerValue, Question};

/// Result of comparing answers against a question list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    /// Questions answered correctly.
    pub correct: usize,
    /// Questions scored.
    pub total: usize,
}

impl ScoreCard {
    /// Percentage rounded to the nearest integer; 0 when nothing was scored.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.correct as f64 / self.total as f64 * 100.0).round() as u32
    }
}

/// Whether `given` matches the question's answer.
///
/// Both sides are compared by their string form, so a choice index `1` and
/// the text `"1"` are equal.
pub fn is_correct(question: &Question, given: &AnswerValue) -> bool {
    given.as_compare_string() == question.answer.as_compare_string()
}

/// Count correct answers. Missing answers count as wrong.
pub fn score(questions: &[Question], answers: &[AnswerValue]) -> ScoreCard {
    let correct = questions
        .iter()
        .enumerate()
        .filter(|(i, q)| answers.get(*i).is_some_and(|a| is_correct(q, a)))
        .count();

    ScoreCard {
        correct,
        total: questions.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionType;

    fn objective(answer: usize) -> Question {
        Question {
            question: "q".into(),
            choices: vec!["a".into(), "b".into(), "c".into()],
            answer: AnswerValue::Choice(answer),
            ..Question::template()
        }
    }

    #[test]
    fn scenario_two_of_three() {
        let questions = vec![objective(1), objective(0), objective(2)];
        let answers = vec![
            AnswerValue::Choice(1),
            AnswerValue::Choice(1),
            AnswerValue::Choice(2),
        ];
        let card = score(&questions, &answers);
        assert_eq!(card, ScoreCard { correct: 2, total: 3 });
        assert_eq!(card.percent(), 67);
    }

    #[test]
    fn empty_set_scores_zero_percent() {
        let card = score(&[], &[]);
        assert_eq!(card.total, 0);
        assert_eq!(card.percent(), 0);
    }

    #[test]
    fn unset_answers_are_wrong() {
        let questions = vec![objective(0), objective(0)];
        let card = score(&questions, &[AnswerValue::unset(), AnswerValue::Choice(0)]);
        assert_eq!(card.correct, 1);
        assert_eq!(card.percent(), 50);
    }

    #[test]
    fn compares_string_forms() {
        let mut q = objective(2);
        assert!(is_correct(&q, &AnswerValue::Text("2".into())));

        q.kind = QuestionType::Subjective;
        q.answer = AnswerValue::Text("서울".into());
        assert!(is_correct(&q, &AnswerValue::Text("서울".into())));
        assert!(!is_correct(&q, &AnswerValue::Text("서울 ".into())));
    }

    #[test]
    fn short_answer_list_never_exceeds_total() {
        let questions = vec![objective(0), objective(1), objective(2)];
        let card = score(&questions, &[AnswerValue::Choice(0)]);
        assert!(card.correct <= card.total);
        assert_eq!(card.correct, 1);
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(ScoreCard { correct: 1, total: 8 }.percent(), 13);
        assert_eq!(ScoreCard { correct: 1, total: 3 }.percent(), 33);
        assert_eq!(ScoreCard { correct: 3, total: 3 }.percent(), 100);
    }
}
