use serde::{Deserialize, Serialize};

use crate::db::models::ExamAnswer;

pub(crate) const POINTS_PER_CORRECT: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct ExamResult {
    pub(crate) score: i32,
    pub(crate) correct_count: i32,
    /// Answered questions, not the size of the exam.
    pub(crate) total_questions: i32,
}

pub(crate) fn score_answers(answers: &[ExamAnswer]) -> ExamResult {
    let correct_count =
        answers.iter().filter(|answer| answer.is_correct == Some(true)).count() as i32;

    ExamResult {
        score: correct_count * POINTS_PER_CORRECT,
        correct_count,
        total_questions: answers.len() as i32,
    }
}

/// The exam's `total_points` override wins over the per-question default.
pub(crate) fn max_achievable_score(total_points: Option<i32>, question_count: i64) -> i32 {
    match total_points {
        Some(points) => points.max(0),
        None => (question_count.max(0) as i32).saturating_mul(POINTS_PER_CORRECT),
    }
}

pub(crate) fn percentage(score: i32, max_score: i32) -> f64 {
    if max_score <= 0 {
        return 0.0;
    }
    f64::from(score) * 100.0 / f64::from(max_score)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ScoreBand {
    Excellent,
    Good,
    Average,
    Fail,
}

impl ScoreBand {
    pub(crate) fn classify(score: i32, max_score: i32) -> Self {
        if max_score <= 0 {
            return Self::Fail;
        }
        Self::from_percentage(percentage(score, max_score))
    }

    pub(crate) fn from_percentage(value: f64) -> Self {
        if value >= 90.0 {
            Self::Excellent
        } else if value >= 70.0 {
            Self::Good
        } else if value >= 50.0 {
            Self::Average
        } else {
            Self::Fail
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::primitive_now_utc;

    fn answer(question_id: &str, is_correct: Option<bool>) -> ExamAnswer {
        let now = primitive_now_utc();
        ExamAnswer {
            id: format!("answer-{question_id}"),
            attempt_id: "attempt-1".to_string(),
            question_id: question_id.to_string(),
            selected_option_id: is_correct.map(|_| format!("option-{question_id}")),
            essay_text: if is_correct.is_none() { Some("essay".to_string()) } else { None },
            is_correct,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn scores_ten_points_per_correct_answer() {
        let answers =
            vec![answer("q1", Some(true)), answer("q2", Some(false)), answer("q3", Some(true))];

        let result = score_answers(&answers);
        assert_eq!(result, ExamResult { score: 20, correct_count: 2, total_questions: 3 });
    }

    #[test]
    fn pending_essays_count_as_answered_but_not_correct() {
        let answers = vec![answer("q1", None), answer("q2", Some(true))];

        let result = score_answers(&answers);
        assert_eq!(result.score, 10);
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.total_questions, 2);
    }

    #[test]
    fn empty_attempt_scores_zero() {
        assert_eq!(
            score_answers(&[]),
            ExamResult { score: 0, correct_count: 0, total_questions: 0 }
        );
    }

    #[test]
    fn max_score_prefers_override() {
        assert_eq!(max_achievable_score(Some(75), 3), 75);
        assert_eq!(max_achievable_score(None, 4), 40);
        assert_eq!(max_achievable_score(None, 0), 0);
    }

    #[test]
    fn bands_follow_percentage_thresholds() {
        assert_eq!(ScoreBand::classify(90, 100), ScoreBand::Excellent);
        assert_eq!(ScoreBand::classify(89, 100), ScoreBand::Good);
        assert_eq!(ScoreBand::classify(70, 100), ScoreBand::Good);
        assert_eq!(ScoreBand::classify(50, 100), ScoreBand::Average);
        assert_eq!(ScoreBand::classify(49, 100), ScoreBand::Fail);
        assert_eq!(ScoreBand::classify(10, 0), ScoreBand::Fail);
    }
}
