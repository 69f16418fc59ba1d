use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime,
    PrimitiveDateTime,
};
use validator::Validate;

pub(crate) use crate::core::time::format_primitive;
use crate::db::models::{Exam, Question, QuestionOption};
use crate::db::types::{ExamLifecycle, QuestionType};
use crate::services::exam_status::ExamStatus;
use crate::store::QuestionWithOptions;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct OptionCreate {
    #[validate(length(min = 1, message = "option content must not be empty"))]
    pub(crate) content: String,
    #[serde(default, alias = "isCorrect")]
    pub(crate) is_correct: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub(crate) content: String,
    #[serde(alias = "questionType")]
    pub(crate) question_type: QuestionType,
    #[serde(default, alias = "orderIndex")]
    #[validate(range(min = 0, message = "order_index must be non-negative"))]
    pub(crate) order_index: Option<i32>,
    #[serde(default = "default_points")]
    #[validate(range(min = 0, message = "points must be non-negative"))]
    pub(crate) points: i32,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) options: Vec<OptionCreate>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamCreate {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(
        default,
        alias = "startTime",
        deserialize_with = "deserialize_option_offset_datetime_flexible"
    )]
    pub(crate) start_time: Option<OffsetDateTime>,
    #[serde(
        default,
        alias = "endTime",
        deserialize_with = "deserialize_option_offset_datetime_flexible"
    )]
    pub(crate) end_time: Option<OffsetDateTime>,
    #[serde(alias = "durationMinutes")]
    #[validate(range(min = 1, message = "duration_minutes must be positive"))]
    pub(crate) duration_minutes: i32,
    #[serde(default, alias = "randomizeQuestions")]
    pub(crate) randomize_questions: bool,
    #[serde(default)]
    #[validate(length(max = 128, message = "category must be at most 128 characters"))]
    pub(crate) category: Option<String>,
    #[serde(default, alias = "totalPoints")]
    #[validate(range(min = 0, message = "total_points must be non-negative"))]
    pub(crate) total_points: Option<i32>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) questions: Vec<QuestionCreate>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(
        default,
        alias = "startTime",
        deserialize_with = "deserialize_option_offset_datetime_flexible"
    )]
    pub(crate) start_time: Option<OffsetDateTime>,
    #[serde(
        default,
        alias = "endTime",
        deserialize_with = "deserialize_option_offset_datetime_flexible"
    )]
    pub(crate) end_time: Option<OffsetDateTime>,
    #[serde(default, alias = "durationMinutes")]
    #[validate(range(min = 1, message = "duration_minutes must be positive"))]
    pub(crate) duration_minutes: Option<i32>,
    #[serde(default, alias = "randomizeQuestions")]
    pub(crate) randomize_questions: Option<bool>,
    #[serde(default)]
    #[validate(length(max = 128, message = "category must be at most 128 characters"))]
    pub(crate) category: Option<String>,
    #[serde(default, alias = "totalPoints")]
    #[validate(range(min = 0, message = "total_points must be non-negative"))]
    pub(crate) total_points: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) start_time: Option<String>,
    pub(crate) end_time: Option<String>,
    pub(crate) duration_minutes: i32,
    pub(crate) randomize_questions: bool,
    pub(crate) category: Option<String>,
    pub(crate) lifecycle: ExamLifecycle,
    pub(crate) status: ExamStatus,
    pub(crate) total_points: Option<i32>,
    pub(crate) max_score: i32,
    pub(crate) question_count: i64,
    pub(crate) created_by: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ExamResponse {
    pub(crate) fn from_db(exam: Exam, status: ExamStatus, question_count: i64) -> Self {
        Self {
            max_score: crate::services::scoring::max_achievable_score(
                exam.total_points,
                question_count,
            ),
            id: exam.id,
            title: exam.title,
            description: exam.description,
            start_time: exam.start_time.map(format_primitive),
            end_time: exam.end_time.map(format_primitive),
            duration_minutes: exam.duration_minutes,
            randomize_questions: exam.randomize_questions,
            category: exam.category,
            lifecycle: exam.lifecycle,
            status,
            total_points: exam.total_points,
            question_count,
            created_by: exam.created_by,
            created_at: format_primitive(exam.created_at),
            updated_at: format_primitive(exam.updated_at),
        }
    }
}

/// Option as shown to the exam author and in reviews, correctness included.
#[derive(Debug, Serialize)]
pub(crate) struct OptionResponse {
    pub(crate) id: String,
    pub(crate) content: String,
    pub(crate) position: i32,
    pub(crate) is_correct: bool,
}

impl From<QuestionOption> for OptionResponse {
    fn from(option: QuestionOption) -> Self {
        Self {
            id: option.id,
            content: option.content,
            position: option.position,
            is_correct: option.is_correct,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) content: String,
    pub(crate) question_type: QuestionType,
    pub(crate) order_index: i32,
    pub(crate) points: i32,
    pub(crate) created_at: String,
    pub(crate) options: Vec<OptionResponse>,
}

impl From<QuestionWithOptions> for QuestionResponse {
    fn from(entry: QuestionWithOptions) -> Self {
        let QuestionWithOptions { question, options } = entry;
        Self {
            id: question.id,
            exam_id: question.exam_id,
            content: question.content,
            question_type: question.question_type,
            order_index: question.order_index,
            points: question.points,
            created_at: format_primitive(question.created_at),
            options: options.into_iter().map(OptionResponse::from).collect(),
        }
    }
}

/// Option as shown while taking the exam. Carries no correctness flag.
#[derive(Debug, Serialize)]
pub(crate) struct TakingOptionResponse {
    pub(crate) id: String,
    pub(crate) content: String,
    pub(crate) position: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct TakingQuestionResponse {
    pub(crate) id: String,
    pub(crate) content: String,
    pub(crate) question_type: QuestionType,
    pub(crate) order_index: i32,
    pub(crate) points: i32,
    pub(crate) options: Vec<TakingOptionResponse>,
}

impl From<QuestionWithOptions> for TakingQuestionResponse {
    fn from(entry: QuestionWithOptions) -> Self {
        let QuestionWithOptions { question, options } = entry;
        let Question { id, content, question_type, order_index, points, .. } = question;
        Self {
            id,
            content,
            question_type,
            order_index,
            points,
            options: options
                .into_iter()
                .map(|option| TakingOptionResponse {
                    id: option.id,
                    content: option.content,
                    position: option.position,
                })
                .collect(),
        }
    }
}

fn default_points() -> i32 {
    crate::services::scoring::POINTS_PER_CORRECT
}

fn parse_offset_datetime_flexible(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value);
    }

    // datetime-local inputs arrive without a zone; read them as UTC.
    if let Ok(value) =
        PrimitiveDateTime::parse(raw, &format_description!("[year]-[month]-[day]T[hour]:[minute]"))
    {
        return Some(value.assume_utc());
    }
    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(value.assume_utc());
    }

    None
}

fn deserialize_option_offset_datetime_flexible<'de, D>(
    deserializer: D,
) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        Some(value) => parse_offset_datetime_flexible(&value)
            .ok_or_else(|| D::Error::custom(format!("invalid datetime: {value}")))
            .map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exam_create_accepts_local_and_rfc3339_times() {
        let payload = serde_json::json!({
            "title": "Algebra",
            "startTime": "2025-03-01T09:00",
            "end_time": "2025-03-01T11:00:00+02:00",
            "duration_minutes": 60
        });

        let parsed: ExamCreate = serde_json::from_value(payload).expect("exam create");
        let start = parsed.start_time.expect("start");
        let end = parsed.end_time.expect("end");
        assert_eq!(start.hour(), 9);
        assert_eq!(end.to_offset(time::UtcOffset::UTC).hour(), 9);
        assert!(!parsed.randomize_questions);
        assert!(parsed.questions.is_empty());
    }

    #[test]
    fn exam_create_rejects_garbage_time() {
        let payload = serde_json::json!({
            "title": "Algebra",
            "start_time": "tomorrow",
            "duration_minutes": 60
        });
        assert!(serde_json::from_value::<ExamCreate>(payload).is_err());
    }

    #[test]
    fn question_points_default_to_ten() {
        let payload = serde_json::json!({
            "content": "2 + 2?",
            "question_type": "multiple_choice",
            "options": [{"content": "4", "is_correct": true}, {"content": "5"}]
        });
        let parsed: QuestionCreate = serde_json::from_value(payload).expect("question");
        assert_eq!(parsed.points, 10);
        assert!(parsed.options[0].is_correct);
        assert!(!parsed.options[1].is_correct);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn validation_flags_empty_title() {
        let payload = serde_json::json!({ "title": "", "duration_minutes": 30 });
        let parsed: ExamCreate = serde_json::from_value(payload).expect("exam create");
        assert!(parsed.validate().is_err());
    }
}
