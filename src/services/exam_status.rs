use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::db::types::ExamLifecycle;

/// Projected state of an exam. Never persisted; derived on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ExamStatus {
    Draft,
    Active,
    Closed,
}

pub(crate) fn compute_status(
    lifecycle: ExamLifecycle,
    start_time: Option<PrimitiveDateTime>,
    end_time: Option<PrimitiveDateTime>,
    now: PrimitiveDateTime,
) -> ExamStatus {
    if lifecycle == ExamLifecycle::Draft {
        return ExamStatus::Draft;
    }

    let (Some(start), Some(end)) = (start_time, end_time) else {
        return ExamStatus::Draft;
    };

    if now >= end {
        ExamStatus::Closed
    } else if now > start {
        ExamStatus::Active
    } else {
        ExamStatus::Draft
    }
}

pub(crate) fn validate_schedule(
    start_time: Option<PrimitiveDateTime>,
    end_time: Option<PrimitiveDateTime>,
) -> Result<(), String> {
    match (start_time, end_time) {
        (Some(start), Some(end)) if end <= start => {
            Err("end_time must be after start_time".to_string())
        }
        _ => Ok(()),
    }
}
