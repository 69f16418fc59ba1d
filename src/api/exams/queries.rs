use serde::Deserialize;

use crate::api::pagination::PageParams;
use crate::services::exam_status::ExamStatus;

#[derive(Debug, Deserialize)]
pub(super) struct ListExamsQuery {
    #[serde(default)]
    skip: i64,
    #[serde(default = "crate::api::pagination::default_limit")]
    limit: i64,
    /// Filters on the projected status, not the stored lifecycle.
    #[serde(default)]
    pub(super) status: Option<ExamStatus>,
}

impl ListExamsQuery {
    pub(super) fn page(&self) -> PageParams {
        PageParams { skip: self.skip, limit: self.limit }.normalized()
    }
}
