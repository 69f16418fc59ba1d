pub(crate) mod attempt_engine;
pub(crate) mod exam_status;
pub(crate) mod question_selection;
pub(crate) mod ranking;
pub(crate) mod scoring;
