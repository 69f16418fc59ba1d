use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct RankingEntry {
    pub(crate) rank: usize,
    pub(crate) student_id: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) points: i64,
    pub(crate) exams_taken: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RankingResponse {
    pub(crate) scope: String,
    pub(crate) generated_at: String,
    pub(crate) items: Vec<RankingEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ScoreDistribution {
    pub(crate) excellent: usize,
    pub(crate) good: usize,
    pub(crate) average: usize,
    pub(crate) fail: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ExamAnalyticsResponse {
    pub(crate) exam_id: String,
    pub(crate) title: String,
    pub(crate) attempt_count: usize,
    pub(crate) student_count: usize,
    pub(crate) average_score: f64,
    pub(crate) min_score: Option<i32>,
    pub(crate) max_score: Option<i32>,
    pub(crate) max_achievable_score: i32,
    pub(crate) distribution: ScoreDistribution,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ClassPerformance {
    pub(crate) class_id: String,
    pub(crate) class_name: String,
    pub(crate) student_count: usize,
    pub(crate) attempt_count: usize,
    pub(crate) average_score: f64,
    pub(crate) average_percentage: f64,
}
