//! Read-only folds over finalized attempts: leaderboards, per-exam analytics and
//! per-class rollups.

use std::collections::{BTreeMap, HashMap, HashSet};

use time::{Duration, PrimitiveDateTime};

use crate::db::models::{FinalizedAttemptRow, SchoolClass};
use crate::schemas::ranking::{
    ClassPerformance, ExamAnalyticsResponse, RankingEntry, ScoreDistribution,
};
use crate::services::scoring::{self, ScoreBand};

pub(crate) const WEEKLY_WINDOW: Duration = Duration::days(7);

pub(crate) fn weekly_cutoff(now: PrimitiveDateTime) -> PrimitiveDateTime {
    now - WEEKLY_WINDOW
}

struct StudentTotals<'a> {
    username: &'a str,
    full_name: &'a str,
    best_by_exam: HashMap<&'a str, i32>,
}

/// Sum of each student's best score per exam, highest first. Equal totals share a
/// rank and the next rank skips accordingly ("1224").
pub(crate) fn rank_students(rows: &[FinalizedAttemptRow], limit: usize) -> Vec<RankingEntry> {
    let mut totals: HashMap<&str, StudentTotals<'_>> = HashMap::new();
    for row in rows {
        let entry = totals.entry(row.student_id.as_str()).or_insert_with(|| StudentTotals {
            username: &row.username,
            full_name: &row.full_name,
            best_by_exam: HashMap::new(),
        });
        let best = entry.best_by_exam.entry(row.exam_id.as_str()).or_insert(row.score);
        if row.score > *best {
            *best = row.score;
        }
    }

    let mut entries: Vec<RankingEntry> = totals
        .into_iter()
        .map(|(student_id, totals)| RankingEntry {
            rank: 0,
            student_id: student_id.to_string(),
            username: totals.username.to_string(),
            full_name: totals.full_name.to_string(),
            points: totals.best_by_exam.values().map(|score| i64::from(*score)).sum(),
            exams_taken: totals.best_by_exam.len(),
        })
        .collect();

    entries.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| a.username.cmp(&b.username))
            .then_with(|| a.student_id.cmp(&b.student_id))
    });

    let mut previous: Option<i64> = None;
    let mut current_rank = 0;
    for (index, entry) in entries.iter_mut().enumerate() {
        if previous != Some(entry.points) {
            current_rank = index + 1;
            previous = Some(entry.points);
        }
        entry.rank = current_rank;
    }

    entries.truncate(limit);
    entries
}

pub(crate) fn exam_analytics(
    exam_id: &str,
    title: &str,
    max_achievable_score: i32,
    rows: &[FinalizedAttemptRow],
) -> ExamAnalyticsResponse {
    let rows: Vec<&FinalizedAttemptRow> = rows.iter().filter(|row| row.exam_id == exam_id).collect();
    let students: HashSet<&str> = rows.iter().map(|row| row.student_id.as_str()).collect();

    let mut distribution = ScoreDistribution::default();
    for row in &rows {
        match ScoreBand::classify(row.score, max_achievable_score) {
            ScoreBand::Excellent => distribution.excellent += 1,
            ScoreBand::Good => distribution.good += 1,
            ScoreBand::Average => distribution.average += 1,
            ScoreBand::Fail => distribution.fail += 1,
        }
    }

    let average_score = if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|row| f64::from(row.score)).sum::<f64>() / rows.len() as f64
    };

    ExamAnalyticsResponse {
        exam_id: exam_id.to_string(),
        title: title.to_string(),
        attempt_count: rows.len(),
        student_count: students.len(),
        average_score,
        min_score: rows.iter().map(|row| row.score).min(),
        max_score: rows.iter().map(|row| row.score).max(),
        max_achievable_score,
        distribution,
    }
}

#[derive(Default)]
struct ClassTotals<'a> {
    students: HashSet<&'a str>,
    attempts: usize,
    score_sum: f64,
    percentage_sum: f64,
}

/// One entry per class, ordered by class name. Classes without finalized attempts
/// report zeros.
pub(crate) fn class_performance(
    classes: &[SchoolClass],
    rows: &[FinalizedAttemptRow],
) -> Vec<ClassPerformance> {
    let mut totals: BTreeMap<&str, ClassTotals<'_>> = BTreeMap::new();
    for row in rows {
        let Some(class_id) = row.class_id.as_deref() else {
            continue;
        };
        let entry = totals.entry(class_id).or_default();
        entry.students.insert(row.student_id.as_str());
        entry.attempts += 1;
        entry.score_sum += f64::from(row.score);
        entry.percentage_sum += scoring::percentage(row.score, row.max_score);
    }

    let mut result: Vec<ClassPerformance> = classes
        .iter()
        .map(|class| {
            let entry = totals.remove(class.id.as_str()).unwrap_or_default();
            let (average_score, average_percentage) = if entry.attempts == 0 {
                (0.0, 0.0)
            } else {
                let count = entry.attempts as f64;
                (entry.score_sum / count, entry.percentage_sum / count)
            };
            ClassPerformance {
                class_id: class.id.clone(),
                class_name: class.name.clone(),
                student_count: entry.students.len(),
                attempt_count: entry.attempts,
                average_score,
                average_percentage,
            }
        })
        .collect();

    result.sort_by(|a, b| a.class_name.cmp(&b.class_name).then_with(|| a.class_id.cmp(&b.class_id)));
    result
}
