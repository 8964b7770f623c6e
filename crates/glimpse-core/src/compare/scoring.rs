//! Performance statistics over a finished comparison.

use crate::types::{ComparisonResult, ComparisonStatus, PerformanceStats};

/// Weight of confidence in the recommendation score.
const CONFIDENCE_WEIGHT: f64 = 0.7;
/// Weight of relative speed in the recommendation score.
const SPEED_WEIGHT: f64 = 0.3;

/// One completed entry reduced to what scoring needs.
struct Scored<'a> {
    identifier: &'a str,
    confidence: f64,
    duration_ms: u64,
}

/// Compute stats over the completed entries.
///
/// Returns `None` when no entry completed. Ties are broken in favour of the
/// entry that appears first.
pub fn compute_stats(results: &[ComparisonResult]) -> Option<PerformanceStats> {
    let completed: Vec<Scored<'_>> = results
        .iter()
        .filter(|r| r.status == ComparisonStatus::Completed)
        .filter_map(|r| {
            let result = r.result.as_ref()?;
            Some(Scored {
                identifier: &r.model_identifier,
                confidence: f64::from(result.confidence),
                duration_ms: r.duration_ms.unwrap_or(0),
            })
        })
        .collect();

    let first = completed.first()?;

    let total_duration: u64 = completed.iter().map(|s| s.duration_ms).sum();
    let max_duration = completed.iter().map(|s| s.duration_ms).max().unwrap_or(0);

    let mut fastest = first;
    let mut most_accurate = first;
    let mut recommended = first;
    let mut best_score = score(first, max_duration);

    for entry in &completed[1..] {
        if entry.duration_ms < fastest.duration_ms {
            fastest = entry;
        }
        if entry.confidence > most_accurate.confidence {
            most_accurate = entry;
        }
        let s = score(entry, max_duration);
        if s > best_score {
            best_score = s;
            recommended = entry;
        }
    }

    Some(PerformanceStats {
        total_models: results.len(),
        completed_models: completed.len(),
        average_duration_ms: total_duration as f64 / completed.len() as f64,
        fastest_model: fastest.identifier.to_string(),
        most_accurate_model: most_accurate.identifier.to_string(),
        recommended_model: recommended.identifier.to_string(),
    })
}

fn score(entry: &Scored<'_>, max_duration: u64) -> f64 {
    let speed = if max_duration == 0 {
        1.0
    } else {
        1.0 - entry.duration_ms as f64 / max_duration as f64
    };
    CONFIDENCE_WEIGHT * entry.confidence + SPEED_WEIGHT * speed
}
