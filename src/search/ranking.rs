use crate::models::MatchResult;
use std::cmp::Ordering;

/// Pin a score into [0, 1]. NaN counts as no relevance.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Drop zero scores, order by descending score then `tie_break`, keep `limit`.
pub fn rank_by<T, F>(mut scored: Vec<MatchResult<T>>, limit: usize, tie_break: F) -> Vec<MatchResult<T>>
where
    F: Fn(&T, &T) -> Ordering,
{
    scored.retain(|m| m.score > 0.0);
    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| tie_break(&a.item, &b.item))
    });
    scored.truncate(limit);
    scored
}
