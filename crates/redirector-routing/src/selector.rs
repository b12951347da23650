//! Weighted random selection.
//!
//! Cumulative linear scan against one uniform draw in `[0, total)`.

use rand::Rng;
use redirector_core::WeightedDomain;

/// Sum of all selectable weights.
#[must_use]
pub fn total_weight(candidates: &[WeightedDomain]) -> f64 {
    candidates
        .iter()
        .filter(|c| c.is_selectable())
        .map(|c| c.weight)
        .sum()
}

/// Choose one candidate with probability `weight / total`.
///
/// Candidates whose weight is zero, negative or not finite are never chosen.
/// Returns `None` when nothing is selectable. Weights whose sum overflows
/// `f64` are rescaled by the largest weight first, keeping their ratios.
pub fn choose_weighted<'a, R>(candidates: &'a [WeightedDomain], rng: &mut R) -> Option<&'a WeightedDomain>
where
    R: Rng + ?Sized,
{
    let mut scale = 1.0;
    let mut total = total_weight(candidates);
    if total.is_infinite() {
        scale = candidates
            .iter()
            .filter(|c| c.is_selectable())
            .map(|c| c.weight)
            .fold(0.0, f64::max);
        total = candidates
            .iter()
            .filter(|c| c.is_selectable())
            .map(|c| c.weight / scale)
            .sum();
    }
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let mut threshold = rng.gen_range(0.0..total);
    let mut last = None;

    for candidate in candidates.iter().filter(|c| c.is_selectable()) {
        let weight = candidate.weight / scale;
        if threshold < weight {
            return Some(candidate);
        }
        threshold -= weight;
        last = Some(candidate);
    }

    // float residue past the final bucket
    last
}
