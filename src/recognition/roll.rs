//! Roll-angle correlation between rotational signatures.
//!
//! A rotational signature is a circular histogram over 360 degrees of
//! rotation about the vertical axis. When a query cluster is the stored
//! view rotated by some roll angle, the query's signature is the stored
//! signature circularly shifted by that angle. Correlating the two over
//! all shifts recovers it:
//!
//! 1. Mean-center both signatures and normalize by their energies, so
//!    scores land in `[-1, 1]` regardless of histogram scale.
//! 2. Score every integer bin shift of the query against the target.
//! 3. Take positive circular local maxima and refine each to sub-bin
//!    resolution with a parabolic fit through its neighbors.
//! 4. Keep the strongest peaks subject to the configured ratio,
//!    separation and count limits.
//!
//! A degenerate signature (flat, empty, or of mismatched length) yields
//! no candidates, which the pipeline reports as a roll-correlation miss.

use super::RollConfig;

/// Signatures whose centered energy falls below this are treated as flat.
const FLAT_SIGNATURE_EPS: f64 = 1e-9;

/// One candidate roll angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollCandidate {
    /// Roll of the query relative to the stored view, degrees in `[0, 360)`.
    pub angle_deg: f64,
    /// Normalized correlation score in `(0, 1]`.
    pub score: f64,
}

/// Correlate a query signature against a stored target signature.
///
/// Returns candidate roll angles ranked by descending score (ties by
/// ascending angle). The returned angle is the shift that carries the
/// target's histogram onto the query's.
pub fn correlate(query: &[f32], target: &[f32], config: &RollConfig) -> Vec<RollCandidate> {
    let n = query.len();
    if n == 0 || target.len() != n {
        return Vec::new();
    }

    let Some(q) = centered_normalized(query) else {
        return Vec::new();
    };
    let Some(t) = centered_normalized(target) else {
        return Vec::new();
    };

    let scores = shift_scores(&q, &t);
    let mut candidates = peak_candidates(&scores, 360.0 / n as f64);

    candidates.sort_unstable_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.angle_deg.total_cmp(&b.angle_deg))
    });
    select_peaks(&candidates, config)
}

// ── Correlation ─────────────────────────────────────────────────────────────

/// Mean-center and energy-normalize a signature. `None` when flat.
fn centered_normalized(values: &[f32]) -> Option<Vec<f64>> {
    let n = values.len() as f64;
    let mean = values.iter().map(|v| *v as f64).sum::<f64>() / n;
    let centered: Vec<f64> = values.iter().map(|v| *v as f64 - mean).collect();
    let energy = centered.iter().map(|v| v * v).sum::<f64>().sqrt();
    if energy < FLAT_SIGNATURE_EPS {
        return None;
    }
    Some(centered.iter().map(|v| v / energy).collect())
}

/// Normalized correlation score for every integer shift of `q` against `t`.
fn shift_scores(q: &[f64], t: &[f64]) -> Vec<f64> {
    let n = q.len();
    (0..n)
        .map(|s| (0..n).map(|i| q[(i + s) % n] * t[i]).sum::<f64>())
        .collect()
}

// ── Peak extraction ─────────────────────────────────────────────────────────

/// Positive circular local maxima of the score vector, refined to sub-bin
/// resolution by a parabolic fit through each peak and its neighbors.
fn peak_candidates(scores: &[f64], bin_width_deg: f64) -> Vec<RollCandidate> {
    let n = scores.len();
    let mut out = Vec::new();
    for s in 0..n {
        let left = scores[(s + n - 1) % n];
        let center = scores[s];
        let right = scores[(s + 1) % n];
        if center <= 0.0 || center < left || center < right {
            continue;
        }

        let (offset, score) = parabolic_vertex(left, center, right);
        let angle_deg = ((s as f64 + offset) * bin_width_deg).rem_euclid(360.0);
        out.push(RollCandidate { angle_deg, score });
    }
    out
}

/// Vertex of the parabola through three equally spaced samples, as an
/// offset in `[-0.5, 0.5]` from the center sample and the refined value.
#[inline]
fn parabolic_vertex(left: f64, center: f64, right: f64) -> (f64, f64) {
    let denom = left - 2.0 * center + right;
    if denom.abs() < 1e-12 {
        return (0.0, center);
    }
    let offset = (0.5 * (left - right) / denom).clamp(-0.5, 0.5);
    (offset, center - 0.25 * (left - right) * offset)
}

/// Keep the strongest peaks subject to the ratio, separation and count
/// limits. `ranked` must already be sorted by descending score.
fn select_peaks(ranked: &[RollCandidate], config: &RollConfig) -> Vec<RollCandidate> {
    let mut kept: Vec<RollCandidate> = Vec::new();
    for cand in ranked {
        if kept.len() >= config.max_candidates {
            break;
        }
        if let Some(best) = kept.first() {
            if cand.score < config.min_peak_ratio as f64 * best.score {
                break;
            }
            let min_sep = config.min_separation_deg as f64;
            if kept
                .iter()
                .any(|k| circular_separation_deg(k.angle_deg, cand.angle_deg) < min_sep)
            {
                continue;
            }
        }
        kept.push(*cand);
    }
    kept
}

/// Shortest angular distance between two angles, degrees in `[0, 180]`.
#[inline]
fn circular_separation_deg(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SIGNATURE_BINS;

    /// Rotate a signature forward by `shift` bins: the value at bin `i`
    /// moves to bin `i + shift`.
    fn rotate(values: &[f32], shift: usize) -> Vec<f32> {
        let n = values.len();
        (0..n).map(|j| values[(j + n - shift) % n]).collect()
    }

    fn sampled<F: Fn(f64) -> f64>(f: F) -> Vec<f32> {
        (0..SIGNATURE_BINS)
            .map(|i| f((i as f64 * 360.0 / SIGNATURE_BINS as f64).to_radians()) as f32)
            .collect()
    }

    #[test]
    fn recovers_integer_bin_shift() {
        let target = sampled(|theta| theta.sin());
        let query = rotate(&target, 7);

        let candidates = correlate(&query, &target, &RollConfig::default());
        assert_eq!(candidates.len(), 1);
        // 7 bins of 4 degrees
        assert!((candidates[0].angle_deg - 28.0).abs() < 0.1);
        assert!(candidates[0].score > 0.99);
    }

    #[test]
    fn recovers_sub_bin_shift() {
        // 30 degrees is 7.5 bins; the parabolic fit has to land between
        // two integer shifts.
        let signal = |theta: f64| theta.sin() + 0.4 * (2.0 * theta + 1.0).cos();
        let target = sampled(signal);
        let query = sampled(|theta| signal(theta - 30.0_f64.to_radians()));

        let candidates = correlate(&query, &target, &RollConfig::default());
        assert_eq!(candidates.len(), 1);
        assert!((candidates[0].angle_deg - 30.0).abs() < 0.5);
    }

    #[test]
    fn zero_shift_correlates_at_zero_degrees() {
        let target = sampled(|theta| (3.0 * theta).cos() + 0.2 * theta.sin());
        let candidates = correlate(&target, &target, &RollConfig::default());
        assert!(!candidates.is_empty());
        let a = candidates[0].angle_deg;
        assert!(a < 0.1 || a > 359.9);
        assert!((candidates[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn flat_signature_yields_nothing() {
        let flat = vec![2.5f32; SIGNATURE_BINS];
        let shaped = sampled(|theta| theta.cos());
        assert!(correlate(&flat, &shaped, &RollConfig::default()).is_empty());
        assert!(correlate(&shaped, &flat, &RollConfig::default()).is_empty());
        assert!(correlate(&[], &[], &RollConfig::default()).is_empty());
    }

    #[test]
    fn length_mismatch_yields_nothing() {
        let a = vec![1.0f32; SIGNATURE_BINS];
        let b = vec![1.0f32; SIGNATURE_BINS / 2];
        assert!(correlate(&a, &b, &RollConfig::default()).is_empty());
    }

    #[test]
    fn symmetric_signature_yields_both_alignments() {
        // Period of 180 degrees: shifting by half a turn maps the
        // signature onto itself, so both alignments must survive.
        let target = sampled(|theta| (2.0 * theta).sin());
        let candidates = correlate(&target, &target, &RollConfig::default());
        assert_eq!(candidates.len(), 2);
        let near = |angle: f64| {
            candidates
                .iter()
                .any(|c| circular_separation_deg(c.angle_deg, angle) < 0.1)
        };
        assert!(near(0.0));
        assert!(near(180.0));
    }

    #[test]
    fn weak_secondary_peak_is_filtered() {
        // A strong bump at 0 degrees and a much weaker one opposite it:
        // the cross-alignment scores well under the peak ratio.
        let signal = |theta: f64| {
            let main = (theta.cos() - 0.9).max(0.0);
            let minor = ((theta - std::f64::consts::PI).cos() - 0.9).max(0.0);
            main + 0.3 * minor
        };
        let target = sampled(signal);
        let candidates = correlate(&target, &target, &RollConfig::default());
        assert_eq!(candidates.len(), 1);
        let a = candidates[0].angle_deg;
        assert!(a < 1.0 || a > 359.0);
    }

    #[test]
    fn candidate_count_respects_limit() {
        // Period of 45 degrees gives eight equivalent alignments.
        let target = sampled(|theta| (8.0 * theta).sin());
        let config = RollConfig {
            max_candidates: 3,
            ..RollConfig::default()
        };
        let candidates = correlate(&target, &target, &config);
        assert_eq!(candidates.len(), 3);
    }
}
