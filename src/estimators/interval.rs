//! Time-interval error kernels.
//!
//! These are excursion measures, not noise-power estimates:
//!
//! - TIE at `m` is the sequence `x[i+m] - x[i]`; its per-tau summary is the RMS.
//! - MTIE at `m` is the largest peak-to-peak phase inside any window of
//!   `m + 1` consecutive samples (a span of `m * tau0` seconds).

use std::collections::VecDeque;

/// Every time-interval error `x[i+m] - x[i]`, `i < N - m`.
pub fn tie_values(x: &[f64], m: usize) -> Vec<f64> {
    x.iter().zip(&x[m..]).map(|(a, b)| b - a).collect()
}

/// RMS of the time-interval errors at `m`.
pub fn tie_rms(x: &[f64], m: usize) -> f64 {
    let n = x.len() - m;
    let sum: f64 = x.iter().zip(&x[m..]).map(|(a, b)| (b - a) * (b - a)).sum();
    (sum / n as f64).sqrt()
}

/// Maximum time-interval error at `m`.
///
/// Sliding-window extrema with two monotonic deques of indices: O(N) per tau
/// regardless of `m`.
pub fn mtie(x: &[f64], m: usize) -> f64 {
    let width = m + 1;
    let mut maxima: VecDeque<usize> = VecDeque::with_capacity(width);
    let mut minima: VecDeque<usize> = VecDeque::with_capacity(width);
    let mut best = 0.0_f64;

    for (j, &v) in x.iter().enumerate() {
        while maxima.back().is_some_and(|&b| x[b] <= v) {
            maxima.pop_back();
        }
        maxima.push_back(j);
        while minima.back().is_some_and(|&b| x[b] >= v) {
            minima.pop_back();
        }
        minima.push_back(j);

        if j + 1 < width {
            continue;
        }
        let start = j + 1 - width;
        while maxima.front().is_some_and(|&f| f < start) {
            maxima.pop_front();
        }
        while minima.front().is_some_and(|&f| f < start) {
            minima.pop_front();
        }
        if let (Some(&hi), Some(&lo)) = (maxima.front(), minima.front()) {
            best = best.max(x[hi] - x[lo]);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mtie_brute(x: &[f64], m: usize) -> f64 {
        x.windows(m + 1)
            .map(|w| {
                let hi = w.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let lo = w.iter().copied().fold(f64::INFINITY, f64::min);
                hi - lo
            })
            .fold(0.0, f64::max)
    }

    #[test]
    fn mtie_deque_matches_brute_force() {
        let x: Vec<f64> = (0..257)
            .map(|i| {
                let t = i as f64;
                (0.21 * t).sin() * 3.0 + (1.7 * t).cos() + 0.01 * t
            })
            .collect();
        for m in [1, 2, 5, 17, 64, 128, 256] {
            assert_eq!(mtie(&x, m), mtie_brute(&x, m), "m={m}");
        }
    }

    #[test]
    fn mtie_handles_plateaus() {
        let x = [1.0, 1.0, 1.0, 3.0, 3.0, 0.0, 0.0, 2.0];
        for m in 1..x.len() {
            assert_eq!(mtie(&x, m), mtie_brute(&x, m), "m={m}");
        }
    }

    #[test]
    fn tie_values_and_rms() {
        let x = [0.0, 1.0, 3.0, 6.0];
        assert_eq!(tie_values(&x, 1), vec![1.0, 2.0, 3.0]);
        assert_eq!(tie_values(&x, 3), vec![6.0]);
        let rms = tie_rms(&x, 1);
        assert!((rms - (14.0f64 / 3.0).sqrt()).abs() < 1e-15);
    }
}
