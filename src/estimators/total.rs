//! Total-family kernels: second differences over reflected extensions.
//!
//! Neither estimator materializes the extended series. TOTDEV reads through
//! [`OddReflection`], which maps out-of-range indices back into the input;
//! MTOTDEV keeps one detrended `3m` buffer and reads it through
//! [`MirrorExtension`].

/// Odd reflection of a series about both endpoints:
///
/// ```text
/// x*[-k]      = 2 x[0]   - x[k]
/// x*[N-1+k]   = 2 x[N-1] - x[N-1-k]
/// ```
///
/// Valid for indices in `-(N-1)..=2(N-1)`.
#[derive(Debug, Clone, Copy)]
pub struct OddReflection<'a> {
    x: &'a [f64],
}

impl<'a> OddReflection<'a> {
    pub fn new(x: &'a [f64]) -> Self {
        Self { x }
    }

    pub fn at(&self, i: isize) -> f64 {
        let last = self.x.len() as isize - 1;
        if i < 0 {
            2.0 * self.x[0] - self.x[i.unsigned_abs()]
        } else if i > last {
            2.0 * self.x[last as usize] - self.x[(2 * last - i) as usize]
        } else {
            self.x[i as usize]
        }
    }
}

/// Total deviation.
///
/// ```text
/// σ² = Σ_{i=1}^{N-2} (x*[i-m] - 2x*[i] + x*[i+m])² / (2 m² τ0² (N-2))
/// ```
pub fn reflected_2nd(x: &[f64], tau0: f64, m: usize) -> f64 {
    let n = x.len();
    let ext = OddReflection::new(x);
    let m = m as isize;

    let mut sum = 0.0;
    for i in 1..(n as isize - 1) {
        let d = ext.at(i - m) - 2.0 * ext.at(i) + ext.at(i + m);
        sum += d * d;
    }
    (sum / (2.0 * (n - 2) as f64)).sqrt() / (m as f64 * tau0)
}

/// A `3m` segment extended to `9m` points by uninverted mirror images on
/// both sides: `[rev(seg), seg, rev(seg)]`.
#[derive(Debug, Clone, Copy)]
pub struct MirrorExtension<'a> {
    seg: &'a [f64],
}

impl<'a> MirrorExtension<'a> {
    pub fn new(seg: &'a [f64]) -> Self {
        Self { seg }
    }

    pub fn len(&self) -> usize {
        3 * self.seg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seg.is_empty()
    }

    pub fn at(&self, j: usize) -> f64 {
        let len = self.seg.len();
        let off = j % len;
        if j / len == 1 { self.seg[off] } else { self.seg[len - 1 - off] }
    }
}

/// Modified total deviation.
///
/// For each of the `N - 3m + 1` subsequences of `3m` points:
///
/// 1. remove the linear trend estimated from the means of its two halves
/// 2. mirror-extend to `9m` points
/// 3. average the squares of the `6m` overlapping `m`-averaged second
///    differences
///
/// ```text
/// σ² = Σ_sub [ (1/6m) Σ_{j<6m} ((S1 - 2 S2 + S3) / m)² ] / (2 m² τ0² (N-3m+1))
/// ```
///
/// where `S1, S2, S3` are the sums of three consecutive `m`-point blocks
/// starting at `j`. Cost is O(N·m) per tau.
pub fn reflected_phase_averaged(x: &[f64], tau0: f64, m: usize) -> f64 {
    let n = x.len();
    let seg_len = 3 * m;
    let subsequences = n + 1 - seg_len;
    let mf = m as f64;

    let mut detrended = vec![0.0; seg_len];
    let mut total = 0.0;

    for start in 0..subsequences {
        let xs = &x[start..start + seg_len];
        let slope = half_mean_slope(xs);
        for (k, (d, &v)) in detrended.iter_mut().zip(xs).enumerate() {
            *d = v - slope * k as f64;
        }

        let ext = MirrorExtension::new(&detrended);
        let mut s1: f64 = (0..m).map(|j| ext.at(j)).sum();
        let mut s2: f64 = (m..2 * m).map(|j| ext.at(j)).sum();
        let mut s3: f64 = (2 * m..3 * m).map(|j| ext.at(j)).sum();

        let mut squares = 0.0;
        for j in 0..2 * seg_len {
            if j > 0 {
                s1 += ext.at(j + m - 1) - ext.at(j - 1);
                s2 += ext.at(j + 2 * m - 1) - ext.at(j + m - 1);
                s3 += ext.at(j + 3 * m - 1) - ext.at(j + 2 * m - 1);
            }
            let d = (s1 - 2.0 * s2 + s3) / mf;
            squares += d * d;
        }
        total += squares / (6.0 * mf);
    }

    (total / (2.0 * subsequences as f64)).sqrt() / (mf * tau0)
}

/// Slope between the means of the first and last halves of `xs`.
///
/// For odd lengths `2k + 1` the middle sample is excluded and the two means
/// sit `k + 1` samples apart; for even lengths `2k` they sit `k` apart.
fn half_mean_slope(xs: &[f64]) -> f64 {
    let len = xs.len();
    let half1 = len / 2;
    let half2 = len.div_ceil(2);
    let mean1 = xs[..half1].iter().sum::<f64>() / half1 as f64;
    let mean2 = xs[half2..].iter().sum::<f64>() / (len - half2) as f64;
    let distance = if len % 2 == 1 { (len - 1) as f64 / 2.0 + 1.0 } else { len as f64 / 2.0 };
    (mean2 - mean1) / distance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_reflection_preserves_endpoint_symmetry() {
        let x = [1.0, 4.0, 2.0, 8.0, 5.0];
        let ext = OddReflection::new(&x);
        assert_eq!(ext.at(0), 1.0);
        assert_eq!(ext.at(-1), 2.0 * 1.0 - 4.0);
        assert_eq!(ext.at(-3), 2.0 * 1.0 - 8.0);
        assert_eq!(ext.at(5), 2.0 * 5.0 - 8.0);
        assert_eq!(ext.at(8), 2.0 * 5.0 - 1.0);
        // Odd symmetry: x*[c+k] + x*[c-k] = 2 x[c] at both ends.
        for k in 1..4 {
            assert_eq!(ext.at(k) + ext.at(-k), 2.0 * x[0]);
            assert_eq!(ext.at(4 + k) + ext.at(4 - k), 2.0 * x[4]);
        }
    }

    #[test]
    fn totdev_of_linear_phase_is_zero() {
        // A frequency offset reflects into a straight line; no second difference.
        let x: Vec<f64> = (0..60).map(|i| 3.0 + 0.5 * i as f64).collect();
        for m in [1, 5, 29] {
            assert!(reflected_2nd(&x, 1.0, m) < 1e-12);
        }
    }

    #[test]
    fn totdev_matches_materialized_extension() {
        let x: Vec<f64> = (0..40).map(|i| ((i * 7919) % 31) as f64 * 0.1).collect();
        let n = x.len();
        // Build the 3N-4 point reflected array explicitly.
        let mut ext = Vec::new();
        for k in (1..n - 1).rev() {
            ext.push(2.0 * x[0] - x[k]);
        }
        ext.extend_from_slice(&x);
        for k in 1..n - 1 {
            ext.push(2.0 * x[n - 1] - x[n - 1 - k]);
        }
        let mid = n - 2;
        for m in [1, 3, 10, 19] {
            let mut sum = 0.0;
            for i in 1..n - 1 {
                let c = mid + i;
                let d = ext[c - m] - 2.0 * ext[c] + ext[c + m];
                sum += d * d;
            }
            let want = (sum / (2.0 * (m * m) as f64 * (n - 2) as f64)).sqrt();
            let got = reflected_2nd(&x, 1.0, m);
            assert!((got - want).abs() < 1e-12, "m={m}: {got} vs {want}");
        }
    }

    #[test]
    fn mirror_extension_layout() {
        let seg = [1.0, 2.0, 3.0];
        let ext = MirrorExtension::new(&seg);
        let all: Vec<f64> = (0..ext.len()).map(|j| ext.at(j)).collect();
        assert_eq!(all, vec![3.0, 2.0, 1.0, 1.0, 2.0, 3.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn mtotdev_removes_frequency_offset() {
        let x: Vec<f64> = (0..90).map(|i| -2.0 + 0.125 * i as f64).collect();
        for m in [1, 2, 5, 30] {
            assert!(reflected_phase_averaged(&x, 1.0, m) < 1e-12, "m={m}");
        }
    }

    #[test]
    fn half_mean_slope_on_lines() {
        for len in [3, 6, 9, 12] {
            let xs: Vec<f64> = (0..len).map(|k| 1.0 + 0.75 * k as f64).collect();
            assert!((half_mean_slope(&xs) - 0.75).abs() < 1e-12, "len={len}");
        }
    }
}
