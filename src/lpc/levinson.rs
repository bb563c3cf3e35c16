//! Autocorrelation LPC with the Levinson-Durbin recursion.
//!
//! Coefficients follow the convention `x[n] ≈ -Σ a[k]·x[n-1-k]`, so synthesis
//! computes `y[n] = e[n] - Σ a[k]·y[n-1-k]`.

use crate::defaults;
use crate::error::Result;
use crate::lpc::codec::LpcCodec;

/// Levinson-Durbin analysis and direct-form all-pole synthesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevinsonLpc {
    /// Bandwidth expansion: coefficient `k` is scaled by `damping^(k+1)`.
    damping: f64,
}

impl Default for LevinsonLpc {
    fn default() -> Self {
        Self::new(defaults::LAG_DAMPING)
    }
}

impl LevinsonLpc {
    pub fn new(damping: f64) -> Self {
        Self { damping }
    }
}

impl LpcCodec for LevinsonLpc {
    fn analyze(&self, frame: &[f32], order: usize) -> Result<Vec<f32>> {
        let aut = autocorrelation(frame, order);
        let mut lpc = levinson_durbin(&aut, order);

        let mut damp = self.damping;
        for coefficient in &mut lpc {
            *coefficient *= damp;
            damp *= self.damping;
        }

        Ok(lpc.into_iter().map(|c| c as f32).collect())
    }

    fn synthesize(
        &self,
        coefficients: &[f32],
        excitation: &[f32],
        order: usize,
    ) -> Result<Vec<f32>> {
        let taps = &coefficients[..order.min(coefficients.len())];
        let mut output: Vec<f32> = Vec::with_capacity(excitation.len());

        for (n, &e) in excitation.iter().enumerate() {
            let feedback: f64 = taps
                .iter()
                .zip(output[..n].iter().rev())
                .map(|(&a, &y)| a as f64 * y as f64)
                .sum();
            output.push((e as f64 - feedback) as f32);
        }

        Ok(output)
    }

    fn name(&self) -> &str {
        "levinson-durbin"
    }
}

/// Biased autocorrelation `r[j] = Σ x[i]·x[i-j]` for `j` in `0..=order`.
fn autocorrelation(frame: &[f32], order: usize) -> Vec<f64> {
    (0..=order)
        .map(|lag| {
            frame
                .iter()
                .skip(lag)
                .zip(frame)
                .map(|(&a, &b)| a as f64 * b as f64)
                .sum()
        })
        .collect()
}

/// Solves the normal equations for `order` coefficients.
///
/// Once the residual error becomes negligible (silent or perfectly
/// predictable input) the remaining coefficients are zero.
fn levinson_durbin(aut: &[f64], order: usize) -> Vec<f64> {
    let mut lpc = vec![0.0f64; order];
    let mut error = aut[0] * (1.0 + 1e-10);
    let epsilon = 1e-9 * aut[0] + 1e-10;

    for i in 0..order {
        if error < epsilon {
            break;
        }

        let mut r = -aut[i + 1];
        for j in 0..i {
            r -= lpc[j] * aut[i - j];
        }
        r /= error;

        lpc[i] = r;
        for j in 0..i / 2 {
            let tmp = lpc[j];
            lpc[j] += r * lpc[i - 1 - j];
            lpc[i - 1 - j] += r * tmp;
        }
        if i % 2 == 1 {
            let mid = i / 2;
            lpc[mid] += lpc[mid] * r;
        }

        error *= 1.0 - r * r;
    }

    lpc
}
