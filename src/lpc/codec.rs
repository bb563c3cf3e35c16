use crate::error::{Result, VoxlpcError};
use std::sync::Arc;

/// Linear-prediction analysis and synthesis capability.
///
/// This trait allows swapping implementations (Levinson-Durbin vs mock).
pub trait LpcCodec: Send + Sync {
    /// Computes `order` prediction coefficients for `frame`.
    ///
    /// Must be deterministic and must not depend on previous calls.
    fn analyze(&self, frame: &[f32], order: usize) -> Result<Vec<f32>>;

    /// Drives the all-pole filter given by `coefficients` with `excitation`.
    ///
    /// Returns exactly `excitation.len()` samples. The filter starts from a
    /// zero state on every call.
    fn synthesize(&self, coefficients: &[f32], excitation: &[f32], order: usize)
    -> Result<Vec<f32>>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Implement LpcCodec for Arc<T> to share one codec between threads.
impl<T: LpcCodec> LpcCodec for Arc<T> {
    fn analyze(&self, frame: &[f32], order: usize) -> Result<Vec<f32>> {
        (**self).analyze(frame, order)
    }

    fn synthesize(
        &self,
        coefficients: &[f32],
        excitation: &[f32],
        order: usize,
    ) -> Result<Vec<f32>> {
        (**self).synthesize(coefficients, excitation, order)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Mock codec for testing.
///
/// Analysis returns `order` copies of the frame mean; synthesis returns the
/// excitation scaled by `gain`.
#[derive(Debug, Clone)]
pub struct MockLpc {
    gain: f32,
    fail_analysis: bool,
    fail_synthesis: bool,
}

impl MockLpc {
    pub fn new() -> Self {
        Self {
            gain: 1.0,
            fail_analysis: false,
            fail_synthesis: false,
        }
    }

    /// Configure the synthesis gain.
    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    /// Configure the mock to fail on analyze
    pub fn with_analysis_failure(mut self) -> Self {
        self.fail_analysis = true;
        self
    }

    /// Configure the mock to fail on synthesize
    pub fn with_synthesis_failure(mut self) -> Self {
        self.fail_synthesis = true;
        self
    }
}

impl Default for MockLpc {
    fn default() -> Self {
        Self::new()
    }
}

impl LpcCodec for MockLpc {
    fn analyze(&self, frame: &[f32], order: usize) -> Result<Vec<f32>> {
        if self.fail_analysis {
            return Err(VoxlpcError::Analysis {
                message: "mock analysis failure".to_string(),
            });
        }
        let mean = if frame.is_empty() {
            0.0
        } else {
            frame.iter().sum::<f32>() / frame.len() as f32
        };
        Ok(vec![mean; order])
    }

    fn synthesize(
        &self,
        _coefficients: &[f32],
        excitation: &[f32],
        _order: usize,
    ) -> Result<Vec<f32>> {
        if self.fail_synthesis {
            return Err(VoxlpcError::Synthesis {
                message: "mock synthesis failure".to_string(),
            });
        }
        Ok(excitation.iter().map(|e| e * self.gain).collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_analyze_returns_order_coefficients() {
        let codec = MockLpc::new();
        let coefficients = codec.analyze(&[1.0, 2.0, 3.0], 4).unwrap();
        assert_eq!(coefficients, vec![2.0; 4]);
    }

    #[test]
    fn test_mock_analyze_empty_frame() {
        let codec = MockLpc::new();
        assert_eq!(codec.analyze(&[], 2).unwrap(), vec![0.0; 2]);
    }

    #[test]
    fn test_mock_synthesize_scales_excitation() {
        let codec = MockLpc::new().with_gain(0.5);
        let output = codec.synthesize(&[0.0; 4], &[1.0, -2.0], 4).unwrap();
        assert_eq!(output, vec![0.5, -1.0]);
    }

    #[test]
    fn test_mock_failures() {
        let codec = MockLpc::new().with_analysis_failure();
        match codec.analyze(&[0.0], 1) {
            Err(VoxlpcError::Analysis { message }) => {
                assert_eq!(message, "mock analysis failure");
            }
            other => panic!("Expected Analysis error, got {:?}", other),
        }

        let codec = MockLpc::new().with_synthesis_failure();
        assert!(matches!(
            codec.synthesize(&[], &[0.0], 1),
            Err(VoxlpcError::Synthesis { .. })
        ));
    }

    #[test]
    fn test_arc_codec_delegates() {
        let codec = Arc::new(MockLpc::new());
        assert_eq!(codec.name(), "mock");
        assert_eq!(codec.analyze(&[4.0], 1).unwrap(), vec![4.0]);
    }
}
