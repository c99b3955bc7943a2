/// Default weight of a new EAR sample.
pub const DEFAULT_EAR_ALPHA: f64 = 0.35;

/// Default weight of a new yaw sample. Lower than EAR: the yaw proxy is
/// noisier and changes more slowly, so it gets stronger smoothing.
pub const DEFAULT_YAW_ALPHA: f64 = 0.25;

/// Single EMA step.
///
/// Formula: `ema[t] = alpha * sample + (1 - alpha) * ema[t-1]`.
/// Without a previous value the sample passes through unchanged.
pub fn ema(previous: Option<f64>, sample: f64, alpha: f64) -> f64 {
    match previous {
        None => sample,
        Some(prev) => alpha * sample + (1.0 - alpha) * prev,
    }
}

/// Domain interface for temporal smoothing of one scalar signal.
pub trait ScalarSmoother: Send {
    /// Feed one sample and return the new smoothed value.
    fn update(&mut self, sample: f64) -> f64;

    /// Current smoothed value, `None` until the first sample.
    fn value(&self) -> Option<f64>;

    fn reset(&mut self);
}

/// EMA (Exponential Moving Average) smoother for one signal.
#[derive(Clone, Debug)]
pub struct ExponentialSmoother {
    alpha: f64,
    state: Option<f64>,
}

impl ExponentialSmoother {
    /// `alpha` must lie in (0, 1]; session configuration validates it.
    pub fn new(alpha: f64) -> Self {
        Self { alpha, state: None }
    }
}

impl ScalarSmoother for ExponentialSmoother {
    fn update(&mut self, sample: f64) -> f64 {
        let smoothed = ema(self.state, sample, self.alpha);
        self.state = Some(smoothed);
        smoothed
    }

    fn value(&self) -> Option<f64> {
        self.state
    }

    fn reset(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ema_without_previous_returns_sample() {
        assert_relative_eq!(ema(None, 0.42, 0.35), 0.42);
    }

    #[test]
    fn test_ema_weights_sample_by_alpha() {
        assert_relative_eq!(ema(Some(0.30), 0.10, 0.35), 0.35 * 0.10 + 0.65 * 0.30);
    }

    #[test]
    fn test_unset_until_first_sample() {
        let smoother = ExponentialSmoother::new(DEFAULT_EAR_ALPHA);
        assert!(smoother.value().is_none());
    }

    #[test]
    fn test_first_sample_returns_unchanged() {
        let mut smoother = ExponentialSmoother::new(DEFAULT_YAW_ALPHA);
        assert_relative_eq!(smoother.update(0.7), 0.7);
        assert_eq!(smoother.value(), Some(0.7));
    }

    #[test]
    fn test_second_sample_applies_ema() {
        let mut smoother = ExponentialSmoother::new(0.25);
        smoother.update(0.0);
        let result = smoother.update(0.8);
        // 0.25 * 0.8 + 0.75 * 0.0
        assert_relative_eq!(result, 0.2);
    }

    #[test]
    fn test_convergence() {
        let mut smoother = ExponentialSmoother::new(DEFAULT_EAR_ALPHA);
        smoother.update(0.0);
        let mut result = 0.0;
        for _ in 0..60 {
            result = smoother.update(0.3);
        }
        assert_relative_eq!(result, 0.3, epsilon = 1e-6);
    }

    #[test]
    fn test_alpha_one_tracks_sample() {
        let mut smoother = ExponentialSmoother::new(1.0);
        smoother.update(0.1);
        assert_relative_eq!(smoother.update(0.9), 0.9);
    }

    #[test]
    fn test_reset_forgets_state() {
        let mut smoother = ExponentialSmoother::new(0.5);
        smoother.update(0.1);
        smoother.update(0.2);
        smoother.reset();
        assert!(smoother.value().is_none());
        assert_relative_eq!(smoother.update(0.6), 0.6);
    }

    #[test]
    fn test_smaller_alpha_smooths_harder() {
        let mut fast = ExponentialSmoother::new(DEFAULT_EAR_ALPHA);
        let mut slow = ExponentialSmoother::new(DEFAULT_YAW_ALPHA);
        fast.update(0.0);
        slow.update(0.0);
        assert!(fast.update(1.0) > slow.update(1.0));
    }
}
