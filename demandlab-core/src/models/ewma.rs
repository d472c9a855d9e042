//! Exponentially weighted moving average (EWMA) forecast.
//!
//! Recursive: level[0] = x[0], level[t] = alpha * x[t] + (1 - alpha) * level[t-1].
//! Forecast is the final level repeated across the horizon; empty history gives 0.

use super::ForecastModel;

#[derive(Debug, Clone)]
pub struct Ewma {
    alpha: f64,
    id: String,
}

impl Ewma {
    pub fn new(alpha: f64) -> Self {
        assert!(
            alpha > 0.0 && alpha <= 1.0,
            "EWMA alpha must be in (0, 1]"
        );
        Self {
            alpha,
            id: format!("ewma_alpha_{alpha}"),
        }
    }

    /// Final smoothed level of `history`.
    pub fn level(&self, history: &[f64]) -> f64 {
        let Some((&first, rest)) = history.split_first() else {
            return 0.0;
        };
        rest.iter()
            .fold(first, |level, &x| self.alpha * x + (1.0 - self.alpha) * level)
    }
}

impl ForecastModel for Ewma {
    fn id(&self) -> &str {
        &self.id
    }

    fn forecast(&self, history: &[f64], horizon: usize) -> Vec<f64> {
        vec![self.level(history); horizon]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_level() {
        // 10 → 0.5*20 + 0.5*10 = 15 → 0.5*40 + 0.5*15 = 27.5
        let m = Ewma::new(0.5);
        assert!((m.level(&[10.0, 20.0, 40.0]) - 27.5).abs() < 1e-12);
    }

    #[test]
    fn alpha_one_repeats_last_observation() {
        let m = Ewma::new(1.0);
        assert_eq!(m.forecast(&[3.0, 8.0, 1.0, 6.0], 3), vec![6.0; 3]);
    }

    #[test]
    fn single_observation_is_level() {
        assert_eq!(Ewma::new(0.3).level(&[4.0]), 4.0);
    }

    #[test]
    fn id_includes_alpha() {
        assert_eq!(Ewma::new(0.3).id(), "ewma_alpha_0.3");
    }
}
