//! Moving-average forecast.
//!
//! Constant forecast equal to the mean of the last `window` observations.
//! The window is clipped to the available history; empty history gives 0.

use super::ForecastModel;

#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: usize,
    id: String,
}

impl MovingAverage {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "moving-average window must be >= 1");
        Self {
            window,
            id: format!("moving_average_{window}d"),
        }
    }

    /// The level the forecast repeats.
    pub fn level(&self, history: &[f64]) -> f64 {
        if history.is_empty() {
            return 0.0;
        }
        let w = self.window.min(history.len());
        let tail = &history[history.len() - w..];
        tail.iter().sum::<f64>() / w as f64
    }
}

impl ForecastModel for MovingAverage {
    fn id(&self) -> &str {
        &self.id
    }

    fn forecast(&self, history: &[f64], horizon: usize) -> Vec<f64> {
        vec![self.level(history); horizon]
    }
}
