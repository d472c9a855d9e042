//! Seasonal naive forecast.
//!
//! Tiles the last `period` observations across the horizon. With fewer than
//! `period` observations it repeats the last one (or 0 for empty history).

use super::ForecastModel;

#[derive(Debug, Clone)]
pub struct SeasonalNaive {
    period: usize,
    id: String,
}

impl SeasonalNaive {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "seasonal period must be >= 1");
        let id = if period == 7 {
            "seasonal_naive_weekly".to_string()
        } else {
            format!("seasonal_naive_{period}d")
        };
        Self { period, id }
    }
}

impl ForecastModel for SeasonalNaive {
    fn id(&self) -> &str {
        &self.id
    }

    fn forecast(&self, history: &[f64], horizon: usize) -> Vec<f64> {
        if history.len() < self.period {
            let last = history.last().copied().unwrap_or(0.0);
            return vec![last; horizon];
        }
        let season = &history[history.len() - self.period..];
        season.iter().copied().cycle().take(horizon).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekly_tiles_last_week() {
        let m = SeasonalNaive::new(7);
        let fc = m.forecast(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0], 3);
        assert_eq!(fc, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn wraps_past_one_period() {
        let m = SeasonalNaive::new(3);
        let fc = m.forecast(&[9.0, 1.0, 2.0, 3.0], 7);
        assert_eq!(fc, vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn short_history_repeats_last() {
        let m = SeasonalNaive::new(7);
        assert_eq!(m.forecast(&[4.0, 5.0], 3), vec![5.0, 5.0, 5.0]);
    }

    #[test]
    fn ids() {
        assert_eq!(SeasonalNaive::new(7).id(), "seasonal_naive_weekly");
        assert_eq!(SeasonalNaive::new(14).id(), "seasonal_naive_14d");
    }
}
