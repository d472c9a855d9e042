//! Model selection from backtest scores.

use crate::domain::{ModelScore, ModelSelection};
use crate::models::DEFAULT_MODEL_ID;

/// Pick the model with the lowest defined MAE for `item`.
///
/// Rows without a finite MAE are ignored. The first minimal row in `scores`
/// order wins ties. With no usable row the default moving-average model is
/// chosen.
pub fn select_model(item: &str, scores: &[ModelScore]) -> ModelSelection {
    let best = scores
        .iter()
        .filter(|s| s.has_signal())
        .fold(None::<&ModelScore>, |best, s| match best {
            Some(b) if b.mae <= s.mae => Some(b),
            _ => Some(s),
        });

    let chosen_model_id = match best {
        Some(score) => score.model_id.clone(),
        None => {
            tracing::debug!(item, "no usable backtest score, using default model");
            DEFAULT_MODEL_ID.to_string()
        }
    };

    ModelSelection {
        item: item.to_string(),
        chosen_model_id,
    }
}
