use super::labels::LabelSet;
use super::types::{EmotionPrediction, EmotionScore, PredictionVector};
use crate::{Error, Result};

/// Build the ranked response for one prediction.
///
/// The predicted emotion is the first label holding the highest probability.
/// `all_emotions` is sorted by descending probability with a stable sort, so
/// equal probabilities keep label-set order and the first entry always names
/// the predicted emotion.
pub fn shape(
    text: &str,
    predictions: &PredictionVector,
    labels: &LabelSet,
) -> Result<EmotionPrediction> {
    if predictions.len() != labels.len() {
        return Err(Error::internal(format!(
            "{} predictions for {} labels",
            predictions.len(),
            labels.len()
        )));
    }

    let best = predictions
        .argmax()
        .ok_or_else(|| Error::internal("empty prediction vector"))?;
    let predicted_emotion = labels
        .get(best)
        .ok_or_else(|| Error::internal(format!("no label at index {best}")))?
        .to_string();
    let confidence = round2(percentage(predictions.as_slice()[best]));

    let mut all_emotions: Vec<EmotionScore> = labels
        .iter()
        .zip(predictions.as_slice())
        .map(|(emotion, &p)| EmotionScore {
            emotion: emotion.to_string(),
            probability: percentage(p),
        })
        .collect();
    all_emotions.sort_by(|a, b| b.probability.total_cmp(&a.probability));

    Ok(EmotionPrediction {
        input_text: text.to_string(),
        predicted_emotion,
        confidence,
        all_emotions,
    })
}

fn percentage(p: f32) -> f64 {
    f64::from(p) * 100.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
