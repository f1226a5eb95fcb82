/// Disease prediction collaborator
///
/// The model is an externally pre-trained, opaque artifact: per-feature
/// encoder classes plus linear scoring weights over the fixed 13-feature
/// questionnaire record. This module only encodes inputs the way the
/// artifact dictates and queries it; there is no training code.
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

/// The nine Yes/No symptom feature keys, as the artifact names them
pub const SYMPTOM_FEATURES: [&str; 9] = [
    "Fever",
    "Cough",
    "Fatigue",
    "Difficulty Breathing",
    "Headache",
    "Rash",
    "Nausea",
    "Joint Pain",
    "Weight Change",
];

/// Reserved encoder bucket for categorical values the artifact never saw
pub const UNKNOWN_BUCKET: &str = "UNKNOWN";

/// One questionnaire submission
#[derive(Debug, Clone)]
pub struct PatientIntake {
    /// Names of the symptoms answered "Yes"
    pub symptoms: Vec<String>,
    pub age: u32,
    pub gender: String,
    pub blood_pressure: String,
    pub cholesterol: String,
}

enum FeatureValue {
    Text(String),
    Number(f64),
}

impl PatientIntake {
    fn feature_value(&self, feature: &str) -> Option<FeatureValue> {
        if SYMPTOM_FEATURES
            .iter()
            .any(|name| name.eq_ignore_ascii_case(feature))
        {
            let active = self
                .symptoms
                .iter()
                .any(|s| s.eq_ignore_ascii_case(feature));
            let answer = if active { "Yes" } else { "No" };
            return Some(FeatureValue::Text(answer.to_string()));
        }

        match feature {
            "Age" => Some(FeatureValue::Number(self.age as f64)),
            "Gender" => Some(FeatureValue::Text(self.gender.clone())),
            "Blood Pressure" => Some(FeatureValue::Text(self.blood_pressure.clone())),
            "Cholesterol Level" => Some(FeatureValue::Text(self.cholesterol.clone())),
            _ => None,
        }
    }
}

/// Prediction collaborator contract
#[async_trait]
pub trait DiseaseModel: Send + Sync {
    /// Map a questionnaire record to a disease label
    async fn predict(&self, intake: &PatientIntake) -> AppResult<String>;
}

/// On-disk artifact layout
#[derive(Debug, Clone, Deserialize)]
struct ModelArtifact {
    features: Vec<FeatureSpec>,
    labels: Vec<String>,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct FeatureSpec {
    name: String,
    /// Encoder classes for categorical features; numeric features carry none
    #[serde(default)]
    classes: Option<Vec<String>>,
}

/// Model backed by a pre-trained artifact file
pub struct ArtifactModel {
    artifact: ModelArtifact,
}

impl ArtifactModel {
    /// Load and validate an artifact
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::Internal(format!("Failed to read model artifact {:?}: {}", path, e))
        })?;
        let artifact: ModelArtifact = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::Internal(format!("Invalid model artifact: {}", e)))?;

        if artifact.labels.is_empty() {
            return Err(AppError::Internal(
                "Model artifact has no labels".to_string(),
            ));
        }
        if artifact.weights.len() != artifact.labels.len()
            || artifact.intercepts.len() != artifact.labels.len()
        {
            return Err(AppError::Internal(
                "Model artifact weight shape does not match its labels".to_string(),
            ));
        }
        for row in &artifact.weights {
            if row.len() != artifact.features.len() {
                return Err(AppError::Internal(
                    "Model artifact weight shape does not match its features".to_string(),
                ));
            }
        }
        for feature in &artifact.features {
            if let Some(classes) = &feature.classes {
                if !classes.iter().any(|c| c == UNKNOWN_BUCKET) {
                    return Err(AppError::Internal(format!(
                        "Categorical feature '{}' is missing the {} bucket",
                        feature.name, UNKNOWN_BUCKET
                    )));
                }
            }
        }

        tracing::info!(
            "Loaded model artifact: {} features, {} labels",
            artifact.features.len(),
            artifact.labels.len()
        );
        Ok(Self { artifact })
    }

    fn encode(&self, intake: &PatientIntake) -> AppResult<Vec<f64>> {
        let mut encoded = Vec::with_capacity(self.artifact.features.len());

        for feature in &self.artifact.features {
            let value = intake.feature_value(&feature.name).ok_or_else(|| {
                AppError::Internal(format!(
                    "Model artifact references unknown feature '{}'",
                    feature.name
                ))
            })?;

            match (&feature.classes, value) {
                (Some(classes), FeatureValue::Text(text)) => {
                    // Unseen categorical values fall into the UNKNOWN bucket
                    let index = match classes.iter().position(|c| *c == text) {
                        Some(index) => index,
                        None => classes
                            .iter()
                            .position(|c| c == UNKNOWN_BUCKET)
                            .ok_or_else(|| {
                                AppError::Internal(format!(
                                    "Feature '{}' has no {} bucket",
                                    feature.name, UNKNOWN_BUCKET
                                ))
                            })?,
                    };
                    encoded.push(index as f64);
                }
                (None, FeatureValue::Number(n)) => encoded.push(n),
                _ => {
                    return Err(AppError::Internal(format!(
                        "Feature '{}' does not match the artifact's encoder",
                        feature.name
                    )))
                }
            }
        }

        Ok(encoded)
    }
}

#[async_trait]
impl DiseaseModel for ArtifactModel {
    async fn predict(&self, intake: &PatientIntake) -> AppResult<String> {
        let encoded = self.encode(intake)?;

        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (i, (row, intercept)) in self
            .artifact
            .weights
            .iter()
            .zip(&self.artifact.intercepts)
            .enumerate()
        {
            let score: f64 = intercept + row.iter().zip(&encoded).map(|(w, x)| w * x).sum::<f64>();
            if score > best_score {
                best_score = score;
                best = i;
            }
        }

        Ok(self.artifact.labels[best].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn artifact_json() -> serde_json::Value {
        serde_json::json!({
            "features": [
                {"name": "Fever", "classes": ["No", "Yes", "UNKNOWN"]},
                {"name": "Age"},
                {"name": "Blood Pressure", "classes": ["Low", "Normal", "High", "UNKNOWN"]}
            ],
            "labels": ["Common Cold", "Influenza"],
            "weights": [[0.1, 0.0, 0.2], [2.0, 0.01, 0.5]],
            "intercepts": [0.5, -1.0]
        })
    }

    fn load_model(value: &serde_json::Value) -> AppResult<ArtifactModel> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(value.to_string().as_bytes()).unwrap();
        ArtifactModel::load(file.path())
    }

    fn intake(symptoms: &[&str], blood_pressure: &str) -> PatientIntake {
        PatientIntake {
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            age: 30,
            gender: "Female".to_string(),
            blood_pressure: blood_pressure.to_string(),
            cholesterol: "Normal".to_string(),
        }
    }

    #[tokio::test]
    async fn test_predict_returns_a_known_label() {
        let model = load_model(&artifact_json()).unwrap();
        let label = model.predict(&intake(&["Fever"], "High")).await.unwrap();
        assert!(["Common Cold", "Influenza"].contains(&label.as_str()));
    }

    #[test]
    fn test_encoding_maps_symptoms_case_insensitively() {
        let model = load_model(&artifact_json()).unwrap();
        // "fever" answers the "Fever" feature as Yes -> class index 1
        let encoded = model.encode(&intake(&["fever"], "Normal")).unwrap();
        assert_eq!(encoded, vec![1.0, 30.0, 1.0]);
    }

    #[test]
    fn test_unseen_categorical_maps_to_unknown_bucket() {
        let model = load_model(&artifact_json()).unwrap();
        let encoded = model.encode(&intake(&[], "Elevated")).unwrap();
        // "Elevated" is not an encoder class -> UNKNOWN bucket at index 3
        assert_eq!(encoded[2], 3.0);
    }

    #[test]
    fn test_load_rejects_artifact_without_unknown_bucket() {
        let mut value = artifact_json();
        value["features"][2]["classes"] = serde_json::json!(["Low", "Normal", "High"]);
        assert!(load_model(&value).is_err());
    }

    #[test]
    fn test_load_rejects_mismatched_weight_shape() {
        let mut value = artifact_json();
        value["weights"] = serde_json::json!([[0.1, 0.0]]);
        assert!(load_model(&value).is_err());
    }
}
