//! Pre-trained win classifier.
//!
//! The model is produced offline and shipped as a JSON artifact. Column names
//! inside the artifact follow the training frame (`wickets` is wickets in
//! hand, `total_runs_x` is the target); [`FeatureRecord`] maps onto them.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::models::{City, FeatureRecord, Team};

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("failed to read classifier artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed classifier artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("classifier weight '{0}' is not finite")]
    NonFiniteWeight(String),
    #[error("classifier produced a non-finite score")]
    NonFinite,
}

/// Anything that can turn a feature record into `[P(lose), P(win)]` for the
/// batting side.
pub trait WinClassifier: Send + Sync {
    fn predict_proba(&self, record: &FeatureRecord) -> Result<[f64; 2], ClassifierError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// One-hot weights for the categorical columns. Categories absent from a
/// map (the dropped reference level, or anything unseen in training)
/// contribute nothing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoricalWeights {
    #[serde(default)]
    pub batting_team: HashMap<Team, f64>,
    #[serde(default)]
    pub bowling_team: HashMap<Team, f64>,
    #[serde(default)]
    pub city: HashMap<City, f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NumericWeights {
    pub runs_left: f64,
    pub balls_left: f64,
    pub wickets: f64,
    pub total_runs_x: f64,
    pub crr: f64,
    pub rrr: f64,
}

/// One-hot encoder followed by logistic regression.
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticPipeline {
    pub name: String,
    pub intercept: f64,
    #[serde(default)]
    pub categorical: CategoricalWeights,
    pub numeric: NumericWeights,
}

impl LogisticPipeline {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ClassifierError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ClassifierError> {
        let pipeline: LogisticPipeline = serde_json::from_str(raw)?;
        pipeline.check_weights()?;
        Ok(pipeline)
    }

    fn check_weights(&self) -> Result<(), ClassifierError> {
        let n = &self.numeric;
        let numeric = [
            ("intercept", self.intercept),
            ("runs_left", n.runs_left),
            ("balls_left", n.balls_left),
            ("wickets", n.wickets),
            ("total_runs_x", n.total_runs_x),
            ("crr", n.crr),
            ("rrr", n.rrr),
        ];
        for (column, w) in numeric {
            if !w.is_finite() {
                return Err(ClassifierError::NonFiniteWeight(column.to_string()));
            }
        }

        let c = &self.categorical;
        for (team, w) in c.batting_team.iter() {
            if !w.is_finite() {
                return Err(ClassifierError::NonFiniteWeight(format!("batting_team={team}")));
            }
        }
        for (team, w) in c.bowling_team.iter() {
            if !w.is_finite() {
                return Err(ClassifierError::NonFiniteWeight(format!("bowling_team={team}")));
            }
        }
        for (city, w) in c.city.iter() {
            if !w.is_finite() {
                return Err(ClassifierError::NonFiniteWeight(format!("city={city}")));
            }
        }
        Ok(())
    }

    /// Linear score (log-odds of the batting side winning).
    pub fn decision_function(&self, record: &FeatureRecord) -> f64 {
        let c = &self.categorical;
        let n = &self.numeric;
        let one_hot = c.batting_team.get(&record.batting_team).copied().unwrap_or(0.0)
            + c.bowling_team.get(&record.bowling_team).copied().unwrap_or(0.0)
            + c.city.get(&record.city).copied().unwrap_or(0.0);

        self.intercept
            + one_hot
            + n.runs_left * record.runs_left as f64
            + n.balls_left * record.balls_left
            + n.wickets * f64::from(record.wickets_left)
            + n.total_runs_x * f64::from(record.target)
            + n.crr * record.current_run_rate
            + n.rrr * record.required_run_rate
    }
}

impl WinClassifier for LogisticPipeline {
    fn predict_proba(&self, record: &FeatureRecord) -> Result<[f64; 2], ClassifierError> {
        let z = self.decision_function(record);
        if !z.is_finite() {
            return Err(ClassifierError::NonFinite);
        }
        let p = sigmoid(z);
        Ok([1.0 - p, p])
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}
