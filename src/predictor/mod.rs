pub mod classifier;
pub mod features;
pub mod models;
pub mod presenter;

pub use classifier::{ClassifierError, LogisticPipeline, WinClassifier};
pub use features::derive_features;
pub use models::{City, FeatureRecord, MatchState, Team};
pub use presenter::WinSplit;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Match-state input the form should never have allowed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("unknown team '{0}'")]
    UnknownTeam(String),
    #[error("unknown city '{0}'")]
    UnknownCity(String),
    #[error("batting and bowling team are both {0}")]
    SameTeams(Team),
    #[error("wickets fallen must be between 0 and 9, got {0}")]
    WicketsOutOfRange(u8),
    #[error("overs completed must be between 0.0 and 20.0, got {0}")]
    OversOutOfRange(f64),
    #[error("overs completed must have at most one decimal place, got {0}")]
    OversPrecision(f64),
}

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error("classifier returned an invalid win probability: {0}")]
    InvalidProbability(f64),
}

/// Outcome of a single prediction request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub city: City,
    pub features: FeatureRecord,
    /// Batting team win chance, 0–100
    pub win_percent: u8,
    /// Bowling team win chance, `100 - win_percent`
    pub lose_percent: u8,
    pub model: String,
    pub predicted_at: DateTime<Utc>,
}

/// Derive → classify → present, over a shared read-only classifier.
#[derive(Clone)]
pub struct Predictor {
    classifier: Arc<dyn WinClassifier>,
}

impl Predictor {
    pub fn new(classifier: Arc<dyn WinClassifier>) -> Self {
        Predictor { classifier }
    }

    pub fn model_name(&self) -> &str {
        self.classifier.name()
    }

    pub fn predict(&self, state: &MatchState) -> Result<Prediction, PredictError> {
        let features = derive_features(state);
        debug!(
            "Features: runs_left={} balls_left={:.1} wickets_left={} crr={:.2} rrr={:.2}",
            features.runs_left,
            features.balls_left,
            features.wickets_left,
            features.current_run_rate,
            features.required_run_rate
        );

        let proba = self.classifier.predict_proba(&features)?;
        let split = WinSplit::from_proba(proba)?;

        info!(
            "🏏 {} {}% vs {} {}% ({}, target {}, {}/{} after {:.1} ov)",
            state.batting_team,
            split.win_percent,
            state.bowling_team,
            split.lose_percent,
            state.city,
            state.target,
            state.current_score,
            state.wickets_fallen,
            state.overs_completed
        );

        Ok(Prediction {
            batting_team: state.batting_team,
            bowling_team: state.bowling_team,
            city: state.city,
            features,
            win_percent: split.win_percent,
            lose_percent: split.lose_percent,
            model: self.classifier.name().to_string(),
            predicted_at: Utc::now(),
        })
    }
}
