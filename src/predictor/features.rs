//! Match state → classifier features.
//!
//! The derivation mirrors how the model was trained, including its quirks:
//! overs are treated as a plain decimal (`10.3` overs is 61.8 balls, not 63),
//! and neither `runs_left` nor `wickets_left` is clamped, so a side that has
//! already passed the target gets a negative required rate.

use super::models::{FeatureRecord, MatchState, BALLS_PER_INNINGS, TEAM_WICKETS};

/// Derive the classifier's feature record. Assumes the state satisfies the
/// form constraints; see [`MatchState::validate`].
pub fn derive_features(state: &MatchState) -> FeatureRecord {
    let runs_left = i64::from(state.target) - i64::from(state.current_score);
    let balls_left = BALLS_PER_INNINGS - state.overs_completed * 6.0;
    let wickets_left = i16::from(TEAM_WICKETS) - i16::from(state.wickets_fallen);

    FeatureRecord {
        batting_team: state.batting_team,
        bowling_team: state.bowling_team,
        city: state.city,
        runs_left,
        balls_left,
        wickets_left,
        target: state.target,
        current_run_rate: current_run_rate(state.current_score, state.overs_completed),
        required_run_rate: required_run_rate(runs_left, balls_left),
    }
}

/// Runs per over so far; 0 before the first ball.
pub fn current_run_rate(current_score: u32, overs_completed: f64) -> f64 {
    if overs_completed > 0.0 {
        f64::from(current_score) / overs_completed
    } else {
        0.0
    }
}

/// Runs per over needed from the remaining balls; 0 once no balls remain.
pub fn required_run_rate(runs_left: i64, balls_left: f64) -> f64 {
    if balls_left > 0.0 {
        runs_left as f64 * 6.0 / balls_left
    } else {
        0.0
    }
}
