use super::PredictError;

/// Whole-number win chances for the batting and bowling side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinSplit {
    /// Batting team, `round(P(win) * 100)`
    pub win_percent: u8,
    /// Bowling team, always `100 - win_percent`
    pub lose_percent: u8,
}

impl WinSplit {
    /// Convert a `[P(lose), P(win)]` vector into display percentages.
    ///
    /// Only `P(win)` is rounded (half to even); the other side is its
    /// complement so the pair always sums to 100.
    pub fn from_proba(proba: [f64; 2]) -> Result<Self, PredictError> {
        let p_win = proba[1];
        if !p_win.is_finite() {
            return Err(PredictError::InvalidProbability(p_win));
        }
        let win_percent = (p_win.clamp(0.0, 1.0) * 100.0).round_ties_even() as u8;
        Ok(WinSplit {
            win_percent,
            lose_percent: 100 - win_percent,
        })
    }
}
