use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::InputError;

/// Franchises offered in the team selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    #[serde(rename = "Sunrisers Hyderabad")]
    SunrisersHyderabad,
    #[serde(rename = "Mumbai Indians")]
    MumbaiIndians,
    #[serde(rename = "Royal Challengers Bangalore")]
    RoyalChallengersBangalore,
    #[serde(rename = "Kolkata Knight Riders")]
    KolkataKnightRiders,
    #[serde(rename = "Kings XI Punjab")]
    KingsXiPunjab,
    #[serde(rename = "Chennai Super Kings")]
    ChennaiSuperKings,
    #[serde(rename = "Rajasthan Royals")]
    RajasthanRoyals,
    #[serde(rename = "Delhi Capitals")]
    DelhiCapitals,
}

impl Team {
    /// All teams in selector order.
    pub const ALL: [Team; 8] = [
        Team::SunrisersHyderabad,
        Team::MumbaiIndians,
        Team::RoyalChallengersBangalore,
        Team::KolkataKnightRiders,
        Team::KingsXiPunjab,
        Team::ChennaiSuperKings,
        Team::RajasthanRoyals,
        Team::DelhiCapitals,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Team::SunrisersHyderabad => "Sunrisers Hyderabad",
            Team::MumbaiIndians => "Mumbai Indians",
            Team::RoyalChallengersBangalore => "Royal Challengers Bangalore",
            Team::KolkataKnightRiders => "Kolkata Knight Riders",
            Team::KingsXiPunjab => "Kings XI Punjab",
            Team::ChennaiSuperKings => "Chennai Super Kings",
            Team::RajasthanRoyals => "Rajasthan Royals",
            Team::DelhiCapitals => "Delhi Capitals",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Team {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Team::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| InputError::UnknownTeam(s.to_string()))
    }
}

/// Host cities offered in the venue selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    #[serde(rename = "Abu Dhabi")]
    AbuDhabi,
    Ahmedabad,
    Bangalore,
    Bengaluru,
    Bloemfontein,
    #[serde(rename = "Cape Town")]
    CapeTown,
    Centurion,
    Chandigarh,
    Chennai,
    Cuttack,
    Delhi,
    Dharamsala,
    Durban,
    #[serde(rename = "East London")]
    EastLondon,
    Hyderabad,
    Indore,
    Jaipur,
    Johannesburg,
    Kimberley,
    Kolkata,
    Mohali,
    Mumbai,
    Nagpur,
    #[serde(rename = "Port Elizabeth")]
    PortElizabeth,
    Pune,
    Raipur,
    Ranchi,
    Sharjah,
    Visakhapatnam,
}

impl City {
    /// All cities, sorted alphabetically by name.
    pub const ALL: [City; 29] = [
        City::AbuDhabi,
        City::Ahmedabad,
        City::Bangalore,
        City::Bengaluru,
        City::Bloemfontein,
        City::CapeTown,
        City::Centurion,
        City::Chandigarh,
        City::Chennai,
        City::Cuttack,
        City::Delhi,
        City::Dharamsala,
        City::Durban,
        City::EastLondon,
        City::Hyderabad,
        City::Indore,
        City::Jaipur,
        City::Johannesburg,
        City::Kimberley,
        City::Kolkata,
        City::Mohali,
        City::Mumbai,
        City::Nagpur,
        City::PortElizabeth,
        City::Pune,
        City::Raipur,
        City::Ranchi,
        City::Sharjah,
        City::Visakhapatnam,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            City::AbuDhabi => "Abu Dhabi",
            City::Ahmedabad => "Ahmedabad",
            City::Bangalore => "Bangalore",
            City::Bengaluru => "Bengaluru",
            City::Bloemfontein => "Bloemfontein",
            City::CapeTown => "Cape Town",
            City::Centurion => "Centurion",
            City::Chandigarh => "Chandigarh",
            City::Chennai => "Chennai",
            City::Cuttack => "Cuttack",
            City::Delhi => "Delhi",
            City::Dharamsala => "Dharamsala",
            City::Durban => "Durban",
            City::EastLondon => "East London",
            City::Hyderabad => "Hyderabad",
            City::Indore => "Indore",
            City::Jaipur => "Jaipur",
            City::Johannesburg => "Johannesburg",
            City::Kimberley => "Kimberley",
            City::Kolkata => "Kolkata",
            City::Mohali => "Mohali",
            City::Mumbai => "Mumbai",
            City::Nagpur => "Nagpur",
            City::PortElizabeth => "Port Elizabeth",
            City::Pune => "Pune",
            City::Raipur => "Raipur",
            City::Ranchi => "Ranchi",
            City::Sharjah => "Sharjah",
            City::Visakhapatnam => "Visakhapatnam",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for City {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        City::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| InputError::UnknownCity(s.to_string()))
    }
}

/// Balls in a completed 20-over innings.
pub const BALLS_PER_INNINGS: f64 = 120.0;
/// Overs in a T20 innings.
pub const MAX_OVERS: f64 = 20.0;
/// Wickets that end an innings; `wickets_fallen` is capped one below.
pub const TEAM_WICKETS: u8 = 10;

/// Second-innings match situation as entered on the form.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchState {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub city: City,
    /// Runs the batting side must reach
    pub target: u32,
    pub current_score: u32,
    /// 0–9
    pub wickets_fallen: u8,
    /// 0.0–20.0 in steps of 0.1
    pub overs_completed: f64,
}

impl MatchState {
    /// Build a match state, rejecting inputs the form would never allow.
    pub fn new(
        batting_team: Team,
        bowling_team: Team,
        city: City,
        target: u32,
        current_score: u32,
        wickets_fallen: u8,
        overs_completed: f64,
    ) -> Result<Self, InputError> {
        let state = MatchState {
            batting_team,
            bowling_team,
            city,
            target,
            current_score,
            wickets_fallen,
            overs_completed,
        };
        state.validate()?;
        Ok(state)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.batting_team == self.bowling_team {
            return Err(InputError::SameTeams(self.batting_team));
        }
        if self.wickets_fallen >= TEAM_WICKETS {
            return Err(InputError::WicketsOutOfRange(self.wickets_fallen));
        }
        let overs = self.overs_completed;
        if !overs.is_finite() || !(0.0..=MAX_OVERS).contains(&overs) {
            return Err(InputError::OversOutOfRange(overs));
        }
        let tenths = overs * 10.0;
        if (tenths - tenths.round()).abs() > 1e-6 {
            return Err(InputError::OversPrecision(overs));
        }
        Ok(())
    }
}

/// Classifier input derived from a [`MatchState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub city: City,
    /// May be negative once the target has been passed
    pub runs_left: i64,
    pub balls_left: f64,
    /// Negative only if the state skipped validation
    pub wickets_left: i16,
    pub target: u32,
    pub current_run_rate: f64,
    pub required_run_rate: f64,
}
