use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Sunny,
    Cloudy,
    Rain,
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Weather::Sunny => write!(f, "sunny"),
            Weather::Cloudy => write!(f, "cloudy"),
            Weather::Rain => write!(f, "rain"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackCondition {
    Dry,
    Damp,
    Wet,
}

impl fmt::Display for TrackCondition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrackCondition::Dry => write!(f, "dry"),
            TrackCondition::Damp => write!(f, "damp"),
            TrackCondition::Wet => write!(f, "wet"),
        }
    }
}

/// * `weather` - Weather during the session
/// * `track_condition` - Condition of the track surface
/// * `temperature` - (°C) Air temperature
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConditions {
    pub weather: Weather,
    pub track_condition: TrackCondition,
    pub temperature: f64,
}

impl Default for SessionConditions {
    fn default() -> Self {
        SessionConditions {
            weather: Weather::Sunny,
            track_condition: TrackCondition::Dry,
            temperature: 24.0,
        }
    }
}

impl SessionConditions {
    /// weather_penalty returns the reduction of the overtaking chance caused by the weather (only
    /// rain has an effect).
    pub fn weather_penalty(&self, rain_penalty: f64) -> f64 {
        match self.weather {
            Weather::Rain => rain_penalty,
            _ => 0.0,
        }
    }
}
