use crate::core::conditions::{TrackCondition, Weather};
use serde::{Deserialize, Serialize};

/// * `id` - Record id
/// * `user_id` - Owner of the team
/// * `name` - Team name, e.g. Velocity Racing
/// * `budget` - Available budget
/// * `reputation` - Team reputation in [0, 100]
/// * `championship_points` - Cumulative championship points of the season
/// * `position` - Championship position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub budget: i64,
    pub reputation: u32,
    pub championship_points: u32,
    pub position: u32,
    pub created_at: String,
    pub updated_at: String,
}

/// * `skill` - Driver skill in [0, 100], used by the race simulation
/// * `team_id` - Team the driver is contracted to (none for scouting pool drivers)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub skill: u32,
    pub contract_years: u32,
    pub salary: u64,
    pub age: u32,
    pub nationality: String,
    pub experience: u32,
    pub specialties: Vec<String>,
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    pub user_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaceStatus {
    Upcoming,
    Active,
    Completed,
}

/// * `laps` - Total number of laps in the race
/// * `date` - Race date (ISO 8601, e.g. 2024-05-26)
/// * `round_number` - Round of the season calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub id: String,
    pub name: String,
    pub location: String,
    pub date: String,
    pub laps: u32,
    pub status: RaceStatus,
    pub weather: Weather,
    pub temperature: f64,
    pub track_condition: TrackCondition,
    pub round_number: u32,
}

/// RaceResult is stored for every driver that scored in a race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceResult {
    pub id: String,
    pub user_id: String,
    pub race_id: String,
    pub driver_id: String,
    pub position: u32,
    pub points: u32,
    pub best_lap: String,
    pub pit_stops: u32,
    pub dnf: bool,
}
