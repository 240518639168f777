use crate::core::conditions::{TrackCondition, Weather};
use crate::store::kv::timestamp_now;
use crate::store::records::{Driver, Race, RaceStatus, Team};
use crate::store::{RaceStore, StoreError};
use helpers::ids::generate_id;
use log::info;

const DEFAULT_TEAM_NAME: &str = "Velocity Racing";
const DEFAULT_TEAM_BUDGET: i64 = 50_000_000;

type CalendarEntry = (
    &'static str,
    &'static str,
    &'static str,
    u32,
    RaceStatus,
    Weather,
    f64,
    TrackCondition,
);

/// Season calendar 2024: name, location, date, laps, status, weather, temperature, track condition
#[rustfmt::skip]
const CALENDAR_2024: [CalendarEntry; 23] = [
    ("Bahrain Grand Prix", "Sakhir", "2024-03-02", 57, RaceStatus::Upcoming, Weather::Sunny, 28.0, TrackCondition::Dry),
    ("Saudi Arabian Grand Prix", "Jeddah", "2024-03-09", 50, RaceStatus::Upcoming, Weather::Sunny, 32.0, TrackCondition::Dry),
    ("Australian Grand Prix", "Melbourne", "2024-03-24", 58, RaceStatus::Upcoming, Weather::Cloudy, 22.0, TrackCondition::Dry),
    ("Japanese Grand Prix", "Suzuka", "2024-04-07", 53, RaceStatus::Upcoming, Weather::Cloudy, 18.0, TrackCondition::Damp),
    ("Chinese Grand Prix", "Shanghai", "2024-04-21", 56, RaceStatus::Upcoming, Weather::Sunny, 20.0, TrackCondition::Dry),
    ("Miami Grand Prix", "Miami", "2024-05-05", 57, RaceStatus::Upcoming, Weather::Sunny, 30.0, TrackCondition::Dry),
    ("Emilia Romagna Grand Prix", "Imola", "2024-05-19", 63, RaceStatus::Upcoming, Weather::Rain, 16.0, TrackCondition::Wet),
    ("Monaco Grand Prix", "Monaco", "2024-05-26", 78, RaceStatus::Active, Weather::Sunny, 24.0, TrackCondition::Dry),
    ("Canadian Grand Prix", "Montreal", "2024-06-09", 70, RaceStatus::Upcoming, Weather::Cloudy, 19.0, TrackCondition::Dry),
    ("Spanish Grand Prix", "Barcelona", "2024-06-23", 66, RaceStatus::Upcoming, Weather::Sunny, 26.0, TrackCondition::Dry),
    ("Austrian Grand Prix", "Spielberg", "2024-06-30", 71, RaceStatus::Upcoming, Weather::Sunny, 23.0, TrackCondition::Dry),
    ("British Grand Prix", "Silverstone", "2024-07-07", 52, RaceStatus::Upcoming, Weather::Rain, 17.0, TrackCondition::Wet),
    ("Hungarian Grand Prix", "Budapest", "2024-07-21", 70, RaceStatus::Upcoming, Weather::Sunny, 29.0, TrackCondition::Dry),
    ("Belgian Grand Prix", "Spa-Francorchamps", "2024-07-28", 44, RaceStatus::Upcoming, Weather::Cloudy, 20.0, TrackCondition::Damp),
    ("Dutch Grand Prix", "Zandvoort", "2024-08-25", 72, RaceStatus::Upcoming, Weather::Sunny, 21.0, TrackCondition::Dry),
    ("Italian Grand Prix", "Monza", "2024-09-01", 53, RaceStatus::Upcoming, Weather::Sunny, 27.0, TrackCondition::Dry),
    ("Azerbaijan Grand Prix", "Baku", "2024-09-15", 51, RaceStatus::Upcoming, Weather::Sunny, 25.0, TrackCondition::Dry),
    ("Singapore Grand Prix", "Singapore", "2024-09-22", 62, RaceStatus::Upcoming, Weather::Cloudy, 31.0, TrackCondition::Dry),
    ("United States Grand Prix", "Austin", "2024-10-20", 56, RaceStatus::Upcoming, Weather::Sunny, 24.0, TrackCondition::Dry),
    ("Mexican Grand Prix", "Mexico City", "2024-10-27", 71, RaceStatus::Upcoming, Weather::Sunny, 22.0, TrackCondition::Dry),
    ("Brazilian Grand Prix", "São Paulo", "2024-11-03", 71, RaceStatus::Upcoming, Weather::Rain, 25.0, TrackCondition::Wet),
    ("Las Vegas Grand Prix", "Las Vegas", "2024-11-23", 50, RaceStatus::Upcoming, Weather::Sunny, 15.0, TrackCondition::Dry),
    ("Abu Dhabi Grand Prix", "Abu Dhabi", "2024-12-08", 58, RaceStatus::Upcoming, Weather::Sunny, 28.0, TrackCondition::Dry),
];

/// default_races returns the season calendar that is stored on first access of the race store.
pub fn default_races() -> Vec<Race> {
    CALENDAR_2024
        .iter()
        .enumerate()
        .map(
            |(i, &(name, location, date, laps, status, weather, temperature, track_condition))| {
                Race {
                    id: format!("race_{}", i + 1),
                    name: name.to_owned(),
                    location: location.to_owned(),
                    date: date.to_owned(),
                    laps,
                    status,
                    weather,
                    temperature,
                    track_condition,
                    round_number: i as u32 + 1,
                }
            },
        )
        .collect()
}

/// * `name` - Driver name
/// * `skill` - Driver skill in [0, 100]
/// * `contract_years` - Remaining contract years
/// * `salary` - Yearly salary
/// * `age` - Age in years
/// * `nationality` - Nationality
/// * `experience` - Experience in seasons
/// * `specialties` - Driver specialties
struct DefaultDriver {
    name: &'static str,
    skill: u32,
    contract_years: u32,
    salary: u64,
    age: u32,
    nationality: &'static str,
    experience: u32,
    specialties: [&'static str; 2],
}

const DEFAULT_DRIVERS: [DefaultDriver; 2] = [
    DefaultDriver {
        name: "Alex Rodriguez",
        skill: 78,
        contract_years: 2,
        salary: 6_500_000,
        age: 26,
        nationality: "Spain",
        experience: 4,
        specialties: ["Wet Weather", "Overtaking"],
    },
    DefaultDriver {
        name: "Marcus Chen",
        skill: 74,
        contract_years: 1,
        salary: 4_200_000,
        age: 23,
        nationality: "Singapore",
        experience: 2,
        specialties: ["Qualifying", "Consistency"],
    },
];

/// initialize_user_data makes sure that the user owns a team and at least one driver. Missing
/// records are created with the default team and driver lineup.
pub fn initialize_user_data<S: RaceStore>(
    store: &mut S,
    user_id: &str,
) -> Result<(Team, Vec<Driver>), StoreError> {
    let mut rng = rand::thread_rng();

    let team = match store.read_team(user_id) {
        Some(team) => team,
        None => {
            let now = timestamp_now();
            let team = Team {
                id: generate_id(&mut rng),
                user_id: user_id.to_owned(),
                name: DEFAULT_TEAM_NAME.to_owned(),
                budget: DEFAULT_TEAM_BUDGET,
                reputation: 50,
                championship_points: 0,
                position: 10,
                created_at: now.to_owned(),
                updated_at: now,
            };
            store.write_team(&team)?;
            info!("Created team {} for user {}", team.name, user_id);
            team
        }
    };

    let mut drivers = store.read_drivers(user_id);

    if drivers.is_empty() {
        for default_driver in DEFAULT_DRIVERS.iter() {
            let driver = Driver {
                id: generate_id(&mut rng),
                name: default_driver.name.to_owned(),
                skill: default_driver.skill,
                contract_years: default_driver.contract_years,
                salary: default_driver.salary,
                age: default_driver.age,
                nationality: default_driver.nationality.to_owned(),
                experience: default_driver.experience,
                specialties: default_driver
                    .specialties
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                is_available: false,
                team_id: Some(team.id.to_owned()),
                user_id: user_id.to_owned(),
            };
            store.write_driver(&driver)?;
            drivers.push(driver);
        }
        info!("Signed default driver lineup for team {}", team.name);
    }

    Ok((team, drivers))
}
