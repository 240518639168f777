use crate::core::driver::DriverRaceState;
use helpers::general::{argsort, SortOrder};
use std::fmt::Write;

/// Championship points for the positions 1 to 10.
pub const POINTS_SYSTEM: [u32; 10] = [25, 18, 15, 12, 10, 8, 6, 4, 2, 1];

/// points_for_position returns the championship points of a classified (not retired) driver.
pub fn points_for_position(position: u32) -> u32 {
    match position {
        0 => 0,
        p => POINTS_SYSTEM.get(p as usize - 1).copied().unwrap_or(0),
    }
}

/// ClassifiedDriver contains the final race information of one of the team's drivers.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedDriver {
    pub driver_id: String,
    pub name: String,
    pub position: u32,
    pub points: u32,
    pub best_lap: String,
    pub pit_stops: u32,
    pub dnf: bool,
}

impl ClassifiedDriver {
    /// scored is true for drivers that finished the race within the points.
    pub fn scored(&self) -> bool {
        !self.dnf && self.points > 0
    }
}

/// Classification contains the team's drivers sorted by ascending final position.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub tot_no_laps: u32,
    pub entries: Vec<ClassifiedDriver>,
    pub total_points: u32,
}

impl Classification {
    /// classify sorts the drivers by position and awards points to all drivers that did not
    /// retire and finished within the top ten.
    pub fn classify(drivers: &[DriverRaceState], tot_no_laps: u32) -> Classification {
        let positions: Vec<u32> = drivers.iter().map(|driver| driver.position).collect();

        let entries: Vec<ClassifiedDriver> = argsort(&positions, SortOrder::Ascending)
            .into_iter()
            .map(|idx| {
                let driver = &drivers[idx];
                let points = if driver.did_not_finish {
                    0
                } else {
                    points_for_position(driver.position)
                };

                ClassifiedDriver {
                    driver_id: driver.driver_id.to_owned(),
                    name: driver.name.to_owned(),
                    position: driver.position,
                    points,
                    best_lap: driver.best_lap_time.to_string(),
                    pit_stops: driver.pit_stop_count,
                    dnf: driver.did_not_finish,
                }
            })
            .collect();

        let total_points = entries.iter().map(|entry| entry.points).sum();

        Classification {
            tot_no_laps,
            entries,
            total_points,
        }
    }

    /// print_classification prints the classification to the console output.
    pub fn print_classification(&self) {
        let mut tmp_string = String::new();

        for entry in self.entries.iter() {
            let position = if entry.dnf {
                String::from("DNF")
            } else {
                format!("P{}", entry.position)
            };

            // writing into a String cannot fail
            let _ = writeln!(
                &mut tmp_string,
                "{:>4}  {:<20} best lap {}  pit stops {}  points {:2}",
                position, entry.name, entry.best_lap, entry.pit_stops, entry.points
            );
        }

        println!("RESULT: Classification after {} laps", self.tot_no_laps);
        print!("{}", tmp_string);
        println!("RESULT: Team scored {} points", self.total_points);
    }
}
