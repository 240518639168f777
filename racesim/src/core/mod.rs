pub mod conditions;
pub mod driver;
pub mod handle_race;
pub mod laptime;
pub mod race;
pub mod random;
pub mod scheduler;
pub mod simulator;
pub mod tireset;
