use serde::Deserialize;
use std::fmt;

/// * `t_base` - (s) Lap time of a driver with full skill before random influences
/// * `t_per_skill_point` - (s) Time loss per missing skill point
/// * `t_spread` - (s) Maximum random time loss per lap
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LaptimePars {
    pub t_base: f64,
    pub t_per_skill_point: f64,
    pub t_spread: f64,
}

impl Default for LaptimePars {
    fn default() -> Self {
        LaptimePars {
            t_base: 83.0,
            t_per_skill_point: 0.05,
            t_spread: 2.0,
        }
    }
}

/// LapTime stores a lap time in seconds. It is displayed as `m:ss.sss`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct LapTime(pub f64);

impl LapTime {
    pub fn seconds(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for LapTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let minutes = (self.0 / 60.0).floor();
        let seconds = self.0 - minutes * 60.0;
        write!(f, "{}:{:06.3}", minutes as u64, seconds)
    }
}

/// calc_laptime returns the lap time of a driver with the given skill, u in [0, 1) determines the
/// random part of the lap time.
pub fn calc_laptime(skill: u32, laptime_pars: &LaptimePars, u: f64) -> LapTime {
    LapTime(
        laptime_pars.t_base
            + (100 - skill.min(100)) as f64 * laptime_pars.t_per_skill_point
            + u * laptime_pars.t_spread,
    )
}
