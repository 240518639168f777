use serde::Deserialize;
use std::fmt;

pub const MAX_TYRE_WEAR: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TyreCompound {
    Soft,
    Medium,
    Hard,
}

impl fmt::Display for TyreCompound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TyreCompound::Soft => write!(f, "soft"),
            TyreCompound::Medium => write!(f, "medium"),
            TyreCompound::Hard => write!(f, "hard"),
        }
    }
}

/// * `wear_rate` - (%/lap) Maximum random tyre wear per lap
/// * `soft_wear_penalty` - (%/lap) Additional wear per lap on the soft compound
/// * `wear_pace_penalty` - Reduction of the overtaking chance at 100% tyre wear
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TyrePars {
    pub wear_rate: f64,
    pub soft_wear_penalty: f64,
    pub wear_pace_penalty: f64,
}

impl Default for TyrePars {
    fn default() -> Self {
        TyrePars {
            wear_rate: 3.0,
            soft_wear_penalty: 1.0,
            wear_pace_penalty: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tireset {
    pub compound: TyreCompound,
    pub wear: f64,
}

impl Tireset {
    pub fn new(compound: TyreCompound) -> Tireset {
        Tireset {
            compound,
            wear: 0.0,
        }
    }

    /// drive_lap increases the tyre wear by a random share of the wear rate (u in [0, 1)) plus the
    /// compound penalty. The wear is capped at 100%.
    pub fn drive_lap(&mut self, tyre_pars: &TyrePars, u: f64) {
        let mut wear_add = u * tyre_pars.wear_rate;

        if self.compound == TyreCompound::Soft {
            wear_add += tyre_pars.soft_wear_penalty
        }

        self.wear = (self.wear + wear_add).min(MAX_TYRE_WEAR);
    }

    /// pace_penalty returns the reduction of the overtaking chance caused by the current wear.
    pub fn pace_penalty(&self, tyre_pars: &TyrePars) -> f64 {
        self.wear / MAX_TYRE_WEAR * tyre_pars.wear_pace_penalty
    }

    /// change_tyres fits a fresh set of the given compound.
    pub fn change_tyres(&mut self, compound: TyreCompound) {
        self.compound = compound;
        self.wear = 0.0;
    }
}
