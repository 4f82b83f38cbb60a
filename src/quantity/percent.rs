use std::fmt::{Debug, Display, Formatter};

use derive_more::{From, FromStr};
use serde::{Deserialize, Serialize};

/// Signed whole percentage, for example a usage increase or decrease rate.
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, From, FromStr, Serialize, Deserialize)]
pub struct Percent(pub i16);

impl Percent {
    pub fn to_proportion(self) -> f64 {
        0.01 * f64::from(self.0)
    }

    /// Multiplier that applies the rate: `1 + rate / 100`.
    pub fn to_factor(self) -> f64 {
        1.0 + self.to_proportion()
    }
}

impl Debug for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Display for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:+}%", self.0)
    }
}
