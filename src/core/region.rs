use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::prelude::*;

/// Administrative selection: the whole nation, a city (province), or a county within a city.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Region {
    Nation,
    City { city: u32 },
    County { city: u32, county: u32 },
}

impl Region {
    /// Build a region from optional city and county codes.
    ///
    /// Zero codes mean «not selected». Five-digit city codes (`11000`) are reduced to the
    /// two-digit form (`11`), and a county without a city derives the city from its own code.
    #[must_use]
    pub fn new(city: Option<u32>, county: Option<u32>) -> Self {
        let city = city.map(normalize_city_id).filter(|city| *city != 0);
        match (city, county.filter(|county| *county != 0)) {
            (city, Some(county)) => {
                Self::County { city: city.unwrap_or_else(|| normalize_city_id(county)), county }
            }
            (Some(city), None) => Self::City { city },
            (None, None) => Self::Nation,
        }
    }

    #[must_use]
    pub const fn city(self) -> Option<u32> {
        match self {
            Self::Nation => None,
            Self::City { city } | Self::County { city, .. } => Some(city),
        }
    }

    #[must_use]
    pub const fn county(self) -> Option<u32> {
        match self {
            Self::County { county, .. } => Some(county),
            _ => None,
        }
    }

    /// Query parameters understood by the backend, zero meaning «all».
    #[must_use]
    pub fn query(self) -> [(&'static str, String); 2] {
        [
            ("cityId", self.city().unwrap_or_default().to_string()),
            ("countyId", self.county().unwrap_or_default().to_string()),
        ]
    }
}

const fn normalize_city_id(city: u32) -> u32 {
    if city >= 1000 { city / 1000 } else { city }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nation => write!(f, "nationwide"),
            Self::City { city } => write!(f, "city {city}"),
            Self::County { city, county } => write!(f, "county {county} (city {city})"),
        }
    }
}

impl FromStr for Region {
    type Err = Error;

    /// Parse `"<city> [county]"`; an empty string selects the nation.
    fn from_str(text: &str) -> Result<Self> {
        let codes = text
            .split_whitespace()
            .map(|code| code.parse::<u32>().with_context(|| format!("invalid region code `{code}`")))
            .collect::<Result<Vec<_>>>()?;
        match codes.as_slice() {
            [] => Ok(Self::Nation),
            [city] => Ok(Self::new(Some(*city), None)),
            [city, county] => Ok(Self::new(Some(*city), Some(*county))),
            _ => bail!("expected at most two region codes, got `{text}`"),
        }
    }
}
