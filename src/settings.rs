use std::{fmt::Debug, fs, num::NonZeroU32, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    core::{emission::EmissionCoefficients, year_month::YearMonth},
    prelude::*,
};

/// Tunables that used to be hardcoded in the dashboards.
#[must_use]
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Number of sub-regions the national total is divided by to get a per-region average.
    pub region_count: NonZeroU32,

    pub coefficients: Coefficients,

    /// Reject malformed numbers instead of treating them as zero.
    pub strict: bool,

    /// First month of the historical charts.
    pub history_since: YearMonth,

    /// Last month with actual data.
    pub actual_until: YearMonth,

    /// First forecasted month.
    pub forecast_since: YearMonth,

    pub target_year: u16,

    /// Reduction of the last actual month's emissions expected by the target year.
    pub target_reduction: f64,
}

#[must_use]
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Coefficients {
    pub standard: EmissionCoefficients,
    pub statistics_table: EmissionCoefficients,
}

impl Default for Coefficients {
    fn default() -> Self {
        Self {
            standard: EmissionCoefficients::STANDARD,
            statistics_table: EmissionCoefficients::STATISTICS_TABLE,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region_count: const { NonZeroU32::new(253).unwrap() },
            coefficients: Coefficients::default(),
            strict: false,
            history_since: const { YearMonth::new(2020, 1).unwrap() },
            actual_until: const { YearMonth::new(2025, 6).unwrap() },
            forecast_since: const { YearMonth::new(2025, 7).unwrap() },
            target_year: 2030,
            target_reduction: 0.3,
        }
    }
}

impl Settings {
    /// Read the settings, falling back to the defaults when the file does not exist.
    #[instrument(skip_all, fields(path = ?path))]
    pub fn read_from<P: AsRef<Path> + Debug>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            debug!("no settings file, using the defaults");
            return Ok(Self::default());
        }
        let settings = Self::from_toml(&fs::read_to_string(path)?)
            .with_context(|| format!("failed to read the settings from `{}`", path.display()))?;
        info!(
            region_count = settings.region_count.get(),
            strict = settings.strict,
            "loaded the settings",
        );
        Ok(settings)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        ensure!(
            settings.history_since <= settings.actual_until,
            "the history must start before the actual data ends",
        );
        ensure!(
            (0.0..=1.0).contains(&settings.target_reduction),
            "the target reduction must be within 0..=1",
        );
        Ok(settings)
    }
}
