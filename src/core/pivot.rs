use crate::{
    core::{
        directory::City,
        emission::EmissionCoefficients,
        record::{EnergyType, UsageRecord},
    },
    prelude::*,
};

/// Which value of a record goes into the table cells.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CellValue {
    /// Usage in kilowatt-hours, the backend reports watt-hours.
    Usage(EnergyType),

    /// Emissions in tCO₂ of one energy type or, with `None`, of both.
    Emissions(Option<EnergyType>, EmissionCoefficients),
}

impl CellValue {
    #[must_use]
    pub fn select(self, record: &UsageRecord) -> f64 {
        match self {
            Self::Usage(energy_type) => (record.usage(energy_type) / 1000.0).round(),
            Self::Emissions(energy_type, coefficients) => {
                let emissions = match energy_type {
                    Some(energy_type) => {
                        coefficients.for_energy(energy_type, record.usage(energy_type) / 1e6)
                    }
                    None => record.emissions(coefficients) / 1e6,
                };
                (emissions.0 * 1000.0).round() / 1000.0
            }
        }
    }

    /// Whether the selected value fills a cell.
    ///
    /// Usage cells only take positive values, single-energy emission cells skip zeros,
    /// and combined emission cells take everything.
    #[must_use]
    pub fn is_shown(self, value: f64) -> bool {
        match self {
            Self::Usage(_) => value > 0.0,
            Self::Emissions(Some(_), _) => value != 0.0,
            Self::Emissions(None, _) => true,
        }
    }

    /// Decimal places worth showing.
    #[must_use]
    pub const fn precision(self) -> usize {
        match self {
            Self::Usage(_) => 0,
            Self::Emissions(..) => 3,
        }
    }
}

#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct RegionRow {
    pub code: u32,
    pub name: String,

    /// January to December, `None` until the first contribution.
    pub months: [Option<f64>; 12],
}

impl RegionRow {
    const fn new(code: u32, name: String) -> Self {
        Self { code, name, months: [None; 12] }
    }

    fn accumulate(&mut self, month_index: usize, value: f64) {
        let cell = &mut self.months[month_index];
        *cell = Some(cell.unwrap_or_default() + value);
    }
}

/// District-by-month table of a single city, with a total row on top.
#[must_use]
pub struct RegionTable {
    pub total: RegionRow,
    pub districts: Vec<RegionRow>,
}

impl RegionTable {
    /// Pivot the records into one row per known district.
    ///
    /// Records of unknown districts are skipped, and so are values that [`CellValue::is_shown`]
    /// rejects: those leave the cell untouched.
    #[instrument(skip_all, fields(city = %city.name))]
    pub fn build<'a>(
        code: u32,
        city: &City,
        records: impl IntoIterator<Item = &'a UsageRecord>,
        cell_value: CellValue,
    ) -> Self {
        let mut total = RegionRow::new(code, format!("{} 전체", city.name));
        let mut districts: Vec<RegionRow> = city
            .districts
            .iter()
            .map(|(code, name)| RegionRow::new(*code, name.clone()))
            .collect();

        let mut n_skipped = 0_usize;
        for record in records {
            let value = cell_value.select(record);
            if !cell_value.is_shown(value) {
                continue;
            }
            let Ok(index) = districts.binary_search_by_key(&record.county_id, |row| row.code)
            else {
                n_skipped += 1;
                continue;
            };
            let month_index = record.year_month.month_index();
            districts[index].accumulate(month_index, value);
            total.accumulate(month_index, value);
        }
        if n_skipped != 0 {
            debug!(n_skipped, "skipped records of unknown districts");
        }

        Self { total, districts }
    }

    pub fn rows(&self) -> impl Iterator<Item = &RegionRow> {
        std::iter::once(&self.total).chain(&self.districts)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::core::year_month::YearMonth;

    fn city() -> City {
        City {
            name: "서울특별시".to_string(),
            districts: BTreeMap::from([
                (11110, "종로구".to_string()),
                (11140, "중구".to_string()),
            ]),
        }
    }

    fn record(county_id: u32, month: u8, electricity: f64, gas: f64) -> UsageRecord {
        UsageRecord::builder()
            .city_id(11)
            .county_id(county_id)
            .year_month(YearMonth::new(2024, month).unwrap())
            .electricity(electricity)
            .gas(gas)
            .build()
    }

    #[test]
    fn test_build() {
        let records = [
            record(11110, 1, 1_000_000.0, 0.0),
            record(11110, 1, 500_000.0, 0.0),
            record(11140, 2, 2_000_000.0, 0.0),
            record(99999, 1, 7_000_000.0, 0.0),
            record(11140, 3, 0.0, 10.0),
        ];
        let table =
            RegionTable::build(11, &city(), &records, CellValue::Usage(EnergyType::Electricity));

        assert_eq!(table.total.name, "서울특별시 전체");
        assert_eq!(table.districts.len(), 2);
        assert_eq!(table.districts[0].months[0], Some(1500.0));
        assert_eq!(table.districts[0].months[1], None);
        assert_eq!(table.districts[1].months[1], Some(2000.0));
        assert_eq!(table.districts[1].months[2], None);
        assert_eq!(table.total.months[0], Some(1500.0));
        assert_eq!(table.total.months[1], Some(2000.0));
        assert_eq!(table.total.months[2], None);

        let names: Vec<_> = table.rows().map(|row| row.name.as_str()).collect();
        assert_eq!(names, ["서울특별시 전체", "종로구", "중구"]);
    }

    #[test]
    fn test_empty_records_keep_placeholders() {
        let table = RegionTable::build(11, &city(), &[], CellValue::Usage(EnergyType::Gas));
        assert!(table.rows().all(|row| row.months.iter().all(Option::is_none)));
    }

    #[test]
    fn test_emissions_cell() {
        let coefficients = EmissionCoefficients::STATISTICS_TABLE;
        let record = record(11110, 1, 2_000_000.0, 1_000_000.0);
        assert_abs_diff_eq!(
            CellValue::Emissions(Some(EnergyType::Gas), coefficients).select(&record),
            0.204,
        );
        assert_abs_diff_eq!(
            CellValue::Emissions(None, coefficients).select(&record),
            1.112,
            epsilon = 1e-9,
        );
    }

    #[test]
    fn test_usage_cell_rounds_to_kilowatt_hours() {
        let record = record(11110, 1, 1_499.0, 0.0);
        assert_abs_diff_eq!(CellValue::Usage(EnergyType::Electricity).select(&record), 1.0);
    }

    #[test]
    fn test_negative_usage_is_not_shown() {
        let records = [record(11110, 1, -5000.0, 0.0)];
        let table =
            RegionTable::build(11, &city(), &records, CellValue::Usage(EnergyType::Electricity));
        assert_eq!(table.districts[0].months[0], None);
        assert_eq!(table.total.months[0], None);
    }

    #[test]
    fn test_zero_single_energy_emissions_are_not_shown() {
        let records = [record(11110, 1, 0.0, 0.0)];
        let cell_value =
            CellValue::Emissions(Some(EnergyType::Gas), EmissionCoefficients::STATISTICS_TABLE);
        let table = RegionTable::build(11, &city(), &records, cell_value);
        assert_eq!(table.districts[0].months[0], None);
    }

    #[test]
    fn test_zero_combined_emissions_are_shown() {
        let records = [record(11110, 1, 0.0, 0.0)];
        let cell_value = CellValue::Emissions(None, EmissionCoefficients::STATISTICS_TABLE);
        let table = RegionTable::build(11, &city(), &records, cell_value);
        assert_eq!(table.districts[0].months[0], Some(0.0));
        assert_eq!(table.total.months[0], Some(0.0));
        assert_eq!(table.districts[1].months[0], None);
    }

    #[test]
    fn test_negative_single_energy_emissions_are_shown() {
        let records = [record(11110, 1, -2_000_000.0, 0.0)];
        let cell_value = CellValue::Emissions(
            Some(EnergyType::Electricity),
            EmissionCoefficients::STATISTICS_TABLE,
        );
        let table = RegionTable::build(11, &city(), &records, cell_value);
        assert_abs_diff_eq!(table.districts[0].months[0].unwrap(), -0.908, epsilon = 1e-9);
    }
}
