//! Normalization of loosely-typed backend records.
//!
//! Endpoints disagree on field names and occasionally on value types,
//! so records are flattened and looked up by candidate names in priority order.

use serde_json::{Map, Value};

use crate::{
    core::{record::UsageRecord, year_month::YearMonth},
    prelude::*,
};

/// What to do with missing or malformed numbers.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Strictness {
    /// Coerce them to zero.
    #[default]
    Lenient,

    /// Reject the whole response.
    Strict,
}

impl From<bool> for Strictness {
    fn from(is_strict: bool) -> Self {
        if is_strict { Self::Strict } else { Self::Lenient }
    }
}

#[derive(Copy, Clone, Debug)]
enum YearMonthFormat {
    /// Exactly six digits.
    Fixed,

    /// Anything [`YearMonth::parse_loose`] understands.
    Loose,
}

/// Field names of a particular endpoint.
#[derive(Copy, Clone, Debug)]
pub struct Schema {
    electricity: &'static [&'static str],
    gas: &'static [&'static str],
    year_month_format: YearMonthFormat,
}

const YEAR_MONTH: &[&str] = &["yearMonth", "YEAR_MONTH", "YM", "ym"];
const CITY_ID: &[&str] = &["cityId", "CITY_ID"];
const COUNTY_ID: &[&str] = &["countyId", "COUNTY_ID"];

impl Schema {
    pub const ACTUAL: Self = Self {
        electricity: &["useElect", "USE_ELECT", "ELEC", "elec", "ELEC_KWH"],
        gas: &["useGas", "USE_GAS", "GAS", "gas", "GAS_M3"],
        year_month_format: YearMonthFormat::Fixed,
    };

    pub const FORECAST: Self = Self {
        electricity: &["preElect", "PRE_ELECT"],
        gas: &["preGas", "PRE_GAS"],
        year_month_format: YearMonthFormat::Fixed,
    };

    pub const NATIONAL: Self = Self { year_month_format: YearMonthFormat::Loose, ..Self::ACTUAL };
}

/// Extract the item list from either the `{ "items": [...] }` envelope or a bare array.
///
/// Anything else yields an empty list.
#[must_use]
pub fn into_items(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("items") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Convert raw items into records.
///
/// Items without a parsable year-month are dropped.
pub fn normalize(
    items: &[Value],
    schema: Schema,
    strictness: Strictness,
) -> Result<Vec<UsageRecord>> {
    let mut records = Vec::with_capacity(items.len());
    for item in items {
        let mut fields = Map::new();
        flatten(item, "", &mut fields);
        let Some(year_month) = parse_year_month(pick(&fields, YEAR_MONTH), schema.year_month_format)
        else {
            trace!(?item, "dropping an item without a valid year-month");
            continue;
        };
        let electricity = parse_number(pick(&fields, schema.electricity), strictness)
            .with_context(|| format!("invalid electricity usage in {year_month}"))?;
        let gas = parse_number(pick(&fields, schema.gas), strictness)
            .with_context(|| format!("invalid gas usage in {year_month}"))?;
        records.push(
            UsageRecord::builder()
                .city_id(parse_code(pick(&fields, CITY_ID)))
                .county_id(parse_code(pick(&fields, COUNTY_ID)))
                .year_month(year_month)
                .electricity(electricity)
                .gas(gas)
                .build(),
        );
    }
    if records.len() != items.len() {
        debug!(n_items = items.len(), n_records = records.len(), "dropped malformed items");
    }
    Ok(records)
}

/// Flatten nested objects into dotted keys.
fn flatten(value: &Value, prefix: &str, into: &mut Map<String, Value>) {
    let Value::Object(object) = value else {
        return;
    };
    for (key, value) in object {
        let key = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
        if value.is_object() {
            flatten(value, &key, into);
        } else {
            into.insert(key, value.clone());
        }
    }
}

/// First candidate key present in the fields, even when its value is `null`.
fn pick<'a>(fields: &'a Map<String, Value>, candidates: &[&str]) -> Option<&'a Value> {
    candidates.iter().find_map(|candidate| fields.get(*candidate))
}

fn parse_year_month(value: Option<&Value>, format: YearMonthFormat) -> Option<YearMonth> {
    let text = match value? {
        Value::String(text) => text.clone(),
        Value::Number(number) => number_to_string(number)?,
        _ => return None,
    };
    match format {
        YearMonthFormat::Fixed => text.parse().ok(),
        YearMonthFormat::Loose => YearMonth::parse_loose(&text),
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::float_cmp)]
fn number_to_string(number: &serde_json::Number) -> Option<String> {
    if let Some(integer) = number.as_u64() {
        return Some(integer.to_string());
    }
    let float = number.as_f64()?;
    (float.trunc() == float && float >= 0.0).then(|| (float as u64).to_string())
}

/// Region codes are never critical: anything unparsable means «unknown».
fn parse_code(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::Number(number)) => number_to_string(number)
            .and_then(|code| code.parse().ok())
            .unwrap_or_default(),
        Some(Value::String(text)) => text.trim().parse().unwrap_or_default(),
        _ => 0,
    }
}

fn parse_number(value: Option<&Value>, strictness: Strictness) -> Result<f64> {
    let number = match value {
        None | Some(Value::Null) => None,
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) if text.trim().is_empty() => Some(0.0),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match (number.filter(|number| number.is_finite()), strictness) {
        (Some(number), _) => Ok(number),
        (None, Strictness::Lenient) => Ok(0.0),
        (None, Strictness::Strict) => bail!("expected a number, got `{value:?}`"),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_normalize_actual_ok() -> Result {
        // language=JSON
        const RESPONSE: &str = r#"
            {
                "items": [
                    { "cityId": 11, "countyId": 11110, "yearMonth": 202001, "useElect": 100.5, "useGas": "20" },
                    { "cityId": "11", "countyId": "11140", "yearMonth": "202002", "useElect": null },
                    { "cityId": 11, "countyId": 11140, "yearMonth": "2020-3", "useElect": 1 }
                ]
            }
        "#;
        let items = into_items(serde_json::from_str(RESPONSE)?);
        let records = normalize(&items, Schema::ACTUAL, Strictness::Lenient)?;
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].city_id, 11);
        assert_eq!(records[0].county_id, 11110);
        assert_eq!(records[0].year_month.key(), 202_001);
        assert_abs_diff_eq!(records[0].electricity, 100.5);
        assert_abs_diff_eq!(records[0].gas, 20.0);

        assert_eq!(records[1].county_id, 11140);
        assert_abs_diff_eq!(records[1].electricity, 0.0);
        assert_abs_diff_eq!(records[1].gas, 0.0);
        Ok(())
    }

    #[test]
    fn test_normalize_forecast_ok() -> Result {
        let items = vec![json!({ "yearMonth": 202507, "preElect": 10, "preGas": 5.5, "useElect": 99 })];
        let records = normalize(&items, Schema::FORECAST, Strictness::Lenient)?;
        assert_abs_diff_eq!(records[0].electricity, 10.0);
        assert_abs_diff_eq!(records[0].gas, 5.5);
        Ok(())
    }

    #[test]
    fn test_normalize_national_nested_ok() -> Result {
        let items = vec![json!({ "stats": { "YEAR_MONTH": "2024-07", "USE_ELECT": "1e3" } })];
        let mut fields = Map::new();
        flatten(&items[0], "", &mut fields);
        assert!(fields.contains_key("stats.YEAR_MONTH"));

        let items = vec![json!({ "YEAR_MONTH": "2024-07", "USE_ELECT": "1e3", "GAS": "abc" })];
        let records = normalize(&items, Schema::NATIONAL, Strictness::Lenient)?;
        assert_eq!(records[0].year_month.key(), 202_407);
        assert_abs_diff_eq!(records[0].electricity, 1000.0);
        assert_abs_diff_eq!(records[0].gas, 0.0);
        Ok(())
    }

    #[test]
    fn test_candidate_priority() -> Result {
        let items = vec![json!({ "yearMonth": 202001, "elect": 1, "USE_ELECT": 2, "useElect": 3 })];
        let records = normalize(&items, Schema::ACTUAL, Strictness::Lenient)?;
        assert_abs_diff_eq!(records[0].electricity, 3.0);
        Ok(())
    }

    #[test]
    fn test_strict_rejects_malformed() {
        let items = vec![json!({ "yearMonth": 202001, "useElect": "n/a", "useGas": 1 })];
        assert!(normalize(&items, Schema::ACTUAL, Strictness::Strict).is_err());
        assert!(normalize(&items, Schema::ACTUAL, Strictness::Lenient).is_ok());
    }

    #[test]
    fn test_into_items() {
        assert_eq!(into_items(json!([1, 2])).len(), 2);
        assert_eq!(into_items(json!({ "items": [1] })).len(), 1);
        assert!(into_items(json!({ "items": null })).is_empty());
        assert!(into_items(json!("nope")).is_empty());
    }

    #[test]
    fn test_float_year_month() -> Result {
        let items = vec![json!({ "yearMonth": 202001.0, "useElect": 1 })];
        let records = normalize(&items, Schema::ACTUAL, Strictness::Lenient)?;
        assert_eq!(records[0].year_month.key(), 202_001);
        Ok(())
    }

    #[test]
    fn test_float_region_codes() -> Result {
        let items = vec![json!({ "cityId": 11.0, "countyId": 11140.0, "yearMonth": 202001 })];
        let records = normalize(&items, Schema::ACTUAL, Strictness::Lenient)?;
        assert_eq!(records[0].city_id, 11);
        assert_eq!(records[0].county_id, 11140);
        Ok(())
    }

    #[test]
    fn test_fractional_region_code_is_unknown() {
        assert_eq!(parse_code(Some(&json!(11.5))), 0);
        assert_eq!(parse_code(Some(&json!(-1))), 0);
    }
}
