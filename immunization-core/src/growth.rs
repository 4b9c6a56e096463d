//! Weight-for-age chart series and the biometrics table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::age::parse_clinical_date;
use crate::ScheduleError;

const DAYS_PER_MONTH: f64 = 30.44;

/// Reference percentile curves drawn behind the patient's points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PercentileBand {
    P3,
    P15,
    P50,
    P85,
    P97,
}

impl PercentileBand {
    pub const ALL: [PercentileBand; 5] = [
        PercentileBand::P3,
        PercentileBand::P15,
        PercentileBand::P50,
        PercentileBand::P85,
        PercentileBand::P97,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PercentileBand::P3 => "P3",
            PercentileBand::P15 => "P15",
            PercentileBand::P50 => "P50",
            PercentileBand::P85 => "P85",
            PercentileBand::P97 => "P97",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

/// Reference weight (kg) at an age in months.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReferencePoint {
    pub age: f64,
    pub weight: f64,
}

/// WHO-style weight-for-age reference, keyed `boys` / `girls`, then by band.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GrowthReference {
    #[serde(default)]
    pub boys: BTreeMap<PercentileBand, Vec<ReferencePoint>>,
    #[serde(default)]
    pub girls: BTreeMap<PercentileBand, Vec<ReferencePoint>>,
}

impl GrowthReference {
    pub fn curves(&self, sex: Sex) -> &BTreeMap<PercentileBand, Vec<ReferencePoint>> {
        match sex {
            Sex::Male => &self.boys,
            Sex::Female => &self.girls,
        }
    }
}

/// One recorded biometrics entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Measurement {
    pub date: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub bmi: Option<f64>,
}

/// A point on the line chart: `key` is age in months, `value` is weight in kg.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartPoint {
    pub group: String,
    pub key: f64,
    pub value: f64,
}

/// Elapsed months (30.44-day months) rounded to two decimals.
pub fn age_in_months(birth_date: &str, measured_at: &str) -> Result<f64, ScheduleError> {
    let birth = parse_clinical_date(birth_date)?;
    let measured = parse_clinical_date(measured_at)?;
    let days = measured.signed_duration_since(birth).num_seconds() as f64 / 86_400.0;
    Ok(((days / DAYS_PER_MONTH) * 100.0).round() / 100.0)
}

/// Reference curves for every band followed by the patient's own points.
///
/// Measurements without a weight or with an unreadable date are left out.
pub fn weight_for_age_series(
    reference: &GrowthReference,
    sex: Sex,
    birth_date: &str,
    measurements: &[Measurement],
) -> Vec<ChartPoint> {
    let curves = reference.curves(sex);
    let mut series: Vec<ChartPoint> = PercentileBand::ALL
        .into_iter()
        .flat_map(|band| {
            curves
                .get(&band)
                .into_iter()
                .flatten()
                .map(move |point| ChartPoint {
                    group: band.label().to_string(),
                    key: point.age,
                    value: point.weight,
                })
        })
        .collect();

    for measurement in measurements {
        let Some(weight) = measurement.weight else {
            continue;
        };
        match age_in_months(birth_date, &measurement.date) {
            Ok(months) => series.push(ChartPoint {
                group: "Patient".to_string(),
                key: months,
                value: weight,
            }),
            Err(err) => warn!(error = %err, "measurement left off the growth chart"),
        }
    }

    series
}

/// Row of the biometrics table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObservationRow {
    pub date: String,
    pub weight: Option<String>,
    pub height: Option<String>,
    pub bmi: Option<String>,
}

pub fn observation_rows(measurements: &[Measurement]) -> Vec<ObservationRow> {
    measurements
        .iter()
        .map(|measurement| ObservationRow {
            date: parse_clinical_date(&measurement.date)
                .map(|dt| dt.format("%d-%b-%Y, %H:%M").to_string())
                .unwrap_or_else(|_| measurement.date.clone()),
            weight: measurement.weight.map(format_one_decimal),
            height: measurement.height.map(|height| height.to_string()),
            bmi: measurement.bmi.map(format_one_decimal),
        })
        .collect()
}

fn format_one_decimal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value}")
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> GrowthReference {
        serde_json::from_str(
            r#"{
                "boys": {
                    "P3": [{"age": 0, "weight": 2.5}, {"age": 1, "weight": 3.4}],
                    "P50": [{"age": 0, "weight": 3.3}],
                    "P97": [{"age": 0, "weight": 4.3}]
                },
                "girls": {
                    "P50": [{"age": 0, "weight": 3.2}]
                }
            }"#,
        )
        .expect("reference json")
    }

    #[test]
    fn months_use_average_month_length() {
        assert_eq!(age_in_months("2024-01-01", "2024-01-01").unwrap(), 0.0);
        assert_eq!(age_in_months("2024-01-01", "2024-01-31").unwrap(), 0.99);
        assert_eq!(age_in_months("2024-01-01", "2025-01-01").unwrap(), 12.02);
        assert!(age_in_months("2024-01-01", "yesterday").is_err());
    }

    #[test]
    fn series_walks_bands_in_order_then_patient() {
        let measurements = [
            Measurement {
                date: "2024-01-31".to_string(),
                weight: Some(4.1),
                ..Measurement::default()
            },
            Measurement {
                date: "not a date".to_string(),
                weight: Some(5.0),
                ..Measurement::default()
            },
            Measurement {
                date: "2024-02-15".to_string(),
                height: Some(55.0),
                ..Measurement::default()
            },
        ];

        let series = weight_for_age_series(&reference(), Sex::Male, "2024-01-01", &measurements);
        let groups: Vec<&str> = series.iter().map(|point| point.group.as_str()).collect();
        assert_eq!(groups, vec!["P3", "P3", "P50", "P97", "Patient"]);
        assert_eq!(series[4].key, 0.99);
        assert_eq!(series[4].value, 4.1);
    }

    #[test]
    fn series_uses_the_matching_sex() {
        let series = weight_for_age_series(&reference(), Sex::Female, "2024-01-01", &[]);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].value, 3.2);
    }

    #[test]
    fn table_rows_trim_fractional_values() {
        let rows = observation_rows(&[Measurement {
            date: "2024-03-05T09:30:00Z".to_string(),
            weight: Some(6.27),
            height: Some(61.0),
            bmi: Some(16.0),
        }]);
        assert_eq!(rows[0].date, "05-Mar-2024, 09:30");
        assert_eq!(rows[0].weight.as_deref(), Some("6.3"));
        assert_eq!(rows[0].height.as_deref(), Some("61"));
        assert_eq!(rows[0].bmi.as_deref(), Some("16"));
    }
}
