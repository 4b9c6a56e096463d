//! FHIR JSON bundle to immunization schedule and growth chart inputs.

use chrono::{DateTime, Utc};
use immunization_core::{
    weight_for_age_series, ChartPoint, GrowthReference, Measurement, ObservedDose,
    ScheduleCatalog, ScheduleConfig, ScheduleError, ScheduleSnapshot, Sex,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Concept codes and units used to pick biometrics out of Observation resources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConceptConfig {
    pub weight_uuid: String,
    pub height_uuid: String,
    pub bmi_uuid: String,
    pub weight_unit: String,
    pub height_unit: String,
    pub bmi_unit: String,
}

impl Default for ConceptConfig {
    fn default() -> Self {
        Self {
            weight_uuid: "5089AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_string(),
            height_uuid: "5090AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_string(),
            bmi_uuid: "1342AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_string(),
            weight_unit: "kg".to_string(),
            height_unit: "Cm".to_string(),
            bmi_unit: "kg/m²".to_string(),
        }
    }
}

/// Patient data pulled out of one bundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PatientRecord {
    pub patient_id: Option<String>,
    pub birth_date: String,
    pub gender: Option<String>,
    pub doses: Vec<ObservedDose>,
    pub measurements: Vec<Measurement>,
}

impl PatientRecord {
    /// Chart sex; anything other than `male` uses the girls' curves.
    pub fn sex(&self) -> Sex {
        match self.gender.as_deref() {
            Some("male") => Sex::Male,
            _ => Sex::Female,
        }
    }
}

/// Build the schedule snapshot from a JSON string.
pub fn schedule_from_bundle_str(
    bundle_json: &str,
    catalog: &ScheduleCatalog,
    config: &ScheduleConfig,
    current_date: DateTime<Utc>,
) -> Result<ScheduleSnapshot, ScheduleError> {
    let value: Value =
        serde_json::from_str(bundle_json).map_err(|err| ScheduleError::Parse(err.to_string()))?;
    schedule_from_bundle_value(&value, catalog, config, current_date)
}

/// Build the schedule snapshot from a `serde_json::Value`.
pub fn schedule_from_bundle_value(
    bundle: &Value,
    catalog: &ScheduleCatalog,
    config: &ScheduleConfig,
    current_date: DateTime<Utc>,
) -> Result<ScheduleSnapshot, ScheduleError> {
    let record = read_bundle(bundle, &ConceptConfig::default())?;
    Ok(ScheduleSnapshot::build(
        catalog,
        &record.birth_date,
        &record.doses,
        current_date,
        config,
    ))
}

/// Weight-for-age chart points for the patient in `bundle`.
pub fn growth_chart_from_bundle_value(
    bundle: &Value,
    reference: &GrowthReference,
    concepts: &ConceptConfig,
) -> Result<Vec<ChartPoint>, ScheduleError> {
    let record = read_bundle(bundle, concepts)?;
    Ok(weight_for_age_series(
        reference,
        record.sex(),
        &record.birth_date,
        &record.measurements,
    ))
}

/// Collect the patient, immunizations and biometrics from a FHIR `Bundle`.
pub fn read_bundle(
    bundle: &Value,
    concepts: &ConceptConfig,
) -> Result<PatientRecord, ScheduleError> {
    let bundle_type = bundle
        .get("resourceType")
        .and_then(Value::as_str)
        .ok_or(ScheduleError::MissingData)?;

    if bundle_type != "Bundle" {
        return Err(ScheduleError::Parse(format!(
            "Expected resourceType Bundle, received {bundle_type}"
        )));
    }

    let entries = bundle
        .get("entry")
        .and_then(Value::as_array)
        .ok_or(ScheduleError::MissingData)?;

    let mut record = PatientRecord::default();
    let mut birth_date = None;

    for entry in entries {
        let Some(resource) = entry.get("resource") else {
            continue;
        };

        match resource
            .get("resourceType")
            .and_then(Value::as_str)
            .unwrap_or_default()
        {
            "Patient" => {
                record.patient_id = resource
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                record.gender = resource
                    .get("gender")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                birth_date = resource
                    .get("birthDate")
                    .and_then(Value::as_str)
                    .map(str::to_string);
            }
            "Immunization" => {
                if let Some(dose) = read_immunization(resource) {
                    record.doses.push(dose);
                }
            }
            "Observation" => record_measurement(&mut record.measurements, resource, concepts),
            other => debug!(resource_type = other, "resource ignored"),
        }
    }

    record.birth_date = birth_date.ok_or(ScheduleError::MissingData)?;
    debug!(
        doses = record.doses.len(),
        measurements = record.measurements.len(),
        "bundle read"
    );
    Ok(record)
}

fn read_immunization(resource: &Value) -> Option<ObservedDose> {
    let id = resource.get("id").and_then(Value::as_str);

    if resource.get("status").and_then(Value::as_str) == Some("entered-in-error") {
        debug!(id, "immunization entered in error");
        return None;
    }

    let Some(vaccine_name) = resource.get("vaccineCode").and_then(extract_codeable_text) else {
        debug!(id, "immunization without vaccine code");
        return None;
    };

    let dose_number = resource
        .get("protocolApplied")
        .and_then(Value::as_array)
        .and_then(|applied| applied.first())
        .and_then(|protocol| protocol.get("doseNumberPositiveInt"))
        .and_then(Value::as_u64)
        .and_then(|number| u32::try_from(number).ok());

    Some(ObservedDose {
        vaccine_name,
        dose_number,
        occurrence_date_time: text_field(resource, "occurrenceDateTime").unwrap_or_default(),
        expiration_date: text_field(resource, "expirationDate"),
        lot_number: text_field(resource, "lotNumber"),
        manufacturer: resource
            .get("manufacturer")
            .and_then(|manufacturer| manufacturer.get("display"))
            .and_then(Value::as_str)
            .map(str::to_string),
        immunization_id: id.map(str::to_string),
        visit_id: resource
            .get("encounter")
            .and_then(|encounter| encounter.get("reference"))
            .and_then(Value::as_str)
            .map(|reference| reference.trim_start_matches("Encounter/").to_string()),
    })
}

fn record_measurement(
    measurements: &mut Vec<Measurement>,
    resource: &Value,
    concepts: &ConceptConfig,
) {
    let codes = coding_codes(resource.get("code"));
    let kind = if codes.contains(&concepts.weight_uuid.as_str()) {
        Biometric::Weight
    } else if codes.contains(&concepts.height_uuid.as_str()) {
        Biometric::Height
    } else if codes.contains(&concepts.bmi_uuid.as_str()) {
        Biometric::Bmi
    } else {
        return;
    };

    let Some(value) = resource
        .get("valueQuantity")
        .and_then(|quantity| quantity.get("value"))
        .and_then(Value::as_f64)
    else {
        return;
    };
    let Some(date) = text_field(resource, "effectiveDateTime") else {
        return;
    };

    let index = match measurements.iter().position(|existing| existing.date == date) {
        Some(index) => index,
        None => {
            measurements.push(Measurement {
                date,
                ..Measurement::default()
            });
            measurements.len() - 1
        }
    };
    let slot = &mut measurements[index];
    match kind {
        Biometric::Weight => slot.weight = Some(value),
        Biometric::Height => slot.height = Some(value),
        Biometric::Bmi => slot.bmi = Some(value),
    }
}

enum Biometric {
    Weight,
    Height,
    Bmi,
}

fn coding_codes(value: Option<&Value>) -> Vec<&str> {
    value
        .and_then(|code| code.get("coding"))
        .and_then(Value::as_array)
        .map(|codings| {
            codings
                .iter()
                .filter_map(|coding| coding.get("code").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

fn text_field(resource: &Value, field: &str) -> Option<String> {
    resource
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn extract_codeable_text(value: &Value) -> Option<String> {
    if let Some(text) = value.get("text").and_then(Value::as_str) {
        if !text.trim().is_empty() {
            return Some(text.trim().to_string());
        }
    }

    if let Some(codings) = value.get("coding").and_then(Value::as_array) {
        for coding in codings {
            if let Some(display) = coding.get("display").and_then(Value::as_str) {
                if !display.trim().is_empty() {
                    return Some(display.trim().to_string());
                }
            }
            if let Some(code) = coding.get("code").and_then(Value::as_str) {
                if !code.trim().is_empty() {
                    return Some(code.trim().to_string());
                }
            }
        }
    }

    None
}
