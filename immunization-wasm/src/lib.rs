//! Framework-neutral WASM <-> JavaScript bridge.

use chrono::{DateTime, Utc};
use immunization_core::{
    normalize_vaccine_name, parse_clinical_date, GrowthReference, ScheduleCatalog, ScheduleConfig,
    ScheduleError,
};
use immunization_fhir::ConceptConfig;
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Deserialize, Default)]
struct JsScheduleConfig {
    #[serde(default)]
    show_dose_labels: Option<bool>,
    #[serde(default)]
    show_legend: Option<bool>,
    /// Reference date; the browser clock is used when absent.
    #[serde(default)]
    current_date: Option<String>,
    #[serde(default)]
    catalog: Option<ScheduleCatalog>,
}

impl From<&JsScheduleConfig> for ScheduleConfig {
    fn from(cfg: &JsScheduleConfig) -> Self {
        let mut base = ScheduleConfig::default();
        if let Some(show) = cfg.show_dose_labels {
            base.show_dose_labels = show;
        }
        if let Some(show) = cfg.show_legend {
            base.show_legend = show;
        }
        base
    }
}

#[wasm_bindgen]
pub fn build_schedule(input_bundle: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let bundle_value = from_value::<serde_json::Value>(input_bundle)
        .map_err(|err| JsValue::from_str(&format!("Could not read JSON bundle: {err}")))?;

    let js_cfg = match config {
        Some(js_cfg) => from_value::<JsScheduleConfig>(js_cfg)
            .map_err(|err| JsValue::from_str(&format!("Could not read config: {err}")))?,
        None => JsScheduleConfig::default(),
    };

    let current_date = reference_date(js_cfg.current_date.as_deref())
        .map_err(|err| JsValue::from_str(&format_schedule_error(err)))?;
    let catalog = js_cfg.catalog.clone().unwrap_or_default();

    let snapshot = immunization_fhir::schedule_from_bundle_value(
        &bundle_value,
        &catalog,
        &ScheduleConfig::from(&js_cfg),
        current_date,
    )
    .map_err(|err| JsValue::from_str(&format_schedule_error(err)))?;

    to_value(&snapshot)
        .map_err(|err| JsValue::from_str(&format!("Could not serialize snapshot: {err}")))
}

#[wasm_bindgen]
pub fn growth_chart(
    input_bundle: JsValue,
    reference: JsValue,
    concepts: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    let bundle_value = from_value::<serde_json::Value>(input_bundle)
        .map_err(|err| JsValue::from_str(&format!("Could not read JSON bundle: {err}")))?;
    let reference: GrowthReference = from_value(reference)
        .map_err(|err| JsValue::from_str(&format!("Could not read growth reference: {err}")))?;
    let concepts = match concepts {
        Some(value) => from_value::<ConceptConfig>(value)
            .map_err(|err| JsValue::from_str(&format!("Could not read concepts: {err}")))?,
        None => ConceptConfig::default(),
    };

    let points =
        immunization_fhir::growth_chart_from_bundle_value(&bundle_value, &reference, &concepts)
            .map_err(|err| JsValue::from_str(&format_schedule_error(err)))?;

    to_value(&points).map_err(|err| JsValue::from_str(&format!("Could not serialize chart: {err}")))
}

#[wasm_bindgen]
pub fn canonical_vaccine_name(raw: &str) -> String {
    normalize_vaccine_name(raw).to_string()
}

fn reference_date(value: Option<&str>) -> Result<DateTime<Utc>, ScheduleError> {
    match value {
        Some(text) => parse_clinical_date(text),
        None => Ok(Utc::now()),
    }
}

fn format_schedule_error(err: ScheduleError) -> String {
    format!("Schedule error: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_merges_onto_defaults() {
        let js_cfg: JsScheduleConfig =
            serde_json::from_str(r#"{"show_legend": false}"#).expect("config json");
        let config = ScheduleConfig::from(&js_cfg);
        assert!(config.show_dose_labels);
        assert!(!config.show_legend);
        assert!(js_cfg.catalog.is_none());
    }

    #[test]
    fn injected_reference_date_is_parsed() {
        let date = reference_date(Some("2025-03-09")).expect("date");
        assert_eq!(date.to_rfc3339(), "2025-03-09T00:00:00+00:00");
        assert!(reference_date(Some("March 9th")).is_err());
    }
}
