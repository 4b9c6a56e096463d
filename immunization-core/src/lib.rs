//! Core logic for the immunization schedule grid and the related patient-chart views.
//!
//! Everything here is a pure transform over small in-memory inputs: the caller
//! supplies recorded doses, a birth date and a reference "current date", and
//! receives classified grid cells ready for display.

pub mod age;
pub mod catalog;
pub mod classify;
pub mod growth;
pub mod history;
pub mod normalize;
pub mod present;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use age::{age_in_days, elapsed_days, map_to_milestone, parse_clinical_date};
pub use catalog::{
    AgeMilestone, MilestoneTable, RecommendationWindow, ScheduleCatalog, VaccineCatalogEntry,
    WindowMembership,
};
pub use classify::{
    build_grid, expected_dose_number, ClassifiedCell, Classifier, DoseTiming, GridRow,
    ScheduleGrid, StatusClass,
};
pub use growth::{
    age_in_months, observation_rows, weight_for_age_series, ChartPoint, GrowthReference,
    Measurement, ObservationRow, PercentileBand, ReferencePoint, Sex,
};
pub use history::{
    dose_progress, sequence_rows, vaccine_history, DoseEntry, DoseProgress, DoseSequence,
    SequenceRow, VaccineHistory,
};
pub use normalize::{display_name, normalize_vaccine_name};
pub use present::{legend, present_cell, CellView, LegendEntry, LEGEND_DISCLAIMERS};

/// Display toggles owned by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Show the catalog dose label ("Dose 2") inside each cell.
    pub show_dose_labels: bool,
    /// Attach the legend entries to the built grid.
    pub show_legend: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            show_dose_labels: true,
            show_legend: true,
        }
    }
}

/// One recorded vaccine administration, as received from the clinical-data layer.
///
/// Dates are kept as the raw text received so that a malformed value only
/// excludes this record from matching instead of failing the whole batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ObservedDose {
    pub vaccine_name: String,
    #[serde(default)]
    pub dose_number: Option<u32>,
    pub occurrence_date_time: String,
    #[serde(default)]
    pub expiration_date: Option<String>,
    #[serde(default)]
    pub lot_number: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub immunization_id: Option<String>,
    #[serde(default)]
    pub visit_id: Option<String>,
}

impl ObservedDose {
    /// Dose number used for matching; missing or zero counts as the first dose.
    pub fn effective_dose_number(&self) -> u32 {
        match self.dose_number {
            Some(number) if number > 0 => number,
            _ => 1,
        }
    }
}

/// Everything one render pass of the schedule view needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleSnapshot {
    pub reference_date: DateTime<Utc>,
    pub birth_date: String,
    pub grid: ScheduleGrid,
    pub history: Vec<VaccineHistory>,
}

impl ScheduleSnapshot {
    /// Classify the grid and group the dose history against one reference date.
    pub fn build(
        catalog: &ScheduleCatalog,
        birth_date: &str,
        doses: &[ObservedDose],
        current_date: DateTime<Utc>,
        config: &ScheduleConfig,
    ) -> Self {
        let classifier = Classifier::new(catalog, birth_date, current_date);
        let grid = build_grid(&classifier, doses, config);
        let history = vaccine_history(&classifier, doses);
        Self {
            reference_date: current_date,
            birth_date: birth_date.to_string(),
            grid,
            history,
        }
    }
}

/// Errors raised while reading schedule inputs.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("input is missing required data")]
    MissingData,
    #[error("could not read input: {0}")]
    Parse(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("invalid schedule catalog: {0}")]
    InvalidCatalog(String),
}
