//! Dose-status classification for the schedule grid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::age::{elapsed_days, parse_clinical_date};
use crate::catalog::ScheduleCatalog;
use crate::normalize::normalize_vaccine_name;
use crate::present::{legend, LegendEntry};
use crate::{ObservedDose, ScheduleConfig, ScheduleError};

/// Display class of one grid cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    Completed,
    Recommended,
    CatchUp,
    HighRisk,
    NotRecommended,
}

/// Classification result for a (vaccine, milestone) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifiedCell {
    pub status_class: StatusClass,
    /// Catalog dose label, empty unless labels are switched on.
    pub dose_label: String,
}

impl ClassifiedCell {
    fn not_recommended() -> Self {
        Self {
            status_class: StatusClass::NotRecommended,
            dose_label: String::new(),
        }
    }
}

/// When a dose happened relative to the patient's birth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoseTiming {
    pub occurred_at: DateTime<Utc>,
    pub age_in_days: i64,
    pub milestone: String,
}

/// Trailing integer of a dose label ("Dose 2" -> 2), or 1 when there is none.
pub fn expected_dose_number(dose_label: &str) -> u32 {
    let prefix = dose_label.trim_end_matches(|c: char| c.is_ascii_digit());
    dose_label[prefix.len()..].parse().unwrap_or(1)
}

/// Classifies cells against one catalog, one patient and one reference date.
#[derive(Debug, Clone)]
pub struct Classifier<'a> {
    catalog: &'a ScheduleCatalog,
    birth_date: &'a str,
    birth: Option<DateTime<Utc>>,
    current_date: DateTime<Utc>,
}

impl<'a> Classifier<'a> {
    pub fn new(
        catalog: &'a ScheduleCatalog,
        birth_date: &'a str,
        current_date: DateTime<Utc>,
    ) -> Self {
        let birth = match parse_clinical_date(birth_date) {
            Ok(birth) => Some(birth),
            Err(err) => {
                warn!(error = %err, "birth date unreadable; no dose can be matched");
                None
            }
        };
        Self {
            catalog,
            birth_date,
            birth,
            current_date,
        }
    }

    pub fn catalog(&self) -> &ScheduleCatalog {
        self.catalog
    }

    pub fn current_date(&self) -> DateTime<Utc> {
        self.current_date
    }

    /// Age and milestone at which `dose` was given.
    pub fn dose_timing(&self, dose: &ObservedDose) -> Result<DoseTiming, ScheduleError> {
        let birth = self
            .birth
            .ok_or_else(|| ScheduleError::InvalidDate(self.birth_date.to_string()))?;
        let occurred_at = parse_clinical_date(&dose.occurrence_date_time)?;
        let age_in_days = elapsed_days(birth, occurred_at);
        let milestone = self
            .catalog
            .milestones()
            .resolve(age_in_days)
            .label
            .clone();
        Ok(DoseTiming {
            occurred_at,
            age_in_days,
            milestone,
        })
    }

    /// Classify one cell. Doses for other vaccines in `doses` are ignored.
    pub fn classify(
        &self,
        vaccine: &str,
        milestone: &str,
        doses: &[ObservedDose],
        show_dose_labels: bool,
    ) -> ClassifiedCell {
        let Some(dose_label) = self.catalog.dose_label(vaccine, milestone) else {
            return ClassifiedCell::not_recommended();
        };

        let expected = expected_dose_number(dose_label);
        let window = self.catalog.window_membership(vaccine, milestone);

        // High-risk-only milestones never count an administration as completed.
        let administered = (window.recommended || window.catch_up)
            && doses
                .iter()
                .filter(|dose| normalize_vaccine_name(&dose.vaccine_name) == vaccine)
                .any(|dose| self.counts_as_administered(dose, expected));

        let status_class = if administered {
            StatusClass::Completed
        } else if window.high_risk {
            StatusClass::HighRisk
        } else if window.catch_up {
            StatusClass::CatchUp
        } else if window.recommended {
            StatusClass::Recommended
        } else {
            StatusClass::NotRecommended
        };

        ClassifiedCell {
            status_class,
            dose_label: if show_dose_labels {
                dose_label.to_string()
            } else {
                String::new()
            },
        }
    }

    fn counts_as_administered(&self, dose: &ObservedDose, expected: u32) -> bool {
        if dose.effective_dose_number() != expected {
            return false;
        }
        match self.dose_timing(dose) {
            Ok(timing) => timing.occurred_at <= self.current_date,
            Err(err) => {
                debug!(vaccine = %dose.vaccine_name, error = %err, "dose skipped");
                false
            }
        }
    }
}

/// One grid row: a vaccine and its cells in milestone order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridRow {
    pub vaccine: String,
    pub cells: Vec<ClassifiedCell>,
}

/// Classified vaccines x milestones grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ScheduleGrid {
    pub milestones: Vec<String>,
    pub rows: Vec<GridRow>,
    #[serde(default)]
    pub legend: Vec<LegendEntry>,
}

impl ScheduleGrid {
    pub fn cell(&self, vaccine: &str, milestone: &str) -> Option<&ClassifiedCell> {
        let column = self.milestones.iter().position(|label| label == milestone)?;
        self.rows
            .iter()
            .find(|row| row.vaccine == vaccine)
            .and_then(|row| row.cells.get(column))
    }
}

/// Classify every catalog vaccine at every milestone.
pub fn build_grid(
    classifier: &Classifier<'_>,
    doses: &[ObservedDose],
    config: &ScheduleConfig,
) -> ScheduleGrid {
    for dose in doses {
        if let Err(err) = classifier.dose_timing(dose) {
            warn!(
                vaccine = %dose.vaccine_name,
                id = dose.immunization_id.as_deref().unwrap_or("-"),
                error = %err,
                "dose excluded from schedule matching"
            );
        }
    }

    let catalog = classifier.catalog();
    let milestones: Vec<String> = catalog.milestones().labels().map(str::to_string).collect();
    let rows: Vec<GridRow> = catalog
        .vaccines()
        .map(|vaccine| GridRow {
            vaccine: vaccine.to_string(),
            cells: milestones
                .iter()
                .map(|milestone| {
                    classifier.classify(vaccine, milestone, doses, config.show_dose_labels)
                })
                .collect(),
        })
        .collect();

    debug!(
        vaccines = rows.len(),
        milestones = milestones.len(),
        doses = doses.len(),
        "schedule grid built"
    );

    ScheduleGrid {
        milestones,
        rows,
        legend: legend(config.show_legend),
    }
}
