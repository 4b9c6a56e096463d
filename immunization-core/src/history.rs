//! Per-vaccine dose history and the dose sequence table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::age::parse_clinical_date;
use crate::classify::Classifier;
use crate::normalize::display_name;
use crate::ObservedDose;

/// Where a recorded dose sits relative to the reference date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DoseProgress {
    Complete,
    Scheduled,
    DueToday,
    /// The occurrence date could not be read.
    Unknown,
}

pub fn dose_progress(occurrence: &str, current_date: DateTime<Utc>) -> DoseProgress {
    match parse_clinical_date(occurrence) {
        Ok(when) if when < current_date => DoseProgress::Complete,
        Ok(when) if when > current_date => DoseProgress::Scheduled,
        Ok(_) => DoseProgress::DueToday,
        Err(_) => DoseProgress::Unknown,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoseEntry {
    pub dose: ObservedDose,
    pub progress: DoseProgress,
    /// Age bucket the dose was given in, when both dates are readable.
    pub milestone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VaccineHistory {
    pub vaccine_name: String,
    pub display_name: String,
    pub completed: Vec<DoseEntry>,
    pub pending: Vec<DoseEntry>,
}

/// Group doses by recorded vaccine name, oldest first, split into completed and pending.
pub fn vaccine_history(
    classifier: &Classifier<'_>,
    doses: &[ObservedDose],
) -> Vec<VaccineHistory> {
    let mut groups: Vec<(&str, Vec<&ObservedDose>)> = Vec::new();
    for dose in doses {
        match groups
            .iter_mut()
            .find(|(name, _)| *name == dose.vaccine_name)
        {
            Some((_, members)) => members.push(dose),
            None => groups.push((dose.vaccine_name.as_str(), vec![dose])),
        }
    }

    groups
        .into_iter()
        .map(|(name, mut members)| {
            // unreadable dates sort last
            members.sort_by_key(|dose| {
                let parsed = parse_clinical_date(&dose.occurrence_date_time).ok();
                (parsed.is_none(), parsed)
            });

            let mut history = VaccineHistory {
                vaccine_name: name.to_string(),
                display_name: display_name(name).to_string(),
                completed: Vec::new(),
                pending: Vec::new(),
            };
            for dose in members {
                let progress = dose_progress(&dose.occurrence_date_time, classifier.current_date());
                let entry = DoseEntry {
                    dose: dose.clone(),
                    progress,
                    milestone: classifier.dose_timing(dose).ok().map(|timing| timing.milestone),
                };
                if progress == DoseProgress::Complete {
                    history.completed.push(entry);
                } else {
                    history.pending.push(entry);
                }
            }
            history
        })
        .collect()
}

/// Configured label for a dose number, e.g. 11 -> "Booster 1".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoseSequence {
    pub sequence_label: String,
    pub sequence_number: u32,
}

/// Row of the per-vaccine dose table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SequenceRow {
    pub id: Option<String>,
    pub sequence: String,
    pub vaccination_date: Option<String>,
    pub expiration_date: Option<String>,
}

pub fn sequence_rows(doses: &[ObservedDose], sequences: &[DoseSequence]) -> Vec<SequenceRow> {
    doses
        .iter()
        .map(|dose| {
            let sequence = if sequences.is_empty() {
                dose.dose_number.unwrap_or(0).to_string()
            } else {
                sequences
                    .iter()
                    .find(|sequence| Some(sequence.sequence_number) == dose.dose_number)
                    .map(|sequence| sequence.sequence_label.clone())
                    .unwrap_or_else(|| {
                        dose.dose_number
                            .map(|number| number.to_string())
                            .unwrap_or_default()
                    })
            };
            SequenceRow {
                id: dose.immunization_id.clone(),
                sequence,
                vaccination_date: format_table_date(&dose.occurrence_date_time),
                expiration_date: dose.expiration_date.as_deref().and_then(format_table_date),
            }
        })
        .collect()
}

fn format_table_date(value: &str) -> Option<String> {
    parse_clinical_date(value)
        .ok()
        .map(|dt| dt.format("%d-%b-%Y").to_string())
}
