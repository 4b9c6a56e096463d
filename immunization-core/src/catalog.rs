//! Static schedule reference data: milestones, scheduled doses and recommendation windows.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ScheduleError;

/// A named age bucket and its offset from birth in days.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgeMilestone {
    pub label: String,
    pub day_offset: i64,
}

/// Milestones sorted by strictly increasing day offset. Never empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<AgeMilestone>", into = "Vec<AgeMilestone>")]
pub struct MilestoneTable(Vec<AgeMilestone>);

impl MilestoneTable {
    pub fn new(milestones: Vec<AgeMilestone>) -> Result<Self, ScheduleError> {
        if milestones.is_empty() {
            return Err(ScheduleError::InvalidCatalog(
                "at least one age milestone is required".to_string(),
            ));
        }
        for pair in milestones.windows(2) {
            if pair[1].day_offset <= pair[0].day_offset {
                return Err(ScheduleError::InvalidCatalog(format!(
                    "milestone {:?} ({} days) must come after {:?} ({} days)",
                    pair[1].label, pair[1].day_offset, pair[0].label, pair[0].day_offset
                )));
            }
        }
        Ok(Self(milestones))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgeMilestone> {
        self.0.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|milestone| milestone.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Position of the bucket holding `age_in_days`.
    pub fn index_for_age(&self, age_in_days: i64) -> usize {
        let reached = self
            .0
            .iter()
            .take_while(|milestone| milestone.day_offset <= age_in_days)
            .count();
        reached.saturating_sub(1)
    }

    pub fn resolve(&self, age_in_days: i64) -> &AgeMilestone {
        &self.0[self.index_for_age(age_in_days)]
    }
}

impl TryFrom<Vec<AgeMilestone>> for MilestoneTable {
    type Error = ScheduleError;

    fn try_from(milestones: Vec<AgeMilestone>) -> Result<Self, Self::Error> {
        Self::new(milestones)
    }
}

impl From<MilestoneTable> for Vec<AgeMilestone> {
    fn from(table: MilestoneTable) -> Self {
        table.0
    }
}

/// Doses scheduled for one vaccine, keyed by milestone label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VaccineCatalogEntry {
    pub canonical_name: String,
    pub dose_labels_by_milestone: BTreeMap<String, String>,
}

/// Milestones at which a vaccine is recommended, offered as catch-up or
/// reserved for high-risk groups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RecommendationWindow {
    pub vaccine_name: String,
    #[serde(default)]
    pub recommended: BTreeSet<String>,
    #[serde(default)]
    pub catch_up: BTreeSet<String>,
    #[serde(default)]
    pub high_risk: BTreeSet<String>,
}

/// Which windows a single milestone falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowMembership {
    pub recommended: bool,
    pub catch_up: bool,
    pub high_risk: bool,
}

/// The full reference catalog. Loaded once and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleCatalog {
    milestones: MilestoneTable,
    vaccines: Vec<VaccineCatalogEntry>,
    #[serde(default)]
    recommendations: Vec<RecommendationWindow>,
}

impl ScheduleCatalog {
    pub fn new(
        milestones: MilestoneTable,
        vaccines: Vec<VaccineCatalogEntry>,
        recommendations: Vec<RecommendationWindow>,
    ) -> Self {
        Self {
            milestones,
            vaccines,
            recommendations,
        }
    }

    /// Built-in schedule following the Indian Academy of Pediatrics chart.
    pub fn iap() -> Self {
        let milestones = IAP_MILESTONES
            .iter()
            .map(|(label, day_offset)| AgeMilestone {
                label: label.to_string(),
                day_offset: *day_offset,
            })
            .collect();

        let vaccines = IAP_DOSES
            .iter()
            .map(|(name, doses)| VaccineCatalogEntry {
                canonical_name: name.to_string(),
                dose_labels_by_milestone: doses
                    .iter()
                    .map(|(milestone, label)| (milestone.to_string(), label.to_string()))
                    .collect(),
            })
            .collect();

        let recommendations = IAP_WINDOWS
            .iter()
            .map(|(name, recommended, catch_up, high_risk)| RecommendationWindow {
                vaccine_name: name.to_string(),
                recommended: to_set(recommended),
                catch_up: to_set(catch_up),
                high_risk: to_set(high_risk),
            })
            .collect();

        Self {
            // IAP_MILESTONES is sorted; checked by builtin_milestones_are_strictly_increasing
            milestones: MilestoneTable(milestones),
            vaccines,
            recommendations,
        }
    }

    pub fn milestones(&self) -> &MilestoneTable {
        &self.milestones
    }

    /// Canonical vaccine names in grid order.
    pub fn vaccines(&self) -> impl Iterator<Item = &str> {
        self.vaccines
            .iter()
            .map(|entry| entry.canonical_name.as_str())
    }

    /// Dose label scheduled for `vaccine` at `milestone`, if any.
    pub fn dose_label(&self, vaccine: &str, milestone: &str) -> Option<&str> {
        self.vaccines
            .iter()
            .find(|entry| entry.canonical_name == vaccine)
            .and_then(|entry| entry.dose_labels_by_milestone.get(milestone))
            .map(String::as_str)
    }

    /// Window membership; vaccines without a window entry are in no window.
    pub fn window_membership(&self, vaccine: &str, milestone: &str) -> WindowMembership {
        self.recommendations
            .iter()
            .find(|window| window.vaccine_name == vaccine)
            .map(|window| WindowMembership {
                recommended: window.recommended.contains(milestone),
                catch_up: window.catch_up.contains(milestone),
                high_risk: window.high_risk.contains(milestone),
            })
            .unwrap_or_default()
    }
}

impl Default for ScheduleCatalog {
    fn default() -> Self {
        Self::iap()
    }
}

fn to_set(labels: &[&str]) -> BTreeSet<String> {
    labels.iter().map(|label| label.to_string()).collect()
}

const IAP_MILESTONES: &[(&str, i64)] = &[
    ("Birth", 0),
    ("6 wk", 42),
    ("10 wk", 70),
    ("14 wk", 98),
    ("6 mo", 183),
    ("9 mo", 274),
    ("12 mo", 365),
    ("15 mo", 456),
    ("16-18 mo", 487),
    ("2 yr", 730),
    ("4-6 yr", 1461),
    ("10-12 yr", 3652),
    ("13-18 yr", 4748),
];

type DoseRow = (&'static str, &'static [(&'static str, &'static str)]);

const IAP_DOSES: &[DoseRow] = &[
    ("BCG", &[("Birth", "Dose 1"), ("6 wk", "Dose 1")]),
    (
        "Hep B",
        &[
            ("Birth", "Dose 1"),
            ("6 wk", "Dose 2"),
            ("10 wk", "Dose 3"),
            ("14 wk", "Dose 4"),
        ],
    ),
    (
        "Polio (OPV)",
        &[("6 mo", "Dose 1"), ("9 mo", "Dose 2"), ("4-6 yr", "Dose 3")],
    ),
    (
        "Polio (IPV)",
        &[
            ("6 wk", "Dose 1"),
            ("10 wk", "Dose 2"),
            ("14 wk", "Dose 3"),
            ("16-18 mo", "Booster 1"),
        ],
    ),
    (
        "Pentavalent",
        &[("6 wk", "Dose 1"), ("10 wk", "Dose 2"), ("14 wk", "Dose 3")],
    ),
    (
        "DTP",
        &[
            ("16-18 mo", "Booster 1"),
            ("2 yr", "Booster 1"),
            ("4-6 yr", "Booster 2"),
        ],
    ),
    (
        "Hib",
        &[
            ("6 wk", "Dose 1"),
            ("10 wk", "Dose 2"),
            ("14 wk", "Dose 3"),
            ("16-18 mo", "Booster"),
            ("2 yr", "Dose 1"),
        ],
    ),
    (
        "Pneumococcal",
        &[
            ("6 wk", "Dose 1"),
            ("10 wk", "Dose 2"),
            ("14 wk", "Dose 3"),
            ("15 mo", "Booster"),
            ("2 yr", "Dose 1"),
            ("4-6 yr", "Dose 2"),
        ],
    ),
    (
        "Rotavirus",
        &[("6 wk", "Dose 1"), ("10 wk", "Dose 2"), ("14 wk", "Dose 3")],
    ),
    (
        "Measles",
        &[
            ("9 mo", "Dose 1"),
            ("16-18 mo", "Dose 2"),
            ("2 yr", "Dose 2"),
            ("4-6 yr", "Dose 2"),
        ],
    ),
    (
        "MMR",
        &[("9 mo", "Dose 1"), ("15 mo", "Dose 2"), ("4-6 yr", "Dose 3")],
    ),
    (
        "MR",
        &[("9 mo", "Dose 1"), ("16-18 mo", "Dose 2"), ("10-12 yr", "Dose 1")],
    ),
    ("Typhoid", &[("9 mo", "Dose 1"), ("2 yr", "Dose 1")]),
    (
        "Malaria",
        &[
            ("6 mo", "Dose 1"),
            ("9 mo", "Dose 2"),
            ("12 mo", "Dose 3"),
            ("2 yr", "Dose 4"),
        ],
    ),
    (
        "Vitamin A",
        &[
            ("9 mo", "Dose 1"),
            ("16-18 mo", "Dose 2"),
            ("2 yr", "Dose 3"),
            ("4-6 yr", "Dose 4"),
        ],
    ),
    ("DT", &[("4-6 yr", "Dose 1"), ("10-12 yr", "Dose 1")]),
    ("Tdap", &[("10-12 yr", "Dose 1"), ("13-18 yr", "Dose 1")]),
    ("TT", &[("10-12 yr", "Dose 1"), ("13-18 yr", "Dose 2")]),
];

type WindowRow = (
    &'static str,
    &'static [&'static str],
    &'static [&'static str],
    &'static [&'static str],
);

// (vaccine, recommended, catch-up, high-risk)
const IAP_WINDOWS: &[WindowRow] = &[
    ("BCG", &["Birth"], &["6 wk"], &[]),
    ("Hep B", &["Birth", "6 wk", "10 wk", "14 wk"], &[], &[]),
    ("Polio (OPV)", &["6 mo", "9 mo"], &["4-6 yr"], &[]),
    ("Polio (IPV)", &["6 wk", "10 wk", "14 wk", "16-18 mo"], &[], &[]),
    ("Pentavalent", &["6 wk", "10 wk", "14 wk"], &[], &[]),
    ("DTP", &["16-18 mo", "4-6 yr"], &["2 yr"], &[]),
    ("Hib", &["6 wk", "10 wk", "14 wk", "16-18 mo"], &[], &["2 yr"]),
    (
        "Pneumococcal",
        &["6 wk", "10 wk", "14 wk", "15 mo"],
        &[],
        &["2 yr", "4-6 yr"],
    ),
    ("Rotavirus", &["6 wk", "10 wk", "14 wk"], &[], &[]),
    ("Measles", &["9 mo", "16-18 mo"], &["2 yr", "4-6 yr"], &[]),
    ("MMR", &["9 mo", "15 mo", "4-6 yr"], &[], &[]),
    ("MR", &["9 mo", "16-18 mo"], &["10-12 yr"], &[]),
    ("Typhoid", &["9 mo"], &["2 yr"], &[]),
    ("Malaria", &[], &[], &["6 mo", "9 mo", "12 mo", "2 yr"]),
    ("Vitamin A", &["9 mo", "16-18 mo", "2 yr"], &["4-6 yr"], &[]),
    ("DT", &["4-6 yr"], &["10-12 yr"], &[]),
    ("Tdap", &["10-12 yr"], &["13-18 yr"], &[]),
    ("TT", &["10-12 yr", "13-18 yr"], &[], &[]),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn milestone(label: &str, day_offset: i64) -> AgeMilestone {
        AgeMilestone {
            label: label.to_string(),
            day_offset,
        }
    }

    #[test]
    fn builtin_milestones_are_strictly_increasing() {
        let catalog = ScheduleCatalog::iap();
        let rebuilt = MilestoneTable::new(catalog.milestones().iter().cloned().collect());
        assert!(rebuilt.is_ok());
        assert_eq!(catalog.milestones().labels().next(), Some("Birth"));
        assert_eq!(catalog.milestones().labels().last(), Some("13-18 yr"));
    }

    #[test]
    fn builtin_doses_only_reference_known_milestones() {
        let catalog = ScheduleCatalog::iap();
        let labels: BTreeSet<&str> = catalog.milestones().labels().collect();
        for entry in &catalog.vaccines {
            for milestone in entry.dose_labels_by_milestone.keys() {
                assert!(
                    labels.contains(milestone.as_str()),
                    "{} uses unknown milestone {milestone}",
                    entry.canonical_name
                );
            }
        }
        for window in &catalog.recommendations {
            for milestone in window
                .recommended
                .iter()
                .chain(&window.catch_up)
                .chain(&window.high_risk)
            {
                assert!(labels.contains(milestone.as_str()));
            }
        }
    }

    #[test]
    fn rejects_empty_or_unsorted_milestones() {
        assert!(matches!(
            MilestoneTable::new(Vec::new()),
            Err(ScheduleError::InvalidCatalog(_))
        ));
        assert!(MilestoneTable::new(vec![milestone("Birth", 0), milestone("6 wk", 0)]).is_err());
        assert!(MilestoneTable::new(vec![milestone("6 wk", 42), milestone("Birth", 0)]).is_err());
    }

    #[test]
    fn lookups_by_vaccine_and_milestone() {
        let catalog = ScheduleCatalog::iap();
        assert_eq!(catalog.dose_label("Hep B", "10 wk"), Some("Dose 3"));
        assert_eq!(catalog.dose_label("Hep B", "9 mo"), None);
        assert_eq!(catalog.dose_label("Unknown", "Birth"), None);

        let vitamin_a = catalog.window_membership("Vitamin A", "9 mo");
        assert!(vitamin_a.recommended);
        assert!(!vitamin_a.catch_up);
        assert_eq!(
            catalog.window_membership("Unknown", "Birth"),
            WindowMembership::default()
        );
    }

    #[test]
    fn catalog_json_is_validated_on_load() {
        let json = r#"{
            "milestones": [{"label": "Birth", "day_offset": 0}, {"label": "6 wk", "day_offset": 42}],
            "vaccines": [{"canonical_name": "BCG", "dose_labels_by_milestone": {"Birth": "Dose 1"}}]
        }"#;
        let catalog: ScheduleCatalog = serde_json::from_str(json).expect("catalog json");
        assert_eq!(catalog.dose_label("BCG", "Birth"), Some("Dose 1"));
        assert_eq!(
            catalog.window_membership("BCG", "Birth"),
            WindowMembership::default()
        );

        let unsorted = r#"{
            "milestones": [{"label": "6 wk", "day_offset": 42}, {"label": "Birth", "day_offset": 0}],
            "vaccines": []
        }"#;
        assert!(serde_json::from_str::<ScheduleCatalog>(unsorted).is_err());
    }
}
