//! Visual tokens and legend for classified cells.

use serde::{Deserialize, Serialize};

use crate::classify::{ClassifiedCell, StatusClass};

impl StatusClass {
    /// Legend order.
    pub const ALL: [StatusClass; 5] = [
        StatusClass::Recommended,
        StatusClass::CatchUp,
        StatusClass::HighRisk,
        StatusClass::Completed,
        StatusClass::NotRecommended,
    ];

    /// Style token used by renderers.
    pub fn token(self) -> &'static str {
        match self {
            StatusClass::Completed => "completed",
            StatusClass::Recommended => "recommended",
            StatusClass::CatchUp => "catchUp",
            StatusClass::HighRisk => "highRisk",
            StatusClass::NotRecommended => "notRecommended",
        }
    }

    pub fn legend_text(self) -> &'static str {
        match self {
            StatusClass::Recommended => "Range of recommended ages for all children",
            StatusClass::CatchUp => "Range of recommended ages for catch-up immunization",
            StatusClass::HighRisk => "Range of recommended ages for certain high-risk groups",
            StatusClass::Completed => "Completed",
            StatusClass::NotRecommended => "Not routinely recommended",
        }
    }
}

/// Notes printed under the legend.
pub const LEGEND_DISCLAIMERS: &[&str] = &[
    "This schedule includes recommendations in effect as of November 2013.",
    "These recommendations must be read with the footnotes that follow. For those who fall behind or start late, provide catch-up vaccination at the earliest opportunity as indicated by the green bars in Figure 1.",
];

/// Renderable form of one cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CellView {
    pub token: String,
    pub text: String,
}

pub fn present_cell(cell: &ClassifiedCell) -> CellView {
    CellView {
        token: cell.status_class.token().to_string(),
        text: cell.dose_label.clone(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LegendEntry {
    pub status_class: StatusClass,
    pub token: String,
    pub text: String,
}

/// Legend entries, or nothing when the legend is hidden.
pub fn legend(show_legend: bool) -> Vec<LegendEntry> {
    if !show_legend {
        return Vec::new();
    }
    StatusClass::ALL
        .into_iter()
        .map(|status_class| LegendEntry {
            status_class,
            token: status_class.token().to_string(),
            text: status_class.legend_text().to_string(),
        })
        .collect()
}
