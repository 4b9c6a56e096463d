use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use immunization_core::{
    parse_clinical_date, present_cell, ScheduleCatalog, ScheduleConfig, ScheduleSnapshot,
    LEGEND_DISCLAIMERS,
};
use immunization_fhir::schedule_from_bundle_str;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "immunization-cli",
    about = "Print the immunization schedule grid for a FHIR JSON bundle."
)]
struct Args {
    /// Path to the JSON bundle.
    #[arg(short, long)]
    input: PathBuf,

    /// Reference date (YYYY-MM-DD or RFC 3339); defaults to now.
    #[arg(long)]
    current_date: Option<String>,

    /// Custom schedule catalog JSON replacing the built-in IAP schedule.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Leave dose labels out of the cells.
    #[arg(long)]
    hide_dose_labels: bool,

    /// Leave the legend out.
    #[arg(long)]
    hide_legend: bool,

    /// Print the full snapshot as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Could not read file {:?}", args.input))?;

    let catalog = match &args.catalog {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Could not read catalog {path:?}"))?;
            serde_json::from_str::<ScheduleCatalog>(&text)
                .with_context(|| format!("Invalid catalog {path:?}"))?
        }
        None => ScheduleCatalog::iap(),
    };

    let current_date = match &args.current_date {
        Some(text) => parse_clinical_date(text)?,
        None => Utc::now(),
    };

    let config = ScheduleConfig {
        show_dose_labels: !args.hide_dose_labels,
        show_legend: !args.hide_legend,
    };
    let snapshot = schedule_from_bundle_str(&data, &catalog, &config, current_date)?;
    tracing::info!(
        vaccines = snapshot.grid.rows.len(),
        histories = snapshot.history.len(),
        reference_date = %snapshot.reference_date,
        "schedule built"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_table(&snapshot);
    }

    Ok(())
}

fn print_table(snapshot: &ScheduleSnapshot) {
    let grid = &snapshot.grid;
    let name_width = grid
        .rows
        .iter()
        .map(|row| row.vaccine.chars().count())
        .max()
        .unwrap_or(0)
        .max("Vaccine".len());

    print!("{:<name_width$}", "Vaccine");
    for milestone in &grid.milestones {
        print!(" | {milestone:<16}");
    }
    println!();

    for row in &grid.rows {
        print!("{:<name_width$}", row.vaccine);
        for cell in &row.cells {
            let view = present_cell(cell);
            let text = if view.text.is_empty() {
                view.token
            } else {
                format!("{} {}", view.token, view.text)
            };
            print!(" | {text:<16}");
        }
        println!();
    }

    if !grid.legend.is_empty() {
        println!();
        for entry in &grid.legend {
            println!("{:<16} {}", entry.token, entry.text);
        }
        for note in LEGEND_DISCLAIMERS {
            println!("* {note}");
        }
    }
}
