//! Immunization schedule grid component for WebAssembly.

#[cfg(target_arch = "wasm32")]
mod styles;

use chrono::{DateTime, Utc};
use immunization_core::ObservedDose;
use serde::{Deserialize, Serialize};

/// Data the view classifies on every render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleInput {
    pub birth_date: String,
    #[serde(default)]
    pub doses: Vec<ObservedDose>,
    pub current_date: DateTime<Utc>,
}

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use crate::styles;
    use crate::ScheduleInput;
    use immunization_core::{
        build_grid, present_cell, Classifier, LegendEntry, ScheduleCatalog, ScheduleConfig,
        ScheduleGrid, LEGEND_DISCLAIMERS,
    };
    use serde_wasm_bindgen::from_value;
    use wasm_bindgen::prelude::*;
    use web_sys::{console, Document, Element, Window};
    use yew::prelude::*;

    #[derive(Properties, PartialEq)]
    pub struct ScheduleViewProps {
        pub input: ScheduleInput,
    }

    #[function_component(ScheduleView)]
    fn schedule_view(props: &ScheduleViewProps) -> Html {
        use_effect_with((), |_| {
            if let Some(window) = web_sys::window() {
                if let Some(document) = window.document() {
                    if let Err(err) = styles::ensure_styles(&document) {
                        console::error_1(&err);
                    }
                }
            }
            || ()
        });

        let show_dose_labels = use_state(|| true);
        let show_legend = use_state(|| true);
        let catalog = use_memo((), |_| ScheduleCatalog::iap());

        let config = ScheduleConfig {
            show_dose_labels: *show_dose_labels,
            show_legend: *show_legend,
        };
        let input = &props.input;
        let classifier = Classifier::new(&catalog, &input.birth_date, input.current_date);
        let grid = build_grid(&classifier, &input.doses, &config);

        let toggle_labels = {
            let show_dose_labels = show_dose_labels.clone();
            Callback::from(move |_: Event| show_dose_labels.set(!*show_dose_labels))
        };
        let toggle_legend = {
            let show_legend = show_legend.clone();
            Callback::from(move |_: Event| show_legend.set(!*show_legend))
        };

        html! {
            <div class="schedule-root">
                <h1 class="schedule-title">
                    {"Immunization Schedule"}
                    <br />
                    {"for Children Aged 0-18 years (with range)"}
                </h1>
                <div class="display-options">
                    <label>
                        <input type="checkbox" checked={config.show_dose_labels} onchange={toggle_labels} />
                        {"Show Dose Labels"}
                    </label>
                    <label>
                        <input type="checkbox" checked={config.show_legend} onchange={toggle_legend} />
                        {"Show Legend"}
                    </label>
                </div>
                { render_table(&grid) }
                { render_legend(&grid.legend) }
            </div>
        }
    }

    fn render_table(grid: &ScheduleGrid) -> Html {
        html! {
            <div class="schedule-container">
                <table class="schedule-table">
                    <thead>
                        <tr>
                            <th class="vaccine-cell">{"Age / Vaccine"}</th>
                            { for grid.milestones.iter().map(|age| html! { <th key={age.clone()}>{ age.clone() }</th> }) }
                        </tr>
                    </thead>
                    <tbody>
                        { for grid.rows.iter().map(|row| html! {
                            <tr key={row.vaccine.clone()}>
                                <td class="vaccine-cell">{ row.vaccine.clone() }</td>
                                { for row.cells.iter().map(|cell| {
                                    let view = present_cell(cell);
                                    html! { <td class={view.token}>{ view.text }</td> }
                                }) }
                            </tr>
                        }) }
                    </tbody>
                </table>
            </div>
        }
    }

    fn render_legend(entries: &[LegendEntry]) -> Html {
        if entries.is_empty() {
            return Html::default();
        }

        html! {
            <div class="legend">
                <div class="legend-items">
                    { for entries.iter().map(|entry| html! {
                        <div class="legend-item">
                            <div class={classes!("legend-color", entry.token.clone())}></div>
                            <span>{ entry.text.clone() }</span>
                        </div>
                    }) }
                </div>
                <ul class="legend-disclaimers">
                    { for LEGEND_DISCLAIMERS.iter().map(|note| html! { <li>{ *note }</li> }) }
                </ul>
            </div>
        }
    }

    #[wasm_bindgen]
    pub fn mount_schedule_view(selector: &str, input: JsValue) -> Result<(), JsValue> {
        let window: Window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Document is not accessible"))?;

        let target: Element = document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Bad selector: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("No element matches the selector"))?;

        let input: ScheduleInput = from_value(input)?;

        yew::Renderer::<ScheduleView>::with_root_and_props(target, ScheduleViewProps { input })
            .render();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::mount_schedule_view;

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_schedule_view(_: &str, _: wasm_bindgen::JsValue) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "immunization-ui only supports the wasm32 target",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_accepts_missing_dose_list() {
        let input: ScheduleInput = serde_json::from_str(
            r#"{"birth_date": "2024-01-01", "current_date": "2024-06-01T00:00:00Z"}"#,
        )
        .expect("input json");
        assert!(input.doses.is_empty());
        assert_eq!(input.birth_date, "2024-01-01");
    }
}
