#![cfg(target_arch = "wasm32")]

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Node};

const STYLE_TAG_SELECTOR: &str = "style[data-immunization-ui]";

/// Default CSS for the schedule grid along with easy-to-override design tokens.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --schedule-font-family: 'IBM Plex Sans', system-ui, -apple-system, 'Segoe UI', sans-serif;
  --schedule-text: #161616;
  --schedule-muted: #525252;
  --schedule-border: #e0e0e0;
  --schedule-header-bg: #f4f4f4;
  --schedule-recommended: #ffd966;
  --schedule-catch-up: #93c47d;
  --schedule-high-risk: #b4a7d6;
  --schedule-completed: #6fa8dc;
  --schedule-not-recommended: #ffffff;
}

.schedule-root {
  font-family: var(--schedule-font-family);
  color: var(--schedule-text);
  display: flex;
  flex-direction: column;
  gap: 16px;
  padding: 16px;
}

.schedule-title {
  font-size: 1.25rem;
  font-weight: 600;
  margin: 0;
}

.display-options {
  display: flex;
  gap: 24px;
  font-size: 0.875rem;
}

.display-options label {
  display: inline-flex;
  align-items: center;
  gap: 6px;
  cursor: pointer;
}

.schedule-container {
  overflow-x: auto;
}

.schedule-table {
  border-collapse: collapse;
  min-width: 100%;
  font-size: 0.8125rem;
}

.schedule-table th,
.schedule-table td {
  border: 1px solid var(--schedule-border);
  padding: 6px 8px;
  text-align: center;
  white-space: nowrap;
}

.schedule-table th {
  background: var(--schedule-header-bg);
  font-weight: 600;
}

.schedule-table .vaccine-cell {
  text-align: left;
  font-weight: 600;
  background: var(--schedule-header-bg);
}

.recommended { background: var(--schedule-recommended); }
.catchUp { background: var(--schedule-catch-up); }
.highRisk { background: var(--schedule-high-risk); }
.completed { background: var(--schedule-completed); color: #ffffff; }
.notRecommended { background: var(--schedule-not-recommended); }

.legend-items {
  display: flex;
  flex-wrap: wrap;
  gap: 12px 24px;
  font-size: 0.8125rem;
}

.legend-item {
  display: inline-flex;
  align-items: center;
  gap: 8px;
}

.legend-color {
  width: 16px;
  height: 16px;
  border: 1px solid var(--schedule-border);
}

.legend-disclaimers {
  color: var(--schedule-muted);
  font-size: 0.75rem;
  margin: 8px 0 0;
  padding-left: 18px;
}
"#;

pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document has no <head> element"))?;

    let style_el = document.create_element("style")?;
    style_el.set_attribute("data-immunization-ui", "v1")?;
    style_el.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&style_el.clone().dyn_into::<Node>()?)?;

    Ok(())
}
