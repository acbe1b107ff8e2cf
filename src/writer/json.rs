//! Machine readable summary.

use crate::model::Summary;

pub fn render(summary: &Summary) -> serde_json::Result<String> {
    let mut json = serde_json::to_string_pretty(summary)?;
    json.push('\n');
    Ok(json)
}
