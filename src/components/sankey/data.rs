//! UK energy flows for 2050 (TWh), bundled with the app.

use super::config::{SankeyConfig, format_number};
use super::types::FlowRecord;
use crate::error::{VizError, VizResult};

const ENERGY_JSON: &str = include_str!("../../../data/energy.json");

/// Parse the bundled energy dataset.
pub fn energy_records() -> VizResult<Vec<FlowRecord>> {
	serde_json::from_str(ENERGY_JSON)
		.map_err(|e| VizError::dataset(format!("parse energy dataset: {e}")))
}

/// First word of a node id, so "Electricity grid" groups with "Electricity".
pub fn first_word(id: &str) -> String {
	id.split(|c: char| !(c.is_alphanumeric() || c == '_'))
		.next()
		.unwrap_or(id)
		.to_owned()
}

fn terawatt_hours(value: f64) -> String {
	format!("{} TWh", format_number(value))
}

/// Config used for the energy chart on the home page.
pub fn energy_config() -> SankeyConfig {
	SankeyConfig {
		format: terawatt_hours,
		node_group: Some(first_word),
		width: 928.0,
		height: 600.0,
		..Default::default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::sankey::layout::ColumnLayout;
	use crate::components::sankey::render::render_sankey;
	use crate::scene::{ElementKind, MemoryScene};

	#[test]
	fn bundled_dataset_parses_and_renders() {
		let records = energy_records().unwrap();
		assert_eq!(records.len(), 68);
		assert!(records.iter().all(|r| r.value >= 0.0));

		let mut scene = MemoryScene::new();
		let drawn =
			render_sankey(&mut scene, &records, None, &energy_config(), &ColumnLayout).unwrap();
		assert_eq!(drawn.graph.links.len(), 68);
		assert_eq!(scene.find_all(ElementKind::LinearGradient).len(), 68);
		for node in &drawn.graph.nodes {
			assert!(node.x0 >= 1.0 && node.x1 <= 927.0, "{} out of bounds", node.id);
			assert!(node.y0 >= 5.0 - 1e-9 && node.y1 <= 595.0 + 1e-9, "{} out of bounds", node.id);
		}
	}

	#[test]
	fn groups_by_first_word() {
		assert_eq!(first_word("Electricity grid"), "Electricity");
		assert_eq!(first_word("H2"), "H2");
		assert_eq!(first_word("Agricultural 'waste'"), "Agricultural");
		assert_eq!(terawatt_hours(1234.5), "1,234.5 TWh");
	}
}
