use std::cmp::Ordering;

use log::warn;

use super::types::{FlowLink, FlowNode};

/// Tableau10, the default categorical palette.
pub const TABLEAU10: &[&str] = &[
	"#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
	"#9c755f", "#bab0ab",
];

/// Horizontal placement strategy for nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeAlign {
	Left,
	Right,
	Center,
	#[default]
	Justify,
}

impl NodeAlign {
	/// Parse a strategy name; anything unrecognized falls back to `Justify`.
	pub fn parse(name: &str) -> Self {
		match name.trim().to_ascii_lowercase().as_str() {
			"left" => Self::Left,
			"right" => Self::Right,
			"center" => Self::Center,
			"justify" => Self::Justify,
			other => {
				warn!("unknown node alignment '{other}', using justify");
				Self::Justify
			}
		}
	}

	/// Column for `node` out of `columns` columns, before clamping.
	pub fn column(self, node: &FlowNode, nodes: &[FlowNode], links: &[FlowLink], columns: usize) -> usize {
		let last = columns.saturating_sub(1);
		match self {
			Self::Left => node.depth,
			Self::Right => last.saturating_sub(node.height),
			Self::Justify => {
				if node.source_links.is_empty() {
					last
				} else {
					node.depth
				}
			}
			Self::Center => {
				if !node.target_links.is_empty() {
					node.depth
				} else {
					node.source_links
						.iter()
						.map(|&l| nodes[links[l].target].depth)
						.min()
						.map_or(0, |d| d.saturating_sub(1))
				}
			}
		}
	}
}

/// How link paths are coloured.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LinkColor {
	Source,
	Target,
	#[default]
	SourceTarget,
	/// A fixed CSS colour for every link.
	Static(String),
}

impl LinkColor {
	/// `source`, `target` and `source-target` select a mode; any other
	/// non-empty string is taken as a static colour.
	pub fn parse(value: &str) -> Self {
		match value.trim() {
			"source" => Self::Source,
			"target" => Self::Target,
			"source-target" => Self::SourceTarget,
			"" => {
				warn!("empty link colour, using source-target");
				Self::SourceTarget
			}
			colour => Self::Static(colour.to_owned()),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
	pub top: f64,
	pub right: f64,
	pub bottom: f64,
	pub left: f64,
}

impl Default for Margins {
	fn default() -> Self {
		Self {
			top: 5.0,
			right: 1.0,
			bottom: 5.0,
			left: 1.0,
		}
	}
}

pub type ValueFormat = fn(f64) -> String;
pub type NodeGroup = fn(&str) -> String;
pub type NodeOrder = fn(&FlowNode, &FlowNode) -> Ordering;

/// Every knob of the flow diagram, with its default.
#[derive(Clone)]
pub struct SankeyConfig {
	/// Formats values for hover titles. Default: [`format_number`].
	pub format: ValueFormat,
	/// Maps a node id to its colour group. Default: none (nodes are not filled).
	pub node_group: Option<NodeGroup>,
	pub node_align: NodeAlign,
	/// Order of nodes within a column. Default: input order.
	pub node_sort: Option<NodeOrder>,
	pub node_width: f64,
	pub node_padding: f64,
	/// Gap between a node and its label.
	pub node_label_padding: f64,
	pub node_stroke: String,
	pub node_stroke_width: Option<f64>,
	pub node_stroke_opacity: Option<f64>,
	pub node_stroke_linejoin: Option<String>,
	pub node_labels: bool,
	pub node_titles: bool,
	pub link_color: LinkColor,
	pub link_stroke_opacity: f64,
	pub link_mix_blend_mode: Option<String>,
	pub link_titles: bool,
	pub colors: Vec<String>,
	pub width: f64,
	pub height: f64,
	pub margins: Margins,
}

impl Default for SankeyConfig {
	fn default() -> Self {
		Self {
			format: format_number,
			node_group: None,
			node_align: NodeAlign::Justify,
			node_sort: None,
			node_width: 15.0,
			node_padding: 10.0,
			node_label_padding: 6.0,
			node_stroke: "currentColor".into(),
			node_stroke_width: None,
			node_stroke_opacity: None,
			node_stroke_linejoin: None,
			node_labels: true,
			node_titles: true,
			link_color: LinkColor::SourceTarget,
			link_stroke_opacity: 0.5,
			link_mix_blend_mode: Some("multiply".into()),
			link_titles: true,
			colors: TABLEAU10.iter().map(|c| (*c).to_owned()).collect(),
			width: 640.0,
			height: 400.0,
			margins: Margins::default(),
		}
	}
}

impl SankeyConfig {
	/// Layout extent `[[x0, y0], [x1, y1]]` inside the margins.
	pub fn extent(&self) -> [[f64; 2]; 2] {
		[
			[self.margins.left, self.margins.top],
			[
				self.width - self.margins.right,
				self.height - self.margins.bottom,
			],
		]
	}
}

/// Thousands-grouped number with at most two fraction digits, e.g. `1,234.5`.
pub fn format_number(value: f64) -> String {
	if !value.is_finite() {
		return value.to_string();
	}
	let fixed = format!("{:.2}", value.abs());
	let (int, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
	let frac = frac.trim_end_matches('0');

	let mut grouped = String::with_capacity(int.len() + int.len() / 3);
	for (i, digit) in int.chars().enumerate() {
		if i > 0 && (int.len() - i) % 3 == 0 {
			grouped.push(',');
		}
		grouped.push(digit);
	}

	let sign = if value < 0.0 && (int != "0" || !frac.is_empty()) { "-" } else { "" };
	if frac.is_empty() {
		format!("{sign}{grouped}")
	} else {
		format!("{sign}{grouped}.{frac}")
	}
}

/// Categorical colour scale: each new key takes the next palette entry.
#[derive(Clone, Debug)]
pub struct OrdinalScale {
	domain: Vec<String>,
	range: Vec<String>,
}

impl OrdinalScale {
	pub fn new(domain: impl IntoIterator<Item = String>, range: &[String]) -> Self {
		let mut unique: Vec<String> = Vec::new();
		for key in domain {
			if !unique.contains(&key) {
				unique.push(key);
			}
		}
		Self {
			domain: unique,
			range: range.to_vec(),
		}
	}

	/// Colour for `key`; unknown keys map like an extra domain entry would.
	pub fn get(&self, key: &str) -> &str {
		if self.range.is_empty() {
			return "currentColor";
		}
		let i = self
			.domain
			.iter()
			.position(|k| k == key)
			.unwrap_or(self.domain.len());
		&self.range[i % self.range.len()]
	}
}
