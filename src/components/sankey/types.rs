use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{VizError, VizResult};

/// One weighted edge of the input dataset.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FlowRecord {
	pub source: String,
	pub target: String,
	pub value: f64,
}

impl FlowRecord {
	pub fn new(source: impl Into<String>, target: impl Into<String>, value: f64) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			value,
		}
	}
}

/// A node of the flow graph. Geometry fields are filled in by a layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowNode {
	pub id: String,
	pub group: Option<String>,
	pub value: f64,
	pub depth: usize,
	pub height: usize,
	pub layer: usize,
	pub x0: f64,
	pub y0: f64,
	pub x1: f64,
	pub y1: f64,
	/// Outgoing links, as indices into [`FlowGraph::links`].
	pub source_links: Vec<usize>,
	/// Incoming links, as indices into [`FlowGraph::links`].
	pub target_links: Vec<usize>,
}

impl FlowNode {
	fn new(id: String) -> Self {
		Self {
			id,
			..Default::default()
		}
	}
}

/// A link between two nodes, by node index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowLink {
	pub source: usize,
	pub target: usize,
	pub value: f64,
	pub width: f64,
	/// Vertical centre of the link where it leaves the source.
	pub y0: f64,
	/// Vertical centre of the link where it enters the target.
	pub y1: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowGraph {
	pub nodes: Vec<FlowNode>,
	pub links: Vec<FlowLink>,
}

impl FlowGraph {
	/// Resolve `records` against `nodes`, or against every endpoint named by
	/// the records (first-seen order) when no node list is given.
	///
	/// Fails on the first link whose endpoint is not a known node.
	pub fn build(records: &[FlowRecord], nodes: Option<&[String]>) -> VizResult<Self> {
		let ids: Vec<String> = match nodes {
			Some(declared) => declared.to_vec(),
			None => {
				let mut seen = Vec::new();
				for r in records {
					for id in [&r.source, &r.target] {
						if !seen.contains(id) {
							seen.push(id.clone());
						}
					}
				}
				seen
			}
		};

		let mut index: HashMap<&str, usize> = HashMap::with_capacity(ids.len());
		for (i, id) in ids.iter().enumerate() {
			if index.insert(id.as_str(), i).is_some() {
				return Err(VizError::dataset(format!("duplicate node id '{id}'")));
			}
		}

		let mut links = Vec::with_capacity(records.len());
		for (i, r) in records.iter().enumerate() {
			let resolve = |endpoint: &String| {
				index
					.get(endpoint.as_str())
					.copied()
					.ok_or_else(|| VizError::DanglingReference {
						link: i,
						endpoint: endpoint.clone(),
					})
			};
			let (source, target) = (resolve(&r.source)?, resolve(&r.target)?);
			if r.value.is_nan() || r.value < 0.0 {
				return Err(VizError::dataset(format!(
					"link {i} ({} -> {}) has invalid value {}",
					r.source, r.target, r.value
				)));
			}
			links.push(FlowLink {
				source,
				target,
				value: r.value,
				..Default::default()
			});
		}

		let mut nodes: Vec<FlowNode> = ids.into_iter().map(FlowNode::new).collect();
		for (i, link) in links.iter().enumerate() {
			nodes[link.source].source_links.push(i);
			nodes[link.target].target_links.push(i);
		}
		Ok(Self { nodes, links })
	}

	pub fn source_of(&self, link: &FlowLink) -> &FlowNode {
		&self.nodes[link.source]
	}

	pub fn target_of(&self, link: &FlowLink) -> &FlowNode {
		&self.nodes[link.target]
	}
}
