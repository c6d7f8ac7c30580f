//! The seam between the renderer and whatever positions nodes and links.
//!
//! The renderer only relies on [`FlowLayout`]: given a resolved [`FlowGraph`]
//! and [`LayoutParams`], fill in every node's `x0..y1` box and every link's
//! `width`, `y0` and `y1`. Implementations must be deterministic.
//!
//! [`ColumnLayout`] is the bundled implementation: the usual layered
//! placement (depth by longest path, columns by [`NodeAlign`], values scaled
//! to the tallest column) with no iterative relaxation afterwards.

use std::cmp::Ordering;

use super::config::{NodeAlign, NodeOrder};
use super::types::FlowGraph;
use crate::error::{VizError, VizResult};

/// Inputs a [`FlowLayout`] needs besides the graph itself.
#[derive(Clone)]
pub struct LayoutParams {
	/// Column rule for nodes.
	pub align: NodeAlign,
	/// Horizontal size of every node box.
	pub node_width: f64,
	/// Vertical gap between nodes in the same column.
	pub node_padding: f64,
	/// Order within a column; `None` keeps input order.
	pub node_sort: Option<NodeOrder>,
	/// `[[x0, y0], [x1, y1]]`
	pub extent: [[f64; 2]; 2],
}

/// Positions nodes and links in place.
pub trait FlowLayout {
	/// Fill in node boxes and link widths and offsets for `graph`.
	fn layout(&self, graph: &mut FlowGraph, params: &LayoutParams) -> VizResult<()>;
}

impl<F> FlowLayout for F
where
	F: Fn(&mut FlowGraph, &LayoutParams) -> VizResult<()>,
{
	fn layout(&self, graph: &mut FlowGraph, params: &LayoutParams) -> VizResult<()> {
		self(graph, params)
	}
}

/// Layered placement without relaxation.
#[derive(Clone, Copy, Debug, Default)]
pub struct ColumnLayout;

impl FlowLayout for ColumnLayout {
	fn layout(&self, graph: &mut FlowGraph, params: &LayoutParams) -> VizResult<()> {
		node_values(graph);
		node_depths(graph)?;
		node_heights(graph)?;
		let columns = node_layers(graph, params);
		node_breadths(graph, params, &columns);
		link_breadths(graph);
		Ok(())
	}
}

fn node_values(graph: &mut FlowGraph) {
	let FlowGraph { nodes, links } = graph;
	for node in nodes.iter_mut() {
		let out: f64 = node.source_links.iter().map(|&l| links[l].value).sum();
		let inc: f64 = node.target_links.iter().map(|&l| links[l].value).sum();
		node.value = out.max(inc);
	}
}

/// Breadth-first sweep assigning `depth` (forward) or `height` (backward).
fn sweep(graph: &mut FlowGraph, forward: bool) -> VizResult<()> {
	let n = graph.nodes.len();
	let mut current: Vec<usize> = (0..n).collect();
	let mut step = 0;
	while !current.is_empty() {
		let mut queued = vec![false; n];
		let mut next = Vec::new();
		for &i in &current {
			let node = &mut graph.nodes[i];
			let links = if forward {
				node.depth = step;
				&node.source_links
			} else {
				node.height = step;
				&node.target_links
			};
			for &l in links {
				let link = &graph.links[l];
				let other = if forward { link.target } else { link.source };
				if !queued[other] {
					queued[other] = true;
					next.push(other);
				}
			}
		}
		step += 1;
		if step > n {
			return Err(VizError::layout("circular link"));
		}
		current = next;
	}
	Ok(())
}

fn node_depths(graph: &mut FlowGraph) -> VizResult<()> {
	sweep(graph, true)
}

fn node_heights(graph: &mut FlowGraph) -> VizResult<()> {
	sweep(graph, false)
}

fn node_layers(graph: &mut FlowGraph, params: &LayoutParams) -> Vec<Vec<usize>> {
	let [[x0, _], [x1, _]] = params.extent;
	let count = graph.nodes.iter().map(|n| n.depth).max().map_or(0, |d| d + 1);
	let kx = if count > 1 {
		(x1 - x0 - params.node_width) / (count - 1) as f64
	} else {
		0.0
	};

	let mut columns: Vec<Vec<usize>> = vec![Vec::new(); count];
	for i in 0..graph.nodes.len() {
		let layer = params
			.align
			.column(&graph.nodes[i], &graph.nodes, &graph.links, count)
			.min(count.saturating_sub(1));
		let node = &mut graph.nodes[i];
		node.layer = layer;
		node.x0 = x0 + layer as f64 * kx;
		node.x1 = node.x0 + params.node_width;
		columns[layer].push(i);
	}
	if let Some(order) = params.node_sort {
		for column in &mut columns {
			column.sort_by(|&a, &b| order(&graph.nodes[a], &graph.nodes[b]));
		}
	}
	columns
}

fn node_breadths(graph: &mut FlowGraph, params: &LayoutParams, columns: &[Vec<usize>]) {
	let [[_, y0], [_, y1]] = params.extent;
	let tallest = columns.iter().map(Vec::len).max().unwrap_or(0);
	let py = if tallest > 1 {
		params.node_padding.min((y1 - y0) / (tallest - 1) as f64)
	} else {
		params.node_padding
	};

	let ky = columns
		.iter()
		.filter_map(|c| {
			let total: f64 = c.iter().map(|&i| graph.nodes[i].value).sum();
			(total > 0.0).then(|| (y1 - y0 - (c.len() as f64 - 1.0) * py) / total)
		})
		.min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
		.unwrap_or(0.0)
		.max(0.0);

	for column in columns {
		let mut y = y0;
		for &i in column {
			let node = &mut graph.nodes[i];
			node.y0 = y;
			node.y1 = y + node.value * ky;
			y = node.y1 + py;
			for &l in &node.source_links {
				graph.links[l].width = graph.links[l].value * ky;
			}
		}
		// Spread the leftover space evenly around the column's nodes.
		let slack = (y1 - y + py) / (column.len() + 1) as f64;
		for (k, &i) in column.iter().enumerate() {
			let node = &mut graph.nodes[i];
			node.y0 += slack * (k + 1) as f64;
			node.y1 += slack * (k + 1) as f64;
		}
	}
}

fn link_breadths(graph: &mut FlowGraph) {
	let FlowGraph { nodes, links } = graph;
	for n in 0..nodes.len() {
		let mut outgoing = nodes[n].source_links.clone();
		let mut incoming = nodes[n].target_links.clone();
		outgoing.sort_by(|&a, &b| by_y0(nodes[links[a].target].y0, nodes[links[b].target].y0, a, b));
		incoming.sort_by(|&a, &b| by_y0(nodes[links[a].source].y0, nodes[links[b].source].y0, a, b));

		let mut y = nodes[n].y0;
		for &l in &outgoing {
			links[l].y0 = y + links[l].width / 2.0;
			y += links[l].width;
		}
		let mut y = nodes[n].y0;
		for &l in &incoming {
			links[l].y1 = y + links[l].width / 2.0;
			y += links[l].width;
		}
		nodes[n].source_links = outgoing;
		nodes[n].target_links = incoming;
	}
}

fn by_y0(ya: f64, yb: f64, a: usize, b: usize) -> Ordering {
	ya.partial_cmp(&yb).unwrap_or(Ordering::Equal).then(a.cmp(&b))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::sankey::types::FlowRecord;

	fn params(align: NodeAlign) -> LayoutParams {
		LayoutParams {
			align,
			node_width: 10.0,
			node_padding: 10.0,
			node_sort: None,
			extent: [[0.0, 0.0], [200.0, 100.0]],
		}
	}

	fn graph(rows: &[(&str, &str, f64)]) -> FlowGraph {
		let records: Vec<_> = rows.iter().map(|&(s, t, v)| FlowRecord::new(s, t, v)).collect();
		FlowGraph::build(&records, None).unwrap()
	}

	#[test]
	fn chain_spreads_across_columns() {
		let mut g = graph(&[("a", "b", 4.0), ("b", "c", 4.0)]);
		ColumnLayout.layout(&mut g, &params(NodeAlign::Justify)).unwrap();
		let xs: Vec<_> = g.nodes.iter().map(|n| n.x0).collect();
		assert_eq!(xs, vec![0.0, 95.0, 190.0]);
		for node in &g.nodes {
			assert!((node.y1 - node.y0 - 100.0).abs() < 1e-9);
			assert_eq!(node.x1 - node.x0, 10.0);
		}
		assert!((g.links[0].width - 100.0).abs() < 1e-9);
		assert!((g.links[0].y0 - 50.0).abs() < 1e-9);
	}

	#[test]
	fn justify_pushes_sinks_to_the_last_column() {
		let mut g = graph(&[("a", "b", 1.0), ("b", "c", 1.0), ("a", "d", 1.0)]);
		ColumnLayout.layout(&mut g, &params(NodeAlign::Justify)).unwrap();
		let d = g.nodes.iter().find(|n| n.id == "d").unwrap();
		assert_eq!(d.layer, 2);

		ColumnLayout.layout(&mut g, &params(NodeAlign::Left)).unwrap();
		let d = g.nodes.iter().find(|n| n.id == "d").unwrap();
		assert_eq!(d.layer, 1);
	}

	#[test]
	fn right_and_center_alignment() {
		let mut g = graph(&[("a", "b", 1.0), ("b", "c", 1.0), ("x", "c", 1.0)]);
		ColumnLayout.layout(&mut g, &params(NodeAlign::Right)).unwrap();
		let x = g.nodes.iter().find(|n| n.id == "x").unwrap();
		assert_eq!(x.layer, 1);

		ColumnLayout.layout(&mut g, &params(NodeAlign::Center)).unwrap();
		let x = g.nodes.iter().find(|n| n.id == "x").unwrap();
		assert_eq!(x.layer, 1);
		let a = g.nodes.iter().find(|n| n.id == "a").unwrap();
		assert_eq!(a.layer, 0);
	}

	#[test]
	fn cycles_are_rejected() {
		let mut g = graph(&[("a", "b", 1.0), ("b", "a", 1.0)]);
		let err = ColumnLayout.layout(&mut g, &params(NodeAlign::Justify)).unwrap_err();
		assert_eq!(err, VizError::layout("circular link"));
	}

	#[test]
	fn layout_is_deterministic() {
		let rows = [("a", "b", 3.0), ("a", "c", 1.0), ("c", "b", 0.5), ("b", "d", 2.0)];
		let mut first = graph(&rows);
		let mut second = graph(&rows);
		ColumnLayout.layout(&mut first, &params(NodeAlign::Justify)).unwrap();
		ColumnLayout.layout(&mut second, &params(NodeAlign::Justify)).unwrap();
		assert_eq!(first, second);
	}

	#[test]
	fn closures_are_layouts() {
		let pin = |g: &mut FlowGraph, _: &LayoutParams| -> VizResult<()> {
			for node in &mut g.nodes {
				node.x1 = 1.0;
			}
			Ok(())
		};
		let mut g = graph(&[("a", "b", 1.0)]);
		pin.layout(&mut g, &params(NodeAlign::Left)).unwrap();
		assert!(g.nodes.iter().all(|n| n.x1 == 1.0));
	}
}
