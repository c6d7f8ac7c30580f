use std::sync::atomic::{AtomicUsize, Ordering};

use kurbo::BezPath;
use log::{debug, info};

use super::config::{LinkColor, OrdinalScale, SankeyConfig};
use super::layout::{FlowLayout, LayoutParams};
use super::types::{FlowGraph, FlowLink, FlowRecord};
use crate::error::VizResult;
use crate::scene::{ElementKind, NodeId, Surface};

static NEXT_UID: AtomicUsize = AtomicUsize::new(0);

/// Document-unique id, e.g. `O-link-3`. Never repeats within the process.
pub fn uid(name: &str) -> String {
	let n = NEXT_UID.fetch_add(1, Ordering::Relaxed) + 1;
	format!("O-{name}-{n}")
}

/// What [`render_sankey`] drew.
#[derive(Clone, Debug)]
pub struct SankeyDiagram {
	pub graph: FlowGraph,
	pub node_elements: Vec<NodeId>,
	pub link_elements: Vec<NodeId>,
	pub gradient_ids: Vec<String>,
}

/// Horizontal cubic link shape from the source's right edge to the target's
/// left edge.
pub fn link_path(graph: &FlowGraph, link: &FlowLink) -> BezPath {
	let (x0, x1) = (graph.source_of(link).x1, graph.target_of(link).x0);
	let mid = (x0 + x1) / 2.0;
	let mut path = BezPath::new();
	path.move_to((x0, link.y0));
	path.curve_to((mid, link.y0), (mid, link.y1), (x1, link.y1));
	path
}

/// Lay out `records` with `layout` and draw the diagram under the surface
/// root. Endpoint resolution happens before `layout` runs; nothing is drawn
/// if either step fails.
pub fn render_sankey<S, L>(
	surface: &mut S,
	records: &[FlowRecord],
	nodes: Option<&[String]>,
	config: &SankeyConfig,
	layout: &L,
) -> VizResult<SankeyDiagram>
where
	S: Surface,
	L: FlowLayout + ?Sized,
{
	let mut graph = FlowGraph::build(records, nodes)?;
	if let Some(group) = config.node_group {
		for node in &mut graph.nodes {
			node.group = Some(group(&node.id));
		}
	}

	let params = LayoutParams {
		align: config.node_align,
		node_width: config.node_width,
		node_padding: config.node_padding,
		node_sort: config.node_sort,
		extent: config.extent(),
	};
	layout.layout(&mut graph, &params)?;
	debug!(
		"sankey layout: {} nodes, {} links",
		graph.nodes.len(),
		graph.links.len()
	);

	// Without grouping, links still need a colour per endpoint.
	let colour_key = |i: usize| {
		let node = &graph.nodes[i];
		node.group.as_deref().unwrap_or(node.id.as_str()).to_owned()
	};
	let color = OrdinalScale::new((0..graph.nodes.len()).map(colour_key), &config.colors);

	let root = surface.root();
	surface.attr(root, "width", config.width)?;
	surface.attr(root, "height", config.height)?;
	surface.set_attr(
		root,
		"viewBox",
		&format!("0 0 {} {}", config.width, config.height),
	)?;
	surface.set_attr(root, "style", "max-width: 100%; height: auto; height: intrinsic;")?;

	let node_elements = draw_nodes(surface, root, &graph, config, &color)?;

	let link_group = surface.create(root, ElementKind::Group)?;
	surface.set_attr(link_group, "fill", "none")?;
	surface.attr(link_group, "stroke-opacity", config.link_stroke_opacity)?;
	if let Some(mode) = &config.link_mix_blend_mode {
		surface.set_attr(link_group, "style", &format!("mix-blend-mode: {mode}"))?;
	}

	let mut link_elements = Vec::with_capacity(graph.links.len());
	let mut gradient_ids = Vec::new();
	for link in &graph.links {
		let g = surface.create(link_group, ElementKind::Group)?;
		let source_colour = color.get(&colour_key(link.source)).to_owned();
		let target_colour = color.get(&colour_key(link.target)).to_owned();

		let stroke = match &config.link_color {
			LinkColor::SourceTarget => {
				let id = uid("link");
				draw_gradient(surface, g, &id, &graph, link, &source_colour, &target_colour)?;
				let stroke = format!("url(#{id})");
				gradient_ids.push(id);
				stroke
			}
			LinkColor::Source => source_colour,
			LinkColor::Target => target_colour,
			LinkColor::Static(c) => c.clone(),
		};

		let path = surface.create(g, ElementKind::Path)?;
		surface.set_attr(path, "d", &link_path(&graph, link).to_svg())?;
		surface.set_attr(path, "stroke", &stroke)?;
		surface.attr(path, "stroke-width", link.width.max(1.0))?;
		if config.link_titles {
			let title = format!(
				"{} → {}\n{}",
				graph.source_of(link).id,
				graph.target_of(link).id,
				(config.format)(link.value)
			);
			surface.append_text(path, ElementKind::Title, &title)?;
		}
		link_elements.push(path);
	}

	if config.node_labels {
		draw_labels(surface, root, &graph, config)?;
	}

	info!(
		"rendered sankey: {} nodes, {} links",
		node_elements.len(),
		link_elements.len()
	);
	Ok(SankeyDiagram {
		graph,
		node_elements,
		link_elements,
		gradient_ids,
	})
}

fn draw_nodes<S: Surface>(
	surface: &mut S,
	root: NodeId,
	graph: &FlowGraph,
	config: &SankeyConfig,
	color: &OrdinalScale,
) -> VizResult<Vec<NodeId>> {
	let group = surface.create(root, ElementKind::Group)?;
	surface.set_attr(group, "stroke", &config.node_stroke)?;
	if let Some(w) = config.node_stroke_width {
		surface.attr(group, "stroke-width", w)?;
	}
	if let Some(o) = config.node_stroke_opacity {
		surface.attr(group, "stroke-opacity", o)?;
	}
	if let Some(join) = &config.node_stroke_linejoin {
		surface.set_attr(group, "stroke-linejoin", join)?;
	}

	let mut rects = Vec::with_capacity(graph.nodes.len());
	for node in &graph.nodes {
		let rect = surface.create(group, ElementKind::Rect)?;
		surface.attr(rect, "x", node.x0)?;
		surface.attr(rect, "y", node.y0)?;
		surface.attr(rect, "height", node.y1 - node.y0)?;
		surface.attr(rect, "width", node.x1 - node.x0)?;
		if let Some(g) = &node.group {
			surface.set_attr(rect, "fill", color.get(g))?;
		}
		if config.node_titles {
			let title = format!("{}\n{}", node.id, (config.format)(node.value));
			surface.append_text(rect, ElementKind::Title, &title)?;
		}
		rects.push(rect);
	}
	Ok(rects)
}

fn draw_gradient<S: Surface>(
	surface: &mut S,
	parent: NodeId,
	id: &str,
	graph: &FlowGraph,
	link: &FlowLink,
	from: &str,
	to: &str,
) -> VizResult<()> {
	let gradient = surface.create(parent, ElementKind::LinearGradient)?;
	surface.set_attr(gradient, "id", id)?;
	surface.set_attr(gradient, "gradientUnits", "userSpaceOnUse")?;
	surface.attr(gradient, "x1", graph.source_of(link).x1)?;
	surface.attr(gradient, "x2", graph.target_of(link).x0)?;
	for (offset, colour) in [("0%", from), ("100%", to)] {
		let stop = surface.create(gradient, ElementKind::Stop)?;
		surface.set_attr(stop, "offset", offset)?;
		surface.set_attr(stop, "stop-color", colour)?;
	}
	Ok(())
}

fn draw_labels<S: Surface>(
	surface: &mut S,
	root: NodeId,
	graph: &FlowGraph,
	config: &SankeyConfig,
) -> VizResult<()> {
	let group = surface.create(root, ElementKind::Group)?;
	surface.set_attr(group, "font-family", "sans-serif")?;
	surface.attr(group, "font-size", 10)?;
	for node in &graph.nodes {
		let left_half = node.x0 < config.width / 2.0;
		let text = surface.create(group, ElementKind::Text)?;
		let x = if left_half {
			node.x1 + config.node_label_padding
		} else {
			node.x0 - config.node_label_padding
		};
		surface.attr(text, "x", x)?;
		surface.attr(text, "y", (node.y1 + node.y0) / 2.0)?;
		surface.set_attr(text, "dy", "0.35em")?;
		surface.set_attr(text, "text-anchor", if left_half { "start" } else { "end" })?;
		surface.set_text(text, &node.id)?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::sankey::layout::ColumnLayout;
	use crate::error::VizError;
	use crate::scene::MemoryScene;

	fn lowercase(id: &str) -> String {
		id.to_lowercase()
	}

	fn energyish() -> Vec<FlowRecord> {
		vec![
			FlowRecord::new("Coal", "Electricity", 40.0),
			FlowRecord::new("Gas", "Electricity", 20.0),
			FlowRecord::new("Electricity", "Homes", 35.0),
			FlowRecord::new("Electricity", "Losses", 25.0),
		]
	}

	#[test]
	fn draws_one_rect_per_node_and_one_path_per_link() {
		let mut scene = MemoryScene::new();
		let drawn =
			render_sankey(&mut scene, &energyish(), None, &SankeyConfig::default(), &ColumnLayout)
				.unwrap();
		assert_eq!(scene.find_all(ElementKind::Rect).len(), 5);
		assert_eq!(scene.find_all(ElementKind::Path).len(), 4);
		assert_eq!(scene.find_all(ElementKind::Text).len(), 5);
		assert_eq!(drawn.link_elements.len(), 4);

		let first = drawn.link_elements[0];
		let width = drawn.graph.links[0].width.max(1.0).to_string();
		assert_eq!(scene.get_attr(first, "stroke-width"), Some(width.as_str()));
		let d = scene.get_attr(first, "d").unwrap();
		assert!(d.starts_with('M'));
		assert!(d.contains('C'));
	}

	#[test]
	fn source_target_links_get_distinct_gradients() {
		let mut scene = MemoryScene::new();
		let drawn = render_sankey(
			&mut scene,
			&energyish()[..2],
			None,
			&SankeyConfig::default(),
			&ColumnLayout,
		)
		.unwrap();
		assert_eq!(drawn.gradient_ids.len(), 2);
		assert_ne!(drawn.gradient_ids[0], drawn.gradient_ids[1]);
		let stroke = scene.get_attr(drawn.link_elements[1], "stroke").unwrap();
		assert_eq!(stroke, format!("url(#{})", drawn.gradient_ids[1]));
		assert_eq!(scene.find_all(ElementKind::Stop).len(), 4);

		let mut again = MemoryScene::new();
		let redrawn = render_sankey(
			&mut again,
			&energyish()[..2],
			None,
			&SankeyConfig::default(),
			&ColumnLayout,
		)
		.unwrap();
		assert!(redrawn.gradient_ids.iter().all(|id| !drawn.gradient_ids.contains(id)));
	}

	#[test]
	fn ungrouped_nodes_colour_links_by_id() {
		let records = vec![FlowRecord::new("A", "B", 5.0), FlowRecord::new("C", "D", 5.0)];
		let config = SankeyConfig {
			link_color: LinkColor::Source,
			..Default::default()
		};
		let mut scene = MemoryScene::new();
		let drawn = render_sankey(&mut scene, &records, None, &config, &ColumnLayout).unwrap();
		let first = scene.get_attr(drawn.link_elements[0], "stroke").unwrap();
		let second = scene.get_attr(drawn.link_elements[1], "stroke").unwrap();
		assert_ne!(first, second);

		let mut scene = MemoryScene::new();
		render_sankey(&mut scene, &records, None, &SankeyConfig::default(), &ColumnLayout).unwrap();
		let stops = scene.find_all(ElementKind::Stop);
		let from = scene.get_attr(stops[0], "stop-color").unwrap();
		let to = scene.get_attr(stops[1], "stop-color").unwrap();
		assert_ne!(from, to);
	}

	#[test]
	fn static_and_endpoint_colours() {
		let config = SankeyConfig {
			link_color: LinkColor::Static("#aaa".into()),
			..Default::default()
		};
		let mut scene = MemoryScene::new();
		let drawn = render_sankey(&mut scene, &energyish(), None, &config, &ColumnLayout).unwrap();
		assert!(drawn.gradient_ids.is_empty());
		assert!(scene.find_all(ElementKind::LinearGradient).is_empty());
		assert_eq!(scene.get_attr(drawn.link_elements[0], "stroke"), Some("#aaa"));

		let config = SankeyConfig {
			link_color: LinkColor::Target,
			node_group: Some(lowercase),
			..Default::default()
		};
		let mut scene = MemoryScene::new();
		let drawn = render_sankey(&mut scene, &energyish(), None, &config, &ColumnLayout).unwrap();
		let electricity_fill = scene.get_attr(drawn.node_elements[1], "fill").unwrap().to_owned();
		assert_eq!(
			scene.get_attr(drawn.link_elements[0], "stroke"),
			Some(electricity_fill.as_str())
		);
	}

	#[test]
	fn labels_sit_on_the_inner_side() {
		let mut scene = MemoryScene::new();
		let drawn =
			render_sankey(&mut scene, &energyish(), None, &SankeyConfig::default(), &ColumnLayout)
				.unwrap();
		let labels = scene.find_all(ElementKind::Text);
		for (node, label) in drawn.graph.nodes.iter().zip(labels) {
			let anchor = scene.get_attr(label, "text-anchor").unwrap();
			if node.x0 < 320.0 {
				assert_eq!(anchor, "start");
			} else {
				assert_eq!(anchor, "end");
			}
			assert_eq!(scene.text(label), Some(node.id.as_str()));
		}
	}

	#[test]
	fn dangling_reference_fails_before_layout() {
		let calls = Cell::new(0);
		let counting = |_: &mut FlowGraph, _: &LayoutParams| -> VizResult<()> {
			calls.set(calls.get() + 1);
			Ok(())
		};
		let declared = vec!["Coal".to_string(), "Electricity".to_string()];
		let mut scene = MemoryScene::new();
		let err = render_sankey(
			&mut scene,
			&energyish(),
			Some(declared.as_slice()),
			&SankeyConfig::default(),
			&counting,
		)
		.unwrap_err();
		assert_eq!(
			err,
			VizError::DanglingReference {
				link: 1,
				endpoint: "Gas".into()
			}
		);
		assert_eq!(calls.get(), 0);
		assert!(scene.is_empty());

		let inferred = [FlowRecord::new("X", "Y", 5.0)];
		render_sankey(&mut scene, &inferred, None, &SankeyConfig::default(), &counting).unwrap();
		assert_eq!(calls.get(), 1);
	}

	#[test]
	fn titles_use_the_formatter() {
		let config = SankeyConfig {
			format: |v| format!("{v} TWh"),
			..Default::default()
		};
		let mut scene = MemoryScene::new();
		let drawn = render_sankey(&mut scene, &energyish(), None, &config, &ColumnLayout).unwrap();
		let title = scene.children(drawn.link_elements[0])[0];
		assert_eq!(scene.text(title), Some("Coal → Electricity\n40 TWh"));
	}
}
