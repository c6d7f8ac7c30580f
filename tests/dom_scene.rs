//! Browser-only checks for the DOM-backed surface. Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use flow_scenes::components::sankey::{ColumnLayout, FlowRecord, SankeyConfig, render_sankey};
use flow_scenes::scene::{DomScene, ElementKind, Join, SVG_NS, Surface};
use wasm_bindgen_test::*;
use web_sys::Element;

wasm_bindgen_test_configure!(run_in_browser);

fn svg_root() -> Element {
	let document = web_sys::window().unwrap().document().unwrap();
	let svg = document.create_element_ns(Some(SVG_NS), "svg").unwrap();
	document.body().unwrap().append_child(&svg).unwrap();
	svg
}

#[wasm_bindgen_test]
fn join_reorders_dom_children() {
	let root = svg_root();
	let mut scene = DomScene::new(root.clone()).unwrap();
	let mut join = Join::new(scene.root(), ElementKind::Text);
	for items in [vec!['a', 'b', 'c'], vec!['c', 'a']] {
		join.reconcile(
			&mut scene,
			&items,
			|c| *c,
			|s, el, c, i| {
				s.attr(el, "x", i * 16)?;
				s.set_text(el, &c.to_string())
			},
			|s, el, _, i| s.attr(el, "x", i * 16),
		)
		.unwrap();
	}
	assert_eq!(root.text_content().unwrap(), "ca");
	assert_eq!(root.child_element_count(), 2);
	let first = root.first_element_child().unwrap();
	assert_eq!(first.get_attribute("x").as_deref(), Some("0"));
}

#[wasm_bindgen_test]
fn sankey_draws_into_the_page() {
	let root = svg_root();
	let mut scene = DomScene::new(root.clone()).unwrap();
	let records = [FlowRecord::new("a", "b", 2.0), FlowRecord::new("b", "c", 1.0)];
	render_sankey(&mut scene, &records, None, &SankeyConfig::default(), &ColumnLayout).unwrap();
	assert_eq!(root.query_selector_all("path").unwrap().length(), 2);
	assert_eq!(root.query_selector_all("linearGradient").unwrap().length(), 2);

	scene.clear().unwrap();
	assert_eq!(root.child_element_count(), 0);
}
