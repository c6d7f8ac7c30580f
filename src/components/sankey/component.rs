use leptos::prelude::*;
use log::error;
use web_sys::Element;

use super::config::SankeyConfig;
use super::layout::ColumnLayout;
use super::render::render_sankey;
use super::types::FlowRecord;
use crate::error::VizResult;
use crate::scene::DomScene;

fn draw(root: Element, records: &[FlowRecord], nodes: Option<&[String]>, config: &SankeyConfig) -> VizResult<()> {
	let mut scene = DomScene::new(root)?;
	scene.clear()?;
	render_sankey(&mut scene, records, nodes, config, &ColumnLayout)?;
	Ok(())
}

/// Static flow diagram, drawn once when the `<svg>` mounts.
#[component]
pub fn SankeyChart(
	records: Vec<FlowRecord>,
	#[prop(optional)] nodes: Option<Vec<String>>,
	#[prop(optional)] config: Option<SankeyConfig>,
) -> impl IntoView {
	let svg_ref = NodeRef::<leptos::svg::Svg>::new();
	let failure = RwSignal::new(None::<String>);
	let drawn = StoredValue::new(false);
	let config = config.unwrap_or_default();

	Effect::new(move |_| {
		let Some(svg) = svg_ref.get() else {
			return;
		};
		if drawn.get_value() {
			return;
		}
		drawn.set_value(true);
		if let Err(e) = draw(svg.into(), &records, nodes.as_deref(), &config) {
			error!("sankey render failed: {e}");
			failure.set(Some(e.to_string()));
		}
	});

	view! {
		<figure class="sankey-chart">
			<svg node_ref=svg_ref />
			{move || failure.get().map(|msg| view! { <figcaption class="error">{msg}</figcaption> })}
		</figure>
	}
}
