use leptos::prelude::*;
use log::error;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use web_sys::Element;

use super::state::{ALPHABET, AnimatorTask, LETTER_SPACING, LetterAnimator, TICK_INTERVAL};
use crate::error::VizResult;
use crate::scene::DomScene;

type LetterTask = AnimatorTask<DomScene, SmallRng, IntervalHandle>;

fn start_ticker(root: Element, width: f64) -> VizResult<LetterTask> {
	let scene = DomScene::new(root)?;
	let rng = SmallRng::seed_from_u64(js_sys::Date::now() as u64);
	let animator = LetterAnimator::new(scene, rng, width)?;
	AnimatorTask::start(animator, |tick| {
		Ok(set_interval_with_handle(move || tick(), TICK_INTERVAL)?)
	})
}

/// Random sorted letters, re-drawn every second until the component unmounts.
#[component]
pub fn LetterTicker(
	#[prop(default = ALPHABET.len() as f64 * LETTER_SPACING)] width: f64,
) -> impl IntoView {
	let svg_ref = NodeRef::<leptos::svg::Svg>::new();
	let task = StoredValue::new_local(None::<LetterTask>);

	Effect::new(move |_| {
		let Some(svg) = svg_ref.get() else {
			return;
		};
		if task.with_value(Option::is_some) {
			return;
		}
		match start_ticker(svg.into(), width) {
			Ok(started) => task.set_value(Some(started)),
			Err(e) => error!("letter ticker failed to start: {e}"),
		}
	});

	on_cleanup(move || {
		task.try_update_value(|t| {
			if let Some(t) = t.as_mut() {
				t.stop();
			}
		});
	});

	view! { <svg node_ref=svg_ref class="letter-ticker" /> }
}
