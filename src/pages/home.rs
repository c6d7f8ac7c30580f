use leptos::prelude::*;

use crate::components::letters::LetterTicker;
use crate::components::sankey::SankeyChart;
use crate::components::sankey::data::{energy_config, energy_records};

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let energy = energy_records()
		.map(|records| view! { <SankeyChart records=records config=energy_config() /> });

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<section class="letters">
				<h2>"General update pattern"</h2>
				<p class="subtitle">"Letters that stay between ticks turn brown; new ones enter black."</p>
				<LetterTicker />
			</section>

			<section class="energy">
				<h2>"UK energy flows, 2050"</h2>
				{energy}
			</section>
		</ErrorBoundary>
	}
}
