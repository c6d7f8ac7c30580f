use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use leptos::prelude::IntervalHandle;
use log::{error, info, warn};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::error::{VizError, VizResult};
use crate::scene::{ElementKind, Join, JoinStats, NodeId, Surface};

/// Pool the animator samples from.
pub const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";
/// Fewest letters drawn per tick.
pub const MIN_LETTERS: usize = 6;
/// Most letters drawn per tick.
pub const MAX_LETTERS: usize = 25;

/// Horizontal distance between adjacent letters.
pub const LETTER_SPACING: f64 = 16.0;
/// Baseline of entering letters.
pub const BASELINE_Y: f64 = 0.0;
/// Fill of letters that survived from the previous tick.
pub const HIGHLIGHT_FILL: &str = "brown";
/// Height of the svg viewport.
pub const VIEW_HEIGHT: f64 = 33.0;
/// Delay between ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Draw between `min` and `max` distinct items from `pool`, sorted ascending.
///
/// `pool` is assumed to hold distinct items.
pub fn sample_sorted<T, R>(rng: &mut R, pool: &[T], min: usize, max: usize) -> VizResult<Vec<T>>
where
	T: Ord + Clone,
	R: Rng + ?Sized,
{
	if max > pool.len() || min > max {
		return Err(VizError::InsufficientPool {
			requested: max.max(min),
			available: pool.len(),
		});
	}
	let count = rng.random_range(min..=max);
	let mut picked: Vec<T> = pool.choose_multiple(rng, count).cloned().collect();
	picked.sort_unstable();
	Ok(picked)
}

/// Lifecycle of a [`LetterAnimator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimatorState {
	/// Ticks are accepted.
	Running,
	/// Terminal; ticks fail with [`VizError::Stopped`].
	Stopped,
}

/// Random letters re-joined against an svg on every tick.
pub struct LetterAnimator<S, R> {
	scene: S,
	join: Join<char>,
	rng: R,
	pool: Vec<char>,
	state: AnimatorState,
	ticks: u64,
}

impl<S: Surface, R: Rng> LetterAnimator<S, R> {
	/// Size the root for `width` pixels of letters and start in `Running`.
	pub fn new(mut scene: S, rng: R, width: f64) -> VizResult<Self> {
		let root = scene.root();
		scene.attr(root, "width", width)?;
		scene.attr(root, "height", VIEW_HEIGHT)?;
		scene.set_attr(root, "viewBox", &format!("0 -20 {width} {VIEW_HEIGHT}"))?;
		scene.set_attr(root, "font-family", "sans-serif")?;
		scene.attr(root, "font-size", 10)?;
		Ok(Self {
			join: Join::new(root, ElementKind::Text),
			scene,
			rng,
			pool: ALPHABET.chars().collect(),
			state: AnimatorState::Running,
			ticks: 0,
		})
	}

	/// Sample a fresh letter set and reconcile it.
	pub fn tick(&mut self) -> VizResult<JoinStats> {
		if self.state == AnimatorState::Stopped {
			return Err(VizError::Stopped);
		}
		let letters = sample_sorted(&mut self.rng, &self.pool, MIN_LETTERS, MAX_LETTERS)?;
		let stats = self.join.reconcile(
			&mut self.scene,
			&letters,
			|c| *c,
			enter_letter,
			update_letter,
		)?;
		self.ticks += 1;
		Ok(stats)
	}
}

impl<S, R> LetterAnimator<S, R> {
	/// Current lifecycle state.
	pub fn state(&self) -> AnimatorState {
		self.state
	}

	/// Completed ticks since construction.
	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	/// Surface the letters are drawn on.
	pub fn scene(&self) -> &S {
		&self.scene
	}

	/// Letters currently on screen, in display order.
	pub fn letters(&self) -> &[char] {
		self.join.keys()
	}

	/// Returns whether the animator was still running.
	pub fn stop(&mut self) -> bool {
		let was_running = self.state == AnimatorState::Running;
		self.state = AnimatorState::Stopped;
		was_running
	}
}

fn enter_letter<S: Surface>(scene: &mut S, el: NodeId, letter: &char, index: usize) -> VizResult<()> {
	scene.attr(el, "x", index as f64 * LETTER_SPACING)?;
	scene.attr(el, "y", BASELINE_Y)?;
	scene.set_text(el, &letter.to_string())
}

fn update_letter<S: Surface>(scene: &mut S, el: NodeId, _: &char, index: usize) -> VizResult<()> {
	scene.attr(el, "x", index as f64 * LETTER_SPACING)?;
	scene.set_attr(el, "fill", HIGHLIGHT_FILL)
}

/// A pending timer that can be cancelled exactly once.
pub trait TimerHandle {
	/// Release the timer.
	fn cancel(self);
}

impl TimerHandle for IntervalHandle {
	fn cancel(self) {
		self.clear();
	}
}

/// A running [`LetterAnimator`] together with the timer driving it.
///
/// Stopping (or dropping) the task cancels the timer and moves the animator to
/// [`AnimatorState::Stopped`].
pub struct AnimatorTask<S, R, H: TimerHandle> {
	animator: Rc<RefCell<LetterAnimator<S, R>>>,
	timer: Option<H>,
	stopped: Rc<Cell<bool>>,
}

impl<S, R, H> AnimatorTask<S, R, H>
where
	S: Surface + 'static,
	R: Rng + 'static,
	H: TimerHandle,
{
	/// Run the first tick now, then hand a tick callback to `schedule`.
	pub fn start(
		animator: LetterAnimator<S, R>,
		schedule: impl FnOnce(Box<dyn Fn()>) -> VizResult<H>,
	) -> VizResult<Self> {
		let animator = Rc::new(RefCell::new(animator));
		animator.borrow_mut().tick()?;

		let stopped = Rc::new(Cell::new(false));
		let ticking = Rc::clone(&animator);
		let halted = Rc::clone(&stopped);
		let timer = schedule(Box::new(move || {
			let Ok(mut a) = ticking.try_borrow_mut() else {
				return;
			};
			// A stop that found the animator borrowed is applied here.
			if halted.get() {
				a.stop();
				return;
			}
			match a.tick() {
				Ok(_) | Err(VizError::Stopped) => {}
				Err(e) => error!("letter tick failed: {e}"),
			}
		}))?;
		info!("letter animator started");

		Ok(Self {
			animator,
			timer: Some(timer),
			stopped,
		})
	}

	/// Shared handle to the animator the timer drives.
	pub fn animator(&self) -> &Rc<RefCell<LetterAnimator<S, R>>> {
		&self.animator
	}
}

impl<S, R, H: TimerHandle> AnimatorTask<S, R, H> {
	/// False once [`stop`](Self::stop) ran, even if the animator was busy at the time.
	pub fn is_running(&self) -> bool {
		!self.stopped.get()
			&& self
				.animator
				.try_borrow()
				.map_or(true, |a| a.state() == AnimatorState::Running)
	}

	/// Cancel the timer and stop the animator. Safe to call more than once.
	pub fn stop(&mut self) {
		self.stopped.set(true);
		if let Some(timer) = self.timer.take() {
			timer.cancel();
			info!("letter animator stopped");
		}
		match self.animator.try_borrow_mut() {
			Ok(mut a) => {
				a.stop();
			}
			Err(_) => warn!("letter animator busy while stopping; state change deferred"),
		}
	}
}

impl<S, R, H: TimerHandle> Drop for AnimatorTask<S, R, H> {
	fn drop(&mut self) {
		self.stop();
	}
}
