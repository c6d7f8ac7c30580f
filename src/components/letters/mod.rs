mod component;
pub mod state;

pub use component::LetterTicker;
pub use state::{AnimatorState, AnimatorTask, LetterAnimator, TimerHandle, sample_sorted};
