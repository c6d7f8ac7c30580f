//! Crate-wide error type.

use wasm_bindgen::JsValue;

/// Result alias used throughout the crate.
pub type VizResult<T> = Result<T, VizError>;

/// Everything that can go wrong while building or updating a scene.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum VizError {
	/// A link names a node that is neither declared nor inferable.
	#[error("dangling reference: link {link} points at unknown node '{endpoint}'")]
	DanglingReference {
		/// Position of the offending link in the input.
		link: usize,
		/// The unresolved node identifier.
		endpoint: String,
	},

	/// More samples were requested than the pool can supply.
	#[error("insufficient pool: requested {requested} of {available} items")]
	InsufficientPool {
		/// Largest sample size asked for.
		requested: usize,
		/// Number of distinct items in the pool.
		available: usize,
	},

	/// The animator was ticked after `stop()`.
	#[error("animator stopped")]
	Stopped,

	/// The layout could not place the graph, e.g. it contains a cycle.
	#[error("layout error: {0}")]
	Layout(String),

	/// The rendering surface rejected an element operation.
	#[error("surface error: {0}")]
	Surface(String),

	/// Input records could not be parsed or are inconsistent.
	#[error("dataset error: {0}")]
	Dataset(String),
}

impl VizError {
	/// Build a [`VizError::Layout`].
	pub fn layout(msg: impl Into<String>) -> Self {
		Self::Layout(msg.into())
	}

	/// Build a [`VizError::Surface`].
	pub fn surface(msg: impl Into<String>) -> Self {
		Self::Surface(msg.into())
	}

	/// Build a [`VizError::Dataset`].
	pub fn dataset(msg: impl Into<String>) -> Self {
		Self::Dataset(msg.into())
	}
}

impl From<JsValue> for VizError {
	fn from(value: JsValue) -> Self {
		Self::Surface(
			value
				.as_string()
				.unwrap_or_else(|| format!("{value:?}")),
		)
	}
}
