//! Generic SVG scene graph and the keyed join that keeps it in sync with data.
//!
//! A [`Surface`] is anything that can create, mutate and remove typed SVG
//! elements. [`MemoryScene`] keeps the tree in memory (and can serialize it
//! to markup); [`DomScene`] writes straight into a live `<svg>` element.

use std::fmt::Display;

use crate::error::VizResult;

mod dom;
mod join;
mod memory;

pub use dom::DomScene;
pub use join::{Join, JoinStats};
pub use memory::MemoryScene;

/// SVG namespace used for every element created by a surface.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Handle to an element owned by a [`Surface`].
///
/// Handles are only meaningful for the surface that issued them and are never
/// reused after removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// The drawable element types a surface knows how to create.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
	Svg,
	Group,
	Rect,
	Path,
	Text,
	Title,
	Defs,
	LinearGradient,
	Stop,
}

impl ElementKind {
	/// The SVG tag name for this kind.
	pub fn tag(self) -> &'static str {
		match self {
			Self::Svg => "svg",
			Self::Group => "g",
			Self::Rect => "rect",
			Self::Path => "path",
			Self::Text => "text",
			Self::Title => "title",
			Self::Defs => "defs",
			Self::LinearGradient => "linearGradient",
			Self::Stop => "stop",
		}
	}
}

/// A mutable scene graph of SVG elements.
pub trait Surface {
	/// The element everything else hangs off.
	fn root(&self) -> NodeId;

	/// Create a `kind` element as the last child of `parent`.
	fn create(&mut self, parent: NodeId, kind: ElementKind) -> VizResult<NodeId>;

	/// Set (or overwrite) an attribute.
	fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> VizResult<()>;

	/// Replace the element's text content.
	fn set_text(&mut self, node: NodeId, text: &str) -> VizResult<()>;

	/// Remove an element and its whole subtree.
	fn remove(&mut self, node: NodeId) -> VizResult<()>;

	/// Move `children` of `parent` to the end of its child list, in the given
	/// order. Children not listed keep their relative order in front.
	fn order(&mut self, parent: NodeId, children: &[NodeId]) -> VizResult<()>;

	/// [`Surface::set_attr`] for anything that formats as an attribute value.
	fn attr(&mut self, node: NodeId, name: &str, value: impl Display) -> VizResult<()>
	where
		Self: Sized,
	{
		self.set_attr(node, name, &value.to_string())
	}

	/// Create a child element and set its text in one go.
	fn append_text(&mut self, parent: NodeId, kind: ElementKind, text: &str) -> VizResult<NodeId>
	where
		Self: Sized,
	{
		let node = self.create(parent, kind)?;
		self.set_text(node, text)?;
		Ok(node)
	}
}
