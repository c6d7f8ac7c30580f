use std::fmt::Write as _;

use super::{ElementKind, NodeId, Surface};
use crate::error::{VizError, VizResult};

#[derive(Clone, Debug)]
struct Slot {
	kind: ElementKind,
	parent: Option<NodeId>,
	attrs: Vec<(String, String)>,
	text: Option<String>,
	children: Vec<NodeId>,
}

impl Slot {
	fn new(kind: ElementKind, parent: Option<NodeId>) -> Self {
		Self {
			kind,
			parent,
			attrs: Vec::new(),
			text: None,
			children: Vec::new(),
		}
	}
}

/// In-memory scene graph rooted at an `<svg>` element.
///
/// Slots are never reused, so a stale [`NodeId`] reports an error instead of
/// silently addressing a newer element.
#[derive(Clone, Debug)]
pub struct MemoryScene {
	slots: Vec<Option<Slot>>,
}

impl Default for MemoryScene {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryScene {
	pub fn new() -> Self {
		Self {
			slots: vec![Some(Slot::new(ElementKind::Svg, None))],
		}
	}

	fn slot(&self, node: NodeId) -> VizResult<&Slot> {
		self.slots
			.get(node.0)
			.and_then(Option::as_ref)
			.ok_or_else(|| VizError::surface(format!("unknown element #{}", node.0)))
	}

	fn slot_mut(&mut self, node: NodeId) -> VizResult<&mut Slot> {
		self.slots
			.get_mut(node.0)
			.and_then(Option::as_mut)
			.ok_or_else(|| VizError::surface(format!("unknown element #{}", node.0)))
	}

	/// Number of live elements, root included.
	pub fn len(&self) -> usize {
		self.slots.iter().filter(|s| s.is_some()).count()
	}

	/// Whether only the root is left.
	pub fn is_empty(&self) -> bool {
		self.len() <= 1
	}

	pub fn contains(&self, node: NodeId) -> bool {
		self.slot(node).is_ok()
	}

	pub fn kind(&self, node: NodeId) -> Option<ElementKind> {
		self.slot(node).ok().map(|s| s.kind)
	}

	/// Attribute value, if set.
	pub fn get_attr(&self, node: NodeId, name: &str) -> Option<&str> {
		self.slot(node)
			.ok()?
			.attrs
			.iter()
			.find(|(k, _)| k == name)
			.map(|(_, v)| v.as_str())
	}

	pub fn text(&self, node: NodeId) -> Option<&str> {
		self.slot(node).ok()?.text.as_deref()
	}

	pub fn children(&self, node: NodeId) -> &[NodeId] {
		self.slot(node).map(|s| s.children.as_slice()).unwrap_or(&[])
	}

	/// Every live element of `kind`, in document order.
	pub fn find_all(&self, kind: ElementKind) -> Vec<NodeId> {
		let mut found = Vec::new();
		self.walk(self.root(), &mut |id, slot| {
			if slot.kind == kind {
				found.push(id);
			}
		});
		found
	}

	fn walk(&self, node: NodeId, visit: &mut impl FnMut(NodeId, &Slot)) {
		if let Ok(slot) = self.slot(node) {
			visit(node, slot);
			for &child in &slot.children {
				self.walk(child, visit);
			}
		}
	}

	/// Serialize the tree as SVG markup.
	pub fn to_svg(&self) -> String {
		let mut out = String::new();
		self.write_node(self.root(), &mut out);
		out
	}

	fn write_node(&self, node: NodeId, out: &mut String) {
		let Ok(slot) = self.slot(node) else {
			return;
		};
		let tag = slot.kind.tag();
		let _ = write!(out, "<{tag}");
		if slot.kind == ElementKind::Svg && slot.parent.is_none() {
			let _ = write!(out, " xmlns=\"{}\"", super::SVG_NS);
		}
		for (name, value) in &slot.attrs {
			let _ = write!(out, " {name}=\"{}\"", escape(value));
		}
		if slot.children.is_empty() && slot.text.is_none() {
			out.push_str("/>");
			return;
		}
		out.push('>');
		if let Some(text) = &slot.text {
			out.push_str(&escape(text));
		}
		for &child in &slot.children {
			self.write_node(child, out);
		}
		let _ = write!(out, "</{tag}>");
	}
}

fn escape(raw: &str) -> String {
	let mut escaped = String::with_capacity(raw.len());
	for c in raw.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			_ => escaped.push(c),
		}
	}
	escaped
}

impl Surface for MemoryScene {
	fn root(&self) -> NodeId {
		NodeId(0)
	}

	fn create(&mut self, parent: NodeId, kind: ElementKind) -> VizResult<NodeId> {
		let id = NodeId(self.slots.len());
		self.slot_mut(parent)?.children.push(id);
		self.slots.push(Some(Slot::new(kind, Some(parent))));
		Ok(id)
	}

	fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> VizResult<()> {
		let slot = self.slot_mut(node)?;
		match slot.attrs.iter_mut().find(|(k, _)| k == name) {
			Some((_, v)) => *v = value.to_owned(),
			None => slot.attrs.push((name.to_owned(), value.to_owned())),
		}
		Ok(())
	}

	fn set_text(&mut self, node: NodeId, text: &str) -> VizResult<()> {
		let slot = self.slot_mut(node)?;
		slot.text = Some(text.to_owned());
		// Text content replaces child elements, as in the DOM.
		let children = std::mem::take(&mut slot.children);
		for child in children {
			self.drop_subtree(child);
		}
		Ok(())
	}

	fn remove(&mut self, node: NodeId) -> VizResult<()> {
		if node == self.root() {
			return Err(VizError::surface("cannot remove the root element"));
		}
		let parent = self.slot(node)?.parent;
		if let Some(parent) = parent {
			if let Ok(p) = self.slot_mut(parent) {
				p.children.retain(|&c| c != node);
			}
		}
		self.drop_subtree(node);
		Ok(())
	}

	fn order(&mut self, parent: NodeId, children: &[NodeId]) -> VizResult<()> {
		let slot = self.slot_mut(parent)?;
		if let Some(stray) = children.iter().find(|c| !slot.children.contains(c)) {
			return Err(VizError::surface(format!(
				"element #{} is not a child of #{}",
				stray.0, parent.0
			)));
		}
		slot.children.retain(|c| !children.contains(c));
		slot.children.extend_from_slice(children);
		Ok(())
	}
}

impl MemoryScene {
	fn drop_subtree(&mut self, node: NodeId) {
		if let Some(slot) = self.slots.get_mut(node.0).and_then(Option::take) {
			for child in slot.children {
				self.drop_subtree(child);
			}
		}
	}
}
