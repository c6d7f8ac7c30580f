use web_sys::{Document, Element};

use super::{ElementKind, NodeId, SVG_NS, Surface};
use crate::error::{VizError, VizResult};

struct DomSlot {
	element: Element,
	children: Vec<NodeId>,
}

/// [`Surface`] backed by a live `<svg>` element in the page.
///
/// The scene only tracks elements it created itself; anything else already
/// inside the root is left untouched.
pub struct DomScene {
	document: Document,
	slots: Vec<Option<DomSlot>>,
}

impl DomScene {
	/// Wrap an existing `<svg>` element.
	pub fn new(root: Element) -> VizResult<Self> {
		let document = root
			.owner_document()
			.ok_or_else(|| VizError::surface("svg root is not attached to a document"))?;
		Ok(Self {
			document,
			slots: vec![Some(DomSlot {
				element: root,
				children: Vec::new(),
			})],
		})
	}

	/// Remove every element this scene created, leaving the root in place.
	pub fn clear(&mut self) -> VizResult<()> {
		let children = self.slot(self.root())?.children.clone();
		for child in children {
			self.remove(child)?;
		}
		Ok(())
	}

	fn slot(&self, node: NodeId) -> VizResult<&DomSlot> {
		self.slots
			.get(node.0)
			.and_then(Option::as_ref)
			.ok_or_else(|| VizError::surface(format!("unknown element #{}", node.0)))
	}

	fn slot_mut(&mut self, node: NodeId) -> VizResult<&mut DomSlot> {
		self.slots
			.get_mut(node.0)
			.and_then(Option::as_mut)
			.ok_or_else(|| VizError::surface(format!("unknown element #{}", node.0)))
	}

	fn forget(&mut self, node: NodeId) {
		if let Some(slot) = self.slots.get_mut(node.0).and_then(Option::take) {
			for child in slot.children {
				self.forget(child);
			}
		}
	}
}

impl Surface for DomScene {
	fn root(&self) -> NodeId {
		NodeId(0)
	}

	fn create(&mut self, parent: NodeId, kind: ElementKind) -> VizResult<NodeId> {
		let element = self.document.create_element_ns(Some(SVG_NS), kind.tag())?;
		self.slot(parent)?.element.append_child(&element)?;
		let id = NodeId(self.slots.len());
		self.slot_mut(parent)?.children.push(id);
		self.slots.push(Some(DomSlot {
			element,
			children: Vec::new(),
		}));
		Ok(id)
	}

	fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> VizResult<()> {
		self.slot(node)?.element.set_attribute(name, value)?;
		Ok(())
	}

	fn set_text(&mut self, node: NodeId, text: &str) -> VizResult<()> {
		let slot = self.slot_mut(node)?;
		slot.element.set_text_content(Some(text));
		let children = std::mem::take(&mut slot.children);
		for child in children {
			self.forget(child);
		}
		Ok(())
	}

	fn remove(&mut self, node: NodeId) -> VizResult<()> {
		if node == self.root() {
			return Err(VizError::surface("cannot remove the root element"));
		}
		self.slot(node)?.element.remove();
		for slot in self.slots.iter_mut().flatten() {
			slot.children.retain(|&c| c != node);
		}
		self.forget(node);
		Ok(())
	}

	fn order(&mut self, parent: NodeId, children: &[NodeId]) -> VizResult<()> {
		let parent_el = self.slot(parent)?.element.clone();
		for &child in children {
			// Re-appending an attached node moves it to the end.
			parent_el.append_child(&self.slot(child)?.element)?;
		}
		let slot = self.slot_mut(parent)?;
		slot.children.retain(|c| !children.contains(c));
		slot.children.extend_from_slice(children);
		Ok(())
	}
}
