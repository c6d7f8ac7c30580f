use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use log::{debug, warn};

use super::{ElementKind, NodeId, Surface};
use crate::error::VizResult;

/// What a single [`Join::reconcile`] pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JoinStats {
	/// Keys that got a new element.
	pub entered: usize,
	/// Keys that kept their element, duplicates included.
	pub updated: usize,
	/// Keys whose element was dropped.
	pub exited: usize,
}

/// Keyed data join: one element of `kind` under `parent` per distinct key.
///
/// The join owns the key → element mapping for its elements. Keep the same
/// `Join` around between passes; a fresh one sees everything as entering.
#[derive(Debug)]
pub struct Join<K> {
	parent: NodeId,
	kind: ElementKind,
	elements: HashMap<K, NodeId>,
	keys: Vec<K>,
}

impl<K> Join<K>
where
	K: Eq + Hash + Clone + Debug,
{
	/// An empty join that will create `kind` elements under `parent`.
	pub fn new(parent: NodeId, kind: ElementKind) -> Self {
		Self {
			parent,
			kind,
			elements: HashMap::new(),
			keys: Vec::new(),
		}
	}

	/// Number of bound keys.
	pub fn len(&self) -> usize {
		self.keys.len()
	}

	pub fn is_empty(&self) -> bool {
		self.keys.is_empty()
	}

	/// Element currently bound to `key`.
	pub fn get(&self, key: &K) -> Option<NodeId> {
		self.elements.get(key).copied()
	}

	/// Bound keys in the order of the last pass.
	pub fn keys(&self) -> &[K] {
		&self.keys
	}

	/// Bring the surface in line with `items`.
	///
	/// New keys get a fresh element and `initialize`; known keys keep their
	/// element and get `update`; keys missing from `items` have their element
	/// removed. Both callbacks receive the item's index in `items`, and every
	/// bound element is re-ordered to follow `items` afterwards.
	pub fn reconcile<S, T, F, I, U>(
		&mut self,
		surface: &mut S,
		items: &[T],
		key: F,
		mut initialize: I,
		mut update: U,
	) -> VizResult<JoinStats>
	where
		S: Surface,
		F: Fn(&T) -> K,
		I: FnMut(&mut S, NodeId, &T, usize) -> VizResult<()>,
		U: FnMut(&mut S, NodeId, &T, usize) -> VizResult<()>,
	{
		let mut stats = JoinStats::default();
		let mut next: HashMap<K, NodeId> = HashMap::with_capacity(items.len());
		let mut next_keys = Vec::with_capacity(items.len());
		let mut nodes = Vec::with_capacity(items.len());

		let bound = items.iter().enumerate().try_for_each(|(index, item)| {
			let k = key(item);
			if let Some(&node) = next.get(&k) {
				warn!("duplicate join key {k:?} at index {index}");
				stats.updated += 1;
				return update(surface, node, item, index);
			}
			let existing = self.elements.get(&k).copied();
			let node = match existing {
				Some(node) => node,
				None => surface.create(self.parent, self.kind)?,
			};
			next.insert(k.clone(), node);
			next_keys.push(k);
			nodes.push(node);
			match existing {
				Some(_) => {
					stats.updated += 1;
					update(surface, node, item, index)
				}
				None => {
					stats.entered += 1;
					initialize(surface, node, item, index)
				}
			}
		});

		if let Err(err) = bound {
			// Keep tracking whatever was created so a later pass can clean it up.
			for k in next_keys {
				if !self.elements.contains_key(&k) {
					if let Some(&node) = next.get(&k) {
						self.elements.insert(k.clone(), node);
						self.keys.push(k);
					}
				}
			}
			return Err(err);
		}

		let previous = std::mem::replace(&mut self.elements, next);
		let previous_keys = std::mem::replace(&mut self.keys, next_keys);
		for k in &previous_keys {
			if self.elements.contains_key(k) {
				continue;
			}
			let Some(&node) = previous.get(k) else {
				continue;
			};
			// An element removed behind the join's back is already gone.
			if let Err(err) = surface.remove(node) {
				warn!("exiting key {k:?} had no element to remove: {err}");
			}
			stats.exited += 1;
		}

		surface.order(self.parent, &nodes)?;

		debug!(
			"join <{}>: +{} ~{} -{}",
			self.kind.tag(),
			stats.entered,
			stats.updated,
			stats.exited
		);
		Ok(stats)
	}
}
