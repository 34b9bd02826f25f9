//! Indexed transition relation: `(state, label) -> successors`, with iteration by origin
//! in insertion order. Labels are opaque `u32`s to the store; callers decide whether they are
//! plain symbols (for [`crate::automaton::Automaton`]) or packed `(x, y)` pairs (for
//! [`crate::transducer::Transducer`]).

use std::collections::BTreeMap;

pub type State = usize;

#[derive(Debug, Clone, Default)]
pub struct TransitionStore {
	/// Per-origin transitions in insertion order, as stored; used by [`TransitionStore::transitions_of`].
	by_origin: BTreeMap<State, Vec<(u32, State)>>,
	/// Per-(origin, label) successor index, used by [`TransitionStore::successors_of`].
	index: BTreeMap<(State, u32), Vec<State>>,
}

impl TransitionStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds `(origin, label, target)`. Does not deduplicate — callers that need set semantics
	/// (e.g. [`crate::pairing`]) must check [`TransitionStore::successors_of`] before inserting.
	pub fn add(&mut self, origin: State, label: u32, target: State) {
		self.by_origin.entry(origin).or_default().push((label, target));
		self.index.entry((origin, label)).or_default().push(target);
	}

	pub fn successors_of(&self, origin: State, label: u32) -> &[State] {
		self.index.get(&(origin, label)).map_or(&[], Vec::as_slice)
	}

	/// Iterates `(label, target)` pairs for `origin`, in insertion order.
	pub fn transitions_of(&self, origin: State) -> impl Iterator<Item = (u32, State)> + '_ {
		self.by_origin.get(&origin).into_iter().flatten().copied()
	}

	/// Every origin state that has at least one outgoing transition.
	pub fn origins(&self) -> impl Iterator<Item = State> + '_ {
		self.by_origin.keys().copied()
	}
}
