//! A plain finite automaton over Σ: transitions are `(state, symbol, state)` triples.
//!
//! This is the representation used for `I` and each property `B` as loaded from a benchmark,
//! before [`crate::pairing::pair`] turns a pair of them into a transducer.

use std::collections::BTreeSet;

use crate::alphabet::Symbol;
use crate::transition_store::State;
use crate::transition_store::TransitionStore;

#[derive(Debug, Clone)]
pub struct Automaton {
	initial: State,
	finals: BTreeSet<State>,
	transitions: TransitionStore,
}

impl Automaton {
	pub fn new(initial: State) -> Self {
		Self {
			initial,
			finals: BTreeSet::new(),
			transitions: TransitionStore::new(),
		}
	}

	pub fn initial(&self) -> State {
		self.initial
	}

	pub fn add_final(&mut self, state: State) {
		self.finals.insert(state);
	}

	pub fn is_final(&self, state: State) -> bool {
		self.finals.contains(&state)
	}

	pub fn finals(&self) -> impl Iterator<Item = State> + '_ {
		self.finals.iter().copied()
	}

	pub fn add_transition(&mut self, origin: State, symbol: Symbol, target: State) {
		self.transitions.add(origin, symbol, target);
	}

	pub fn transitions_of(&self, origin: State) -> impl Iterator<Item = (Symbol, State)> + '_ {
		self.transitions.transitions_of(origin)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn basic_construction() {
		let mut a: Automaton = Automaton::new(0);
		a.add_final(1);
		a.add_transition(0, 2, 1);
		a.add_transition(1, 2, 1);

		assert_eq!(a.initial(), 0);
		assert!(a.is_final(1));
		assert!(!a.is_final(0));
		assert_eq!(a.transitions_of(0).collect::<Vec<_>>(), vec![(2, 1)]);
		assert_eq!(a.transitions_of(1).collect::<Vec<_>>(), vec![(2, 1)]);
	}
}
