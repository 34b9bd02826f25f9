//! A transducer over Σ×Σ: transitions are `(state, pack(x, y), state)` triples.
//!
//! Used for `T` (the one-step relation), for `I×B` pairings (see [`crate::pairing`]), and for
//! "id-transducers" synthesized from a plain [`crate::automaton::Automaton`].

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use tracing::instrument;

use crate::alphabet::AlphabetCodec;
use crate::alphabet::Label;
use crate::alphabet::Symbol;
use crate::transition_store::State;
use crate::transition_store::TransitionStore;

#[derive(Debug, Clone)]
pub struct Transducer {
	initial: State,
	finals: BTreeSet<State>,
	transitions: TransitionStore,
	/// Origin symbols `x` actually used by some transition's label; see [`Transducer::restrict`].
	used_origin_symbols: BTreeSet<Symbol>,
	/// Target symbols `y` actually used by some transition's label; see [`Transducer::restrict`].
	used_target_symbols: BTreeSet<Symbol>,
}

impl Transducer {
	pub fn new(initial: State) -> Self {
		Self {
			initial,
			finals: BTreeSet::new(),
			transitions: TransitionStore::new(),
			used_origin_symbols: BTreeSet::new(),
			used_target_symbols: BTreeSet::new(),
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

	/// Adds `(origin, label, target)`, maintaining the invariant that `used_origin_symbols`
	/// contains `x(label)` and `used_target_symbols` contains `y(label)`.
	pub fn add_transition(&mut self, codec: &AlphabetCodec, origin: State, label: Label, target: State) {
		self.used_origin_symbols.insert(codec.x(label));
		self.used_target_symbols.insert(codec.y(label));
		self.transitions.add(origin, label, target);
	}

	pub fn successors_of(&self, origin: State, label: Label) -> &[State] {
		self.transitions.successors_of(origin, label)
	}

	pub fn transitions_of(&self, origin: State) -> impl Iterator<Item = (Label, State)> + '_ {
		self.transitions.transitions_of(origin)
	}

	pub fn origins(&self) -> impl Iterator<Item = State> + '_ {
		self.transitions.origins()
	}

	pub fn used_origin_symbols(&self) -> &BTreeSet<Symbol> {
		&self.used_origin_symbols
	}

	pub fn used_target_symbols(&self) -> &BTreeSet<Symbol> {
		&self.used_target_symbols
	}

	/// Returns a new transducer containing exactly the transitions of `self` whose label's `x`
	/// lies in `origin_syms` and whose `y` lies in `target_syms`. A state is final in the copy
	/// iff it is final in `self` *and* reached by at least one retained transition.
	#[instrument(skip(self, codec))]
	pub fn restrict(&self, codec: &AlphabetCodec, origin_syms: &BTreeSet<Symbol>, target_syms: &BTreeSet<Symbol>) -> Self {
		let mut copy: Self = Self::new(self.initial);
		let mut reached: BTreeSet<State> = BTreeSet::new();

		for origin in self.origins() {
			for (label, target) in self.transitions_of(origin) {
				if origin_syms.contains(&codec.x(label)) && target_syms.contains(&codec.y(label)) {
					copy.add_transition(codec, origin, label, target);
					reached.insert(target);
				}
			}
		}

		for &state in &self.finals {
			if reached.contains(&state) {
				copy.add_final(state);
			}
		}

		copy
	}

	/// Standard subset construction over Σ×Σ labels. Used only for graphviz dump paths; the
	/// search itself never determinizes `T`, since the step game operates directly on `T`'s
	/// nondeterministic transitions.
	#[instrument(skip(self, codec))]
	pub fn to_dfa(&self, codec: &AlphabetCodec) -> Self {
		let initial_subset: BTreeSet<State> = BTreeSet::from([self.initial]);

		let mut dfa: Self = Self::new(0);
		let mut subset_ids: BTreeMap<BTreeSet<State>, State> = BTreeMap::new();
		subset_ids.insert(initial_subset.clone(), 0);

		let mut work: Vec<BTreeSet<State>> = vec![initial_subset];
		let mut i: usize = 0;
		while i < work.len() {
			let subset: BTreeSet<State> = work[i].clone();
			let subset_id: State = subset_ids[&subset];

			if subset.iter().any(|q| self.is_final(*q)) {
				dfa.add_final(subset_id);
			}

			for (x, y) in codec.pairs() {
				let label: Label = codec.pack(x, y);
				let mut next: BTreeSet<State> = BTreeSet::new();
				for &q in &subset {
					next.extend(self.successors_of(q, label).iter().copied());
				}
				if next.is_empty() {
					continue;
				}
				let next_id: State = *subset_ids.entry(next.clone()).or_insert_with(|| {
					let id: State = work.len();
					work.push(next.clone());
					id
				});
				dfa.add_transition(codec, subset_id, label, next_id);
			}

			i += 1;
		}

		dfa
	}
}
