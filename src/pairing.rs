//! Synchronous product of two plain automata (I and a property B) into a transducer I×B.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use tracing::debug;
use tracing::instrument;

use crate::alphabet::AlphabetCodec;
use crate::automaton::Automaton;
use crate::transducer::Transducer;
use crate::transition_store::State;

/// Pairs `a` and `b` over `codec`, producing a transducer whose states are the reachable pairs
/// `(q_a, q_b)`, renumbered densely from `0` in BFS-discovery order.
///
/// For each pair popped off the BFS queue, every combination of an `a`-transition `(q_a, x, p_a)`
/// and a `b`-transition `(q_b, y, p_b)` from that pair contributes a transition labeled
/// `pack(x, y)`, deduplicated on successor identity under that label. A pair state is final iff
/// both components are final.
#[instrument(skip(codec, a, b))]
pub fn pair(codec: &AlphabetCodec, a: &Automaton, b: &Automaton) -> Transducer {
	let initial_pair: (State, State) = (a.initial(), b.initial());

	let mut ids: BTreeMap<(State, State), State> = BTreeMap::new();
	ids.insert(initial_pair, 0);
	let mut queue: Vec<(State, State)> = vec![initial_pair];

	let mut transducer: Transducer = Transducer::new(0);
	if a.is_final(initial_pair.0) && b.is_final(initial_pair.1) {
		transducer.add_final(0);
	}

	let mut i: usize = 0;
	while i < queue.len() {
		let (q_a, q_b): (State, State) = queue[i];
		let origin_id: State = ids[&(q_a, q_b)];

		for (x, p_a) in a.transitions_of(q_a) {
			for (y, p_b) in b.transitions_of(q_b) {
				let label = codec.pack(x, y);
				let target_pair: (State, State) = (p_a, p_b);

				if transducer
					.successors_of(origin_id, label)
					.iter()
					.any(|&s| ids.get(&target_pair) == Some(&s))
				{
					continue;
				}

				let target_id: State = *ids.entry(target_pair).or_insert_with(|| {
					let id: State = queue.len();
					queue.push(target_pair);
					id
				});

				if a.is_final(target_pair.0) && b.is_final(target_pair.1) {
					transducer.add_final(target_id);
				}

				debug!(origin_id, x, y, target_id, "pairing transition");
				transducer.add_transition(codec, origin_id, label, target_id);
			}
		}

		i += 1;
	}

	transducer
}

/// Builds a diagonal ("id-transducer") from a plain automaton: every transition `(q, x, p)`
/// becomes `(q, pack(x, x), p)`. Used when a standalone `Automaton` (I or B alone) must be fed
/// somewhere a `Transducer` is expected.
pub fn id_transducer(codec: &AlphabetCodec, a: &Automaton) -> Transducer {
	let mut t: Transducer = Transducer::new(a.initial());
	for state in a.finals() {
		t.add_final(state);
	}

	let mut origins: BTreeSet<State> = BTreeSet::new();
	origins.insert(a.initial());
	// transitions_of only needs to be called per known origin; collect all origins first.
	let mut frontier: Vec<State> = vec![a.initial()];
	let mut seen: BTreeSet<State> = BTreeSet::from([a.initial()]);
	while let Some(q) = frontier.pop() {
		for (x, p) in a.transitions_of(q) {
			t.add_transition(codec, q, codec.pack(x, x), p);
			if seen.insert(p) {
				frontier.push(p);
			}
		}
	}

	t
}

#[cfg(test)]
mod test {
	use super::*;

	fn two_state_even_ones(codec: &AlphabetCodec) -> Automaton {
		// Accepts words over {0,1} with an even number of 1s.
		let mut a: Automaton = Automaton::new(0);
		a.add_final(0);
		a.add_transition(0, 0, 0);
		a.add_transition(0, 1, 1);
		a.add_transition(1, 0, 1);
		a.add_transition(1, 1, 0);
		a
	}

	fn accepts_any(codec: &AlphabetCodec) -> Automaton {
		let mut b: Automaton = Automaton::new(0);
		b.add_final(0);
		for sym in codec.symbols() {
			b.add_transition(0, sym, 0);
		}
		b
	}

	#[test]
	fn pair_initial_state_final_when_both_final() {
		let codec: AlphabetCodec = AlphabetCodec::new(vec!["0".into(), "1".into()]);
		let a: Automaton = two_state_even_ones(&codec);
		let b: Automaton = accepts_any(&codec);
		let t: Transducer = pair(&codec, &a, &b);
		assert!(t.is_final(t.initial()));
	}

	#[test]
	fn pair_deduplicates_successor_under_same_label() {
		let codec: AlphabetCodec = AlphabetCodec::new(vec!["0".into(), "1".into()]);
		let a: Automaton = two_state_even_ones(&codec);
		let b: Automaton = accepts_any(&codec);
		let t: Transducer = pair(&codec, &a, &b);
		// label pack(0,0) should lead to exactly one successor from the initial pair state.
		assert_eq!(t.successors_of(t.initial(), codec.pack(0, 0)).len(), 1);
	}

	#[test]
	fn id_transducer_is_diagonal() {
		let codec: AlphabetCodec = AlphabetCodec::new(vec!["0".into(), "1".into()]);
		let a: Automaton = two_state_even_ones(&codec);
		let t: Transducer = id_transducer(&codec, &a);
		assert_eq!(t.successors_of(0, codec.pack(1, 1)), &[1]);
		assert!(t.successors_of(0, codec.pack(1, 0)).is_empty());
	}
}
