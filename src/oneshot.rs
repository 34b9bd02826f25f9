//! The Oneshot search: on-the-fly exploration of `I×B × ColumnAutomaton`, looking for a joint
//! state that is final in `I×B` and whose every column member is final in `T`.

use std::collections::BTreeSet;
use std::collections::VecDeque;

use tracing::info;
use tracing::instrument;

use crate::alphabet::AlphabetCodec;
use crate::cancellation::CancellationToken;
use crate::column::Column;
use crate::step_cache::StepCache;
use crate::step_game::GameState;
use crate::step_game::GeneratorKind;
use crate::step_game::StepGame;
use crate::transducer::Transducer;
use crate::transition_store::State;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTraversal {
	Dfs,
	Bfs,
}

/// The CLI-level search strategy. `MinSigmaDisprove` restricts `T` to the symbols actually used
/// by `I×B` before searching; a witness found under restriction is still a valid disproof, but
/// absence of one does not imply the property holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
	Dfs,
	Bfs,
	MinSigmaDisprove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointState {
	pub ixb_state: State,
	pub column: Column,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
	pub explored_states: u64,
	pub explored_transitions: u64,
	pub cache_hits: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
	Found { witness: JointState, counters: Counters },
	Exhausted { counters: Counters },
	TimedOut { counters: Counters },
}

impl SearchOutcome {
	pub fn counters(&self) -> Counters {
		match self {
			Self::Found { counters, .. } | Self::Exhausted { counters } | Self::TimedOut { counters } => *counters,
		}
	}

	pub fn is_found(&self) -> bool {
		matches!(self, Self::Found { .. })
	}
}

pub struct OneshotSearch<'a> {
	codec: &'a AlphabetCodec,
	ixb: &'a Transducer,
	transducer: &'a Transducer,
	generator: StepGame,
}

impl<'a> OneshotSearch<'a> {
	pub fn new(codec: &'a AlphabetCodec, ixb: &'a Transducer, transducer: &'a Transducer, generator: StepGame) -> Self {
		Self { codec, ixb, transducer, generator }
	}

	fn column_all_final(&self, column: &Column) -> bool {
		column.iter().all(|state| self.transducer.is_final(state))
	}

	fn is_witness(&self, joint: &JointState) -> bool {
		self.ixb.is_final(joint.ixb_state) && self.column_all_final(&joint.column)
	}

	#[instrument(skip(self, cache, cancellation))]
	pub fn run(&self, traversal: SearchTraversal, cache: &mut StepCache, cancellation: &CancellationToken) -> SearchOutcome {
		let initial: JointState = JointState { ixb_state: self.ixb.initial(), column: Column::singleton(self.transducer.initial()) };

		let mut counters: Counters = Counters::default();
		let mut visited: BTreeSet<(State, Column)> = BTreeSet::new();
		visited.insert((initial.ixb_state, initial.column.clone()));
		counters.explored_states += 1;

		if self.is_witness(&initial) {
			info!("witness found at joint initial state");
			return SearchOutcome::Found { witness: initial, counters };
		}

		let mut stack: Vec<JointState> = Vec::new();
		let mut queue: VecDeque<JointState> = VecDeque::new();
		match traversal {
			SearchTraversal::Dfs => stack.push(initial),
			SearchTraversal::Bfs => queue.push_back(initial),
		}

		loop {
			if cancellation.is_cancelled() {
				return SearchOutcome::TimedOut { counters };
			}

			let current: JointState = match traversal {
				SearchTraversal::Dfs => match stack.pop() {
					Some(state) => state,
					None => return SearchOutcome::Exhausted { counters },
				},
				SearchTraversal::Bfs => match queue.pop_front() {
					Some(state) => state,
					None => return SearchOutcome::Exhausted { counters },
				},
			};

			for (label, next_ixb) in self.ixb.transitions_of(current.ixb_state) {
				let removed_to_symbol = self.codec.y(label);
				let removed_symbol = self.codec.x(label);
				let g0: GameState = GameState::initial(removed_to_symbol, self.codec.full_sigma_bitmap());

				for to_column in
					self.generator.run(self.codec, self.transducer, cache, &current.column, removed_symbol, g0, cancellation)
				{
					counters.explored_transitions += 1;
					counters.cache_hits = cache.hits();

					let next: JointState = JointState { ixb_state: next_ixb, column: to_column };
					if visited.insert((next.ixb_state, next.column.clone())) {
						counters.explored_states += 1;

						if self.is_witness(&next) {
							info!(explored_states = counters.explored_states, "witness found");
							return SearchOutcome::Found { witness: next, counters };
						}

						match traversal {
							SearchTraversal::Dfs => stack.push(next),
							SearchTraversal::Bfs => queue.push_back(next),
						}
					}
				}
			}
		}
	}
}

/// Entry point matching the CLI surface's three-way strategy choice: plain DFS, plain BFS, or
/// DFS over a `T` restricted to the symbols `I×B` actually uses.
pub fn search(
	codec: &AlphabetCodec,
	ixb: &Transducer,
	transducer: &Transducer,
	strategy: SearchStrategy,
	generator_kind: GeneratorKind,
	ignore_ambiguous: bool,
	cancellation: &CancellationToken,
) -> SearchOutcome {
	let restricted: Transducer;
	let (effective_transducer, traversal): (&Transducer, SearchTraversal) = match strategy {
		SearchStrategy::Dfs => (transducer, SearchTraversal::Dfs),
		SearchStrategy::Bfs => (transducer, SearchTraversal::Bfs),
		SearchStrategy::MinSigmaDisprove => {
			restricted = transducer.restrict(codec, ixb.used_origin_symbols(), ixb.used_target_symbols());
			(&restricted, SearchTraversal::Dfs)
		}
	};

	let generator: StepGame = StepGame::new(generator_kind, ignore_ambiguous);
	let search: OneshotSearch = OneshotSearch::new(codec, ixb, effective_transducer, generator);
	let mut cache: StepCache = StepCache::new();
	search.run(traversal, &mut cache, cancellation)
}
