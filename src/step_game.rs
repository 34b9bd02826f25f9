//! The step game: a lazily-consumed generator of to-columns that "win" a game played over a
//! from-column `c`, a removed symbol `v`, and an initial game state.
//!
//! Exploration is organized as a table of [`Node`]s linked by `parent` indices rather than native
//! recursion, since recursion depth here is bounded only by the longest strictly-progressing
//! chain of game states, which is not statically bounded (see SPEC_FULL.md §9). A node is
//! *expanded* when popped from the [`Frontier`] (checking the incoming to-column against
//! `global_visited`, then the [`crate::step_cache::StepCache`], then the win condition, then its
//! own candidate children) and *finalized*, bubbling its accumulated winner buffer up to its
//! parent and writing a cache entry, once its last child finalizes. This dependency-counted
//! finalization is independent of push/pop order, which is what lets [`GeneratorKind::SimpleDfs`]
//! and [`GeneratorKind::CachedDfs`] share a LIFO [`Frontier::Stack`] while
//! [`GeneratorKind::BufferedBfs`] uses a FIFO [`Frontier::Queue`] — a genuine level-order
//! traversal, not an alias of cached DFS.
//!
//! [`StepGameIter`] is a true pull producer: each [`Iterator::next`] call expands exactly as many
//! nodes as needed to surface one winner (or exhaust the frontier), checking the supplied
//! [`CancellationToken`] before every expansion. `OneshotSearch` can stop pulling after the first
//! witness, and a long-running invocation can be aborted mid-generator, not only between
//! joint-state expansions.

use std::collections::BTreeSet;
use std::collections::VecDeque;

use crate::alphabet::absent;
use crate::alphabet::refine;
use crate::alphabet::AlphabetCodec;
use crate::alphabet::Symbol;
use crate::cancellation::CancellationToken;
use crate::column::Column;
use crate::step_cache::StepCache;
use crate::transducer::Transducer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
	SimpleDfs,
	CachedDfs,
	BufferedBfs,
}

/// `G = <ℓ, I, d'>`: cursor into the from-column, separator bitmap, and append count.
///
/// `d'` increments whenever a candidate transition appends a genuinely new state to the to-column
/// (the target is not already in it), not when it reuses one already present — matching the
/// upstream `Triple`'s `d_p` update (`(1, 0)[p in c2]`), which increments on append. A cousin of
/// this struct that instead increments on *reuse* makes the progress guard in [`candidates`]
/// non-terminating, since repeatedly reusing an already-present state would never change `d'`
/// under that reading while still (wrongly) counting as "no progress" under this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
	pub cursor: usize,
	pub separator: u64,
	pub append_count: usize,
}

impl GameState {
	pub fn initial(removed_to_symbol: Symbol, full_sigma: u64) -> Self {
		Self { cursor: 0, separator: refine(full_sigma, removed_to_symbol), append_count: 0 }
	}
}

#[derive(Debug, Clone, Copy)]
pub struct StepGame {
	pub kind: GeneratorKind,
	pub ignore_ambiguous: bool,
}

impl StepGame {
	pub fn new(kind: GeneratorKind, ignore_ambiguous: bool) -> Self {
		Self { kind, ignore_ambiguous }
	}

	/// Builds a lazy producer of every winning to-column for `(from_column, [], v, g0)`, in
	/// discovery order. `cancellation` is polled before each node expansion; a cancelled token
	/// ends the iterator early with no further yields.
	pub fn run<'a>(
		&self,
		codec: &'a AlphabetCodec,
		transducer: &'a Transducer,
		cache: &'a mut StepCache,
		from_column: &Column,
		removed_symbol: Symbol,
		g0: GameState,
		cancellation: &CancellationToken,
	) -> StepGameIter<'a> {
		let root: Node = Node {
			d: Column::new(),
			g: g0,
			parent: None,
			buffer: Vec::new(),
			pending_children: 0,
			cacheable: false,
		};

		let mut frontier: Frontier = Frontier::new(self.kind);
		frontier.push_root(0);

		StepGameIter {
			kind: self.kind,
			ignore_ambiguous: self.ignore_ambiguous,
			codec,
			transducer,
			cache,
			from_column: from_column.clone(),
			removed_symbol,
			cancellation: cancellation.clone(),
			global_visited: Vec::new(),
			nodes: vec![root],
			frontier,
			pending: VecDeque::new(),
			done: false,
		}
	}
}

struct Node {
	d: Column,
	g: GameState,
	parent: Option<usize>,
	/// Winners reachable from this node's own subtree, bubbled to `parent` on finalization.
	buffer: Vec<Column>,
	pending_children: usize,
	/// Whether this node should write its own cache entry on finalization — false for nodes that
	/// short-circuited on an already-visited to-column or a cache hit, matching the upstream
	/// generator's early `return` before it reaches its own `cache.add_entry` call.
	cacheable: bool,
}

/// The work list driving node expansion, in either LIFO (DFS) or FIFO (BFS) order.
enum Frontier {
	Stack(Vec<usize>),
	Queue(VecDeque<usize>),
}

impl Frontier {
	fn new(kind: GeneratorKind) -> Self {
		match kind {
			GeneratorKind::BufferedBfs => Self::Queue(VecDeque::new()),
			GeneratorKind::SimpleDfs | GeneratorKind::CachedDfs => Self::Stack(Vec::new()),
		}
	}

	fn push_root(&mut self, id: usize) {
		match self {
			Self::Stack(stack) => stack.push(id),
			Self::Queue(queue) => queue.push_back(id),
		}
	}

	/// Schedules a node's freshly-created children. For the stack, pushed in reverse so the
	/// first child is popped (and its whole subtree explored) before its siblings, matching the
	/// left-to-right recursion order of the original DFS generator.
	fn push_children(&mut self, ids: &[usize]) {
		match self {
			Self::Stack(stack) => stack.extend(ids.iter().rev().copied()),
			Self::Queue(queue) => queue.extend(ids.iter().copied()),
		}
	}

	fn pop(&mut self) -> Option<usize> {
		match self {
			Self::Stack(stack) => stack.pop(),
			Self::Queue(queue) => queue.pop_front(),
		}
	}
}

pub struct StepGameIter<'a> {
	kind: GeneratorKind,
	ignore_ambiguous: bool,
	codec: &'a AlphabetCodec,
	transducer: &'a Transducer,
	cache: &'a mut StepCache,
	from_column: Column,
	removed_symbol: Symbol,
	cancellation: CancellationToken,
	/// To-columns already yielded during this generator invocation (the `visited` accumulator of
	/// SPEC_FULL.md §4.5), checked at the start of every node's expansion.
	global_visited: Vec<Column>,
	nodes: Vec<Node>,
	frontier: Frontier,
	pending: VecDeque<Column>,
	done: bool,
}

impl<'a> StepGameIter<'a> {
	fn expand(&mut self, node_id: usize) {
		let d: Column = self.nodes[node_id].d.clone();
		let g: GameState = self.nodes[node_id].g;

		if self.global_visited.contains(&d) {
			self.finalize(node_id);
			return;
		}

		let use_cache: bool = self.kind != GeneratorKind::SimpleDfs;
		if use_cache {
			if let Some(cached) = self.cache.get(&self.from_column, g.cursor, g.separator, self.removed_symbol, &d) {
				let winners: Vec<Column> = cached.to_vec();
				for winner in &winners {
					self.pending.push_back(winner.clone());
				}
				self.nodes[node_id].buffer = winners;
				self.finalize(node_id);
				return;
			}
		}

		if g.cursor == self.from_column.len() && absent(g.separator, self.removed_symbol) {
			self.global_visited.push(d.clone());
			self.pending.push_back(d.clone());
			self.nodes[node_id].buffer.push(d.clone());
		}

		let children: Vec<(Column, GameState)> =
			candidates(self.codec, self.transducer, &self.from_column, &d, g, self.removed_symbol, self.ignore_ambiguous);
		self.nodes[node_id].cacheable = use_cache;

		if children.is_empty() {
			self.finalize(node_id);
			return;
		}

		self.nodes[node_id].pending_children = children.len();
		let mut child_ids: Vec<usize> = Vec::with_capacity(children.len());
		for (child_d, child_g) in children {
			let child_id: usize = self.nodes.len();
			self.nodes.push(Node {
				d: child_d,
				g: child_g,
				parent: Some(node_id),
				buffer: Vec::new(),
				pending_children: 0,
				cacheable: false,
			});
			child_ids.push(child_id);
		}
		self.frontier.push_children(&child_ids);
	}

	/// Bubbles a fully-expanded node's buffer to its parent, writing a cache entry first if the
	/// node earned one, and cascades upward through any ancestor whose last child just finished.
	fn finalize(&mut self, node_id: usize) {
		let mut current: usize = node_id;
		loop {
			if self.nodes[current].cacheable {
				let d: Column = self.nodes[current].d.clone();
				let g: GameState = self.nodes[current].g;
				let buffer: Vec<Column> = self.nodes[current].buffer.clone();
				self.cache.insert(self.from_column.clone(), g.cursor, g.separator, self.removed_symbol, d, buffer);
			}

			match self.nodes[current].parent {
				None => break,
				Some(parent_id) => {
					let contribution: Vec<Column> = std::mem::take(&mut self.nodes[current].buffer);
					self.nodes[parent_id].buffer.extend(contribution);
					self.nodes[parent_id].pending_children -= 1;
					if self.nodes[parent_id].pending_children == 0 {
						current = parent_id;
					} else {
						break;
					}
				}
			}
		}
	}
}

impl<'a> Iterator for StepGameIter<'a> {
	type Item = Column;

	fn next(&mut self) -> Option<Column> {
		loop {
			if let Some(winner) = self.pending.pop_front() {
				return Some(winner);
			}
			if self.done {
				return None;
			}
			if self.cancellation.is_cancelled() {
				self.done = true;
				return None;
			}
			match self.frontier.pop() {
				Some(node_id) => self.expand(node_id),
				None => self.done = true,
			}
		}
	}
}

/// The expansion rule: for every origin state `q` in the covered prefix of `from_column` and
/// every `T`-transition out of `q`, produce the next partial to-column and game state, pruning
/// transitions that reintroduce the removed symbol `y`, that make no progress (`G_next == G`),
/// and — under `ignore_ambiguous` — transitions that share a `(cursor, separator, to-column)`
/// fingerprint with one already produced at this level.
///
/// The cursor advances past the newest covered element of `from_column`; reusing an earlier
/// element never advances it.
fn candidates(
	codec: &AlphabetCodec,
	transducer: &Transducer,
	from_column: &Column,
	d: &Column,
	g: GameState,
	removed_symbol: Symbol,
	ignore_ambiguous: bool,
) -> Vec<(Column, GameState)> {
	let mut out: Vec<(Column, GameState)> = Vec::new();
	if from_column.is_empty() {
		return out;
	}

	let prefix_end: usize = g.cursor.min(from_column.len() - 1);
	let mut next_marked: BTreeSet<(usize, u64, Column)> = BTreeSet::new();

	for q_idx in 0..=prefix_end {
		let q = from_column.as_slice()[q_idx];
		for (label, p) in transducer.transitions_of(q) {
			let x = codec.x(label);
			let y = codec.y(label);
			if !absent(g.separator, y) {
				continue;
			}

			let already_in_d: bool = d.contains(p);
			let d_next: Column = d.pushed(p);
			let cursor_next: usize = if q_idx == g.cursor { g.cursor + 1 } else { g.cursor };
			let g_next: GameState = GameState {
				cursor: cursor_next,
				separator: refine(g.separator, x),
				append_count: g.append_count + usize::from(!already_in_d),
			};

			if g_next == g {
				continue;
			}

			if ignore_ambiguous {
				let fingerprint: (usize, u64, Column) = (g_next.cursor, g.separator, d_next.clone());
				if !next_marked.insert(fingerprint) {
					continue;
				}
			}

			out.push((d_next, g_next));
		}
	}

	out
}

#[cfg(test)]
mod test {
	use super::*;

	fn identity_on(codec: &AlphabetCodec) -> Transducer {
		let mut t: Transducer = Transducer::new(0);
		t.add_final(0);
		for x in codec.symbols() {
			t.add_transition(codec, 0, codec.pack(x, x), 0);
		}
		t
	}

	#[test]
	fn single_state_identity_never_removes_an_untouched_symbol() {
		let codec: AlphabetCodec = AlphabetCodec::new(vec!["N".into(), "T".into(), "C".into()]);
		let t: Transducer = identity_on(&codec);
		let game: StepGame = StepGame::new(GeneratorKind::SimpleDfs, false);
		let mut cache: StepCache = StepCache::new();
		let c: Column = Column::singleton(0);
		// g0 pre-clears symbol "N" (0); removing symbol "C" (2) is being tested here. Every
		// identity transition only clears the symbol it reads, and the transition reading C is
		// itself gated on C already being absent, so C's bit can never clear: removing it is
		// unreachable regardless of how far the cursor advances.
		let g0: GameState = GameState::initial(0, codec.full_sigma_bitmap());
		let winners: Vec<Column> = game.run(&codec, &t, &mut cache, &c, 2, g0, &CancellationToken::new()).collect();
		assert!(winners.is_empty(), "removing symbol C is never witnessed since its own transition requires it already gone");
	}

	#[test]
	fn cached_and_simple_dfs_agree_on_winner_set() {
		let codec: AlphabetCodec = AlphabetCodec::new(vec!["a".into(), "b".into()]);
		let mut t: Transducer = Transducer::new(0);
		t.add_final(0);
		t.add_final(1);
		t.add_transition(&codec, 0, codec.pack(0, 1), 1);
		t.add_transition(&codec, 1, codec.pack(1, 1), 1);

		let c: Column = Column::singleton(0);
		let g0: GameState = GameState::initial(0, codec.full_sigma_bitmap());

		let simple: StepGame = StepGame::new(GeneratorKind::SimpleDfs, false);
		let mut no_cache: StepCache = StepCache::new();
		let mut simple_winners: Vec<Column> =
			simple.run(&codec, &t, &mut no_cache, &c, 0, g0, &CancellationToken::new()).collect();

		let cached: StepGame = StepGame::new(GeneratorKind::CachedDfs, false);
		let mut with_cache: StepCache = StepCache::new();
		let mut cached_winners: Vec<Column> =
			cached.run(&codec, &t, &mut with_cache, &c, 0, g0, &CancellationToken::new()).collect();

		simple_winners.sort();
		cached_winners.sort();
		assert_eq!(simple_winners, cached_winners);
	}

	#[test]
	fn buffered_bfs_agrees_with_cached_dfs_on_winner_set() {
		let codec: AlphabetCodec = AlphabetCodec::new(vec!["a".into(), "b".into()]);
		let mut t: Transducer = Transducer::new(0);
		t.add_final(0);
		t.add_final(1);
		t.add_transition(&codec, 0, codec.pack(0, 1), 1);
		t.add_transition(&codec, 1, codec.pack(1, 1), 1);
		t.add_transition(&codec, 0, codec.pack(0, 0), 0);

		let c: Column = Column::singleton(0);
		let g0: GameState = GameState::initial(0, codec.full_sigma_bitmap());

		let cached: StepGame = StepGame::new(GeneratorKind::CachedDfs, false);
		let mut cache_a: StepCache = StepCache::new();
		let mut dfs_winners: Vec<Column> =
			cached.run(&codec, &t, &mut cache_a, &c, 0, g0, &CancellationToken::new()).collect();

		let buffered: StepGame = StepGame::new(GeneratorKind::BufferedBfs, false);
		let mut cache_b: StepCache = StepCache::new();
		let mut bfs_winners: Vec<Column> =
			buffered.run(&codec, &t, &mut cache_b, &c, 0, g0, &CancellationToken::new()).collect();

		dfs_winners.sort();
		bfs_winners.sort();
		assert_eq!(dfs_winners, bfs_winners);
	}

	#[test]
	fn ignore_ambiguous_only_shrinks_the_winner_set() {
		let codec: AlphabetCodec = AlphabetCodec::new(vec!["a".into(), "b".into()]);
		let mut t: Transducer = Transducer::new(0);
		t.add_final(1);
		t.add_final(2);
		t.add_transition(&codec, 0, codec.pack(0, 1), 1);
		t.add_transition(&codec, 0, codec.pack(0, 1), 2);

		let c: Column = Column::singleton(0);
		let g0: GameState = GameState::initial(0, codec.full_sigma_bitmap());

		let full: StepGame = StepGame::new(GeneratorKind::SimpleDfs, false);
		let mut cache_a: StepCache = StepCache::new();
		let full_set: BTreeSet<Column> = full.run(&codec, &t, &mut cache_a, &c, 0, g0, &CancellationToken::new()).collect();

		let pruned: StepGame = StepGame::new(GeneratorKind::SimpleDfs, true);
		let mut cache_b: StepCache = StepCache::new();
		let pruned_set: BTreeSet<Column> =
			pruned.run(&codec, &t, &mut cache_b, &c, 0, g0, &CancellationToken::new()).collect();

		assert!(pruned_set.is_subset(&full_set));
	}

	#[test]
	fn cancellation_stops_the_generator_early() {
		let codec: AlphabetCodec = AlphabetCodec::new(vec!["a".into(), "b".into()]);
		let mut t: Transducer = Transducer::new(0);
		t.add_final(0);
		t.add_final(1);
		t.add_transition(&codec, 0, codec.pack(0, 1), 1);
		t.add_transition(&codec, 1, codec.pack(1, 1), 1);

		let c: Column = Column::singleton(0);
		let g0: GameState = GameState::initial(0, codec.full_sigma_bitmap());
		let game: StepGame = StepGame::new(GeneratorKind::SimpleDfs, false);
		let mut cache: StepCache = StepCache::new();
		let cancellation: CancellationToken = CancellationToken::new();
		cancellation.cancel();

		let winners: Vec<Column> = game.run(&codec, &t, &mut cache, &c, 0, g0, &cancellation).collect();
		assert!(winners.is_empty(), "a pre-cancelled token must not let the generator expand any node");
	}
}
