//! Hand-written DOT text for offline inspection of an `Automaton`/`Transducer`. Never consulted
//! by the search itself.

use std::fmt::Write as _;

use crate::alphabet::AlphabetCodec;
use crate::automaton::Automaton;
use crate::transducer::Transducer;

pub fn automaton_to_dot(codec: &AlphabetCodec, name: &str, automaton: &Automaton) -> String {
	let mut out: String = String::new();
	let _ = writeln!(out, "digraph {name} {{");
	let _ = writeln!(out, "\trankdir=LR;");
	let _ = writeln!(out, "\t__start__ [shape=point];");
	let _ = writeln!(out, "\t__start__ -> q{};", automaton.initial());

	for state in all_automaton_states(automaton) {
		let shape: &str = if automaton.is_final(state) { "doublecircle" } else { "circle" };
		let _ = writeln!(out, "\tq{state} [shape={shape}];");
	}

	for origin in all_automaton_states(automaton) {
		for (symbol, target) in automaton.transitions_of(origin) {
			let label: &str = codec.decode_symbol(symbol);
			let _ = writeln!(out, "\tq{origin} -> q{target} [label=\"{label}\"];");
		}
	}

	out.push_str("}\n");
	out
}

pub fn transducer_to_dot(codec: &AlphabetCodec, name: &str, transducer: &Transducer) -> String {
	let mut out: String = String::new();
	let _ = writeln!(out, "digraph {name} {{");
	let _ = writeln!(out, "\trankdir=LR;");
	let _ = writeln!(out, "\t__start__ [shape=point];");
	let _ = writeln!(out, "\t__start__ -> q{};", transducer.initial());

	for state in all_transducer_states(transducer) {
		let shape: &str = if transducer.is_final(state) { "doublecircle" } else { "circle" };
		let _ = writeln!(out, "\tq{state} [shape={shape}];");
	}

	for origin in all_transducer_states(transducer) {
		for (label, target) in transducer.transitions_of(origin) {
			let x: &str = codec.decode_symbol(codec.x(label));
			let y: &str = codec.decode_symbol(codec.y(label));
			let _ = writeln!(out, "\tq{origin} -> q{target} [label=\"{x},{y}\"];");
		}
	}

	out.push_str("}\n");
	out
}

fn all_automaton_states(automaton: &Automaton) -> Vec<usize> {
	let mut seen: Vec<usize> = vec![automaton.initial()];
	seen.extend(automaton.finals());
	let mut frontier: Vec<usize> = vec![automaton.initial()];
	while let Some(origin) = frontier.pop() {
		for (_, target) in automaton.transitions_of(origin) {
			if !seen.contains(&target) {
				seen.push(target);
				frontier.push(target);
			}
		}
	}
	seen.sort_unstable();
	seen.dedup();
	seen
}

fn all_transducer_states(transducer: &Transducer) -> Vec<usize> {
	let mut seen: Vec<usize> = vec![transducer.initial()];
	seen.extend(transducer.finals());
	let mut frontier: Vec<usize> = vec![transducer.initial()];
	while let Some(origin) = frontier.pop() {
		for (_, target) in transducer.transitions_of(origin) {
			if !seen.contains(&target) {
				seen.push(target);
				frontier.push(target);
			}
		}
	}
	seen.sort_unstable();
	seen.dedup();
	seen
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn automaton_dump_is_well_formed_digraph() {
		let codec: AlphabetCodec = AlphabetCodec::new(vec!["a".into(), "b".into()]);
		let mut a: Automaton = Automaton::new(0);
		a.add_final(1);
		a.add_transition(0, 0, 1);
		a.add_transition(1, 1, 1);

		let dot: String = automaton_to_dot(&codec, "fixture", &a);
		assert!(dot.starts_with("digraph fixture {"));
		assert!(dot.trim_end().ends_with('}'));
		assert_eq!(dot.matches("digraph").count(), 1);
		assert!(dot.contains("q0 -> q1"));
	}

	#[test]
	fn transducer_dump_labels_pairs() {
		let codec: AlphabetCodec = AlphabetCodec::new(vec!["a".into(), "b".into()]);
		let mut t: Transducer = Transducer::new(0);
		t.add_final(0);
		t.add_transition(&codec, 0, codec.pack(0, 1), 0);

		let dot: String = transducer_to_dot(&codec, "t", &t);
		assert!(dot.contains("label=\"a,b\""));
	}
}
