//! Loads the JSON benchmark format into an `AlphabetCodec`, an initial automaton `I`, a
//! transducer `T`, and a map of named property automata `B`.

use std::collections::BTreeMap;

use regex::Regex;
use serde::Deserialize;
use tracing::instrument;

use crate::alphabet::AlphabetCodec;
use crate::automaton::Automaton;
use crate::error::Error;
use crate::error::Result;
use crate::pairing::pair;
use crate::transducer::Transducer;
use crate::transition_store::State;

#[derive(Debug, Deserialize)]
struct BenchmarkDoc {
	alphabet: Vec<String>,
	initial: AutomatonDoc,
	transducer: AutomatonDoc,
	properties: BTreeMap<String, AutomatonDoc>,
}

#[derive(Debug, Deserialize)]
struct AutomatonDoc {
	#[allow(dead_code)]
	states: Vec<String>,
	#[serde(rename = "initialState")]
	initial_state: String,
	#[serde(rename = "acceptingStates")]
	accepting_states: Vec<String>,
	transitions: Vec<TransitionDoc>,
}

#[derive(Debug, Deserialize)]
struct TransitionDoc {
	origin: String,
	letter: String,
	target: String,
}

pub struct Benchmark {
	pub codec: AlphabetCodec,
	pub initial: Automaton,
	pub transducer: Transducer,
	pub properties: BTreeMap<String, Automaton>,
}

impl Benchmark {
	/// Builds the `I×B` transducer for a named property, or `InputError` if the name is unknown.
	pub fn pairing(&self, property_name: &str) -> Result<Transducer> {
		let property: &Automaton = self
			.properties
			.get(property_name)
			.ok_or_else(|| Error::input(format!("unknown property {property_name:?}")))?;
		Ok(pair(&self.codec, &self.initial, property))
	}
}

/// Parses a state name of the form `q<i>` into its integer id.
fn parse_state_id(name: &str) -> Result<State> {
	let digits: &str = name
		.strip_prefix('q')
		.ok_or_else(|| Error::input(format!("state name {name:?} does not start with 'q'")))?;
	digits.parse::<State>().map_err(|_| Error::input(format!("state name {name:?} has a non-numeric suffix")))
}

fn compile_letter(letter: &str) -> Result<Regex> {
	Regex::new(&format!("^(?:{letter})$")).map_err(|e| Error::input(format!("invalid letter regex {letter:?}: {e}")))
}

/// Builds a plain automaton: `letter` is matched against every symbol of Σ.
#[instrument(skip(codec, doc))]
fn build_automaton(codec: &AlphabetCodec, doc: &AutomatonDoc) -> Result<Automaton> {
	let mut automaton: Automaton = Automaton::new(parse_state_id(&doc.initial_state)?);
	for accepting in &doc.accepting_states {
		automaton.add_final(parse_state_id(accepting)?);
	}

	for transition in &doc.transitions {
		let origin: State = parse_state_id(&transition.origin)?;
		let target: State = parse_state_id(&transition.target)?;
		let pattern: Regex = compile_letter(&transition.letter)?;

		for symbol in codec.symbols() {
			if pattern.is_match(codec.decode_symbol(symbol)) {
				automaton.add_transition(origin, symbol, target);
			}
		}
	}

	Ok(automaton)
}

/// Builds `T`: `letter` is matched against strings `x,y` over all pairs of Σ×Σ.
#[instrument(skip(codec, doc))]
fn build_transducer(codec: &AlphabetCodec, doc: &AutomatonDoc) -> Result<Transducer> {
	let mut transducer: Transducer = Transducer::new(parse_state_id(&doc.initial_state)?);
	for accepting in &doc.accepting_states {
		transducer.add_final(parse_state_id(accepting)?);
	}

	for transition in &doc.transitions {
		let origin: State = parse_state_id(&transition.origin)?;
		let target: State = parse_state_id(&transition.target)?;
		let pattern: Regex = compile_letter(&transition.letter)?;

		for (x, y) in codec.pairs() {
			let candidate: String = format!("{},{}", codec.decode_symbol(x), codec.decode_symbol(y));
			if pattern.is_match(&candidate) {
				transducer.add_transition(codec, origin, codec.pack(x, y), target);
			}
		}
	}

	Ok(transducer)
}

#[instrument(skip(json))]
pub fn load_benchmark(json: &str) -> Result<Benchmark> {
	let doc: BenchmarkDoc = serde_json::from_str(json).map_err(|e| Error::input(format!("malformed benchmark JSON: {e}")))?;

	if doc.alphabet.is_empty() {
		return Err(Error::input("alphabet must not be empty"));
	}
	let codec: AlphabetCodec = AlphabetCodec::new(doc.alphabet);

	let initial: Automaton = build_automaton(&codec, &doc.initial)?;
	let transducer: Transducer = build_transducer(&codec, &doc.transducer)?;

	let mut properties: BTreeMap<String, Automaton> = BTreeMap::new();
	for (name, property_doc) in &doc.properties {
		properties.insert(name.clone(), build_automaton(&codec, property_doc)?);
	}

	Ok(Benchmark { codec, initial, transducer, properties })
}

#[cfg(test)]
mod test {
	use super::*;

	const TWO_C_BENCHMARK: &str = r#"
	{
		"alphabet": ["N", "T", "C"],
		"initial": {
			"states": ["q0"],
			"initialState": "q0",
			"acceptingStates": ["q0"],
			"transitions": [{"origin": "q0", "letter": "N", "target": "q0"}]
		},
		"transducer": {
			"states": ["q0"],
			"initialState": "q0",
			"acceptingStates": ["q0"],
			"transitions": [{"origin": "q0", "letter": "N,N|T,T|C,C", "target": "q0"}]
		},
		"properties": {
			"two-cs": {
				"states": ["q0", "q1", "q2"],
				"initialState": "q0",
				"acceptingStates": ["q2"],
				"transitions": [
					{"origin": "q0", "letter": "N|T", "target": "q0"},
					{"origin": "q0", "letter": "C", "target": "q1"},
					{"origin": "q1", "letter": "N|T", "target": "q1"},
					{"origin": "q1", "letter": "C", "target": "q2"},
					{"origin": "q2", "letter": "N|T|C", "target": "q2"}
				]
			}
		}
	}
	"#;

	#[test]
	fn loads_alphabet_and_states() {
		let benchmark: Benchmark = load_benchmark(TWO_C_BENCHMARK).expect("valid benchmark");
		assert_eq!(benchmark.codec.len(), 3);
		assert!(benchmark.properties.contains_key("two-cs"));
	}

	#[test]
	fn unknown_property_is_input_error() {
		let benchmark: Benchmark = load_benchmark(TWO_C_BENCHMARK).expect("valid benchmark");
		let err: Error = benchmark.pairing("missing").unwrap_err();
		assert!(matches!(err, Error::InputError { .. }));
	}

	#[test]
	fn malformed_json_is_input_error() {
		let err: Error = load_benchmark("{ not json").unwrap_err();
		assert!(matches!(err, Error::InputError { .. }));
	}

	#[test]
	fn malformed_state_name_is_input_error() {
		let bad: &str = r#"
		{
			"alphabet": ["a"],
			"initial": {
				"states": ["zero"],
				"initialState": "zero",
				"acceptingStates": [],
				"transitions": []
			},
			"transducer": {
				"states": ["q0"],
				"initialState": "q0",
				"acceptingStates": ["q0"],
				"transitions": []
			},
			"properties": {}
		}
		"#;
		let err: Error = load_benchmark(bad).unwrap_err();
		assert!(matches!(err, Error::InputError { .. }));
	}
}
