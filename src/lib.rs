pub mod alphabet;
pub mod automaton;
pub mod benchmark;
pub mod cancellation;
pub mod column;
pub mod dot;
pub mod error;
pub mod oneshot;
pub mod pairing;
pub mod step_cache;
pub mod step_game;
pub mod transducer;
pub mod transition_store;
