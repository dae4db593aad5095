//! Bounded-sample type inference.

mod guesser;

pub use guesser::{TypeGuesser, DEFAULT_PROBE_ROWS};
