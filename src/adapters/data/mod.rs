//! Input dataset adapters.

pub mod probabilities;

pub use probabilities::{load_probabilities, load_selection_lookup};
