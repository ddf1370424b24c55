use std::hash::Hash;

/// Bound alias for the element type of a [`crate::Lexicon`].
///
/// Symbols are opaque to the automaton except for ordering, equality, and a stable hash used to
/// build minimisation signatures. Any `char`, fixed-width integer, or `u8` (words of bytes)
/// satisfies this automatically.
pub trait Symbol: Ord + Eq + Hash + Clone {}

impl<T: Ord + Eq + Hash + Clone> Symbol for T {}
