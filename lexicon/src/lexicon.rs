use {
    crate::{
        builder::Builder,
        error::{LexiconError, LexiconResult},
        iter::WordIter,
        scan::longest_match,
        state::{StateId, Store},
        symbol::Symbol,
    },
    once_cell::sync::OnceCell,
    std::fmt::Write as _,
};

/// An immutable, sorted set of non-empty sequences ("words") over `T`, encoded as a minimal
/// acyclic deterministic finite automaton.
///
/// Two `Lexicon`s compare equal iff they accept the same word set: because construction always
/// produces the minimal automaton, equal word sets always produce structurally identical state
/// vectors, so `PartialEq` over the underlying store is sound (see `PartialEq` impl below, which
/// deliberately ignores the lazily-populated transition cache).
pub struct Lexicon<T: Symbol> {
    store: Store<T>,
    size: usize,
    start_transitions: OnceCell<Vec<(T, StateId)>>,
}

impl<T: Symbol> Lexicon<T> {
    /// The empty Lexicon: no words, no states.
    pub fn new() -> Self {
        Self { store: Store::new(), size: 0, start_transitions: OnceCell::new() }
    }

    pub(crate) fn from_store(store: Store<T>) -> Self {
        let size = (0..store.state_count()).map(|i| store.final_count(StateId(i as u32)) as usize).sum();
        Self { store, size, start_transitions: OnceCell::new() }
    }

    /// Builds a Lexicon from an arbitrary (possibly unsorted, possibly duplicated) iterable of
    /// words. Empty words are silently dropped, matching the Non-goal that the empty word can
    /// never be a member.
    pub fn from_words<W, I>(words: I) -> Self
    where
        W: AsRef<[T]>,
        I: IntoIterator<Item = W>,
    {
        words.into_iter().map(|w| w.as_ref().to_vec()).collect()
    }

    /// Builds a Lexicon from a pre-sorted, pre-deduplicated iterable of words. Reports
    /// [`crate::LexiconError`] on the first word that violates strict ascending order, or on any
    /// empty word.
    pub fn from_sorted_iter<W, I>(words: I) -> LexiconResult<Self>
    where
        W: AsRef<[T]>,
        I: IntoIterator<Item = W>,
    {
        let mut builder = Builder::new();
        for word in words {
            builder.push(word.as_ref())?;
        }
        Ok(builder.build())
    }

    /// Reassembles a Lexicon from externally supplied `(outgoing transitions, final count)`
    /// pairs, one entry of each per state, state `0` implicitly the start state.
    ///
    /// Intended for persistence layers that round-trip an already-minimized automaton rather
    /// than rebuilding it through the [`Builder`]. Does not itself re-run minimization: a
    /// non-minimal or otherwise malformed input produces a Lexicon that behaves according to
    /// whatever it was given, not necessarily a valid MADFA.
    ///
    /// # Errors
    /// Returns [`LexiconError::DimensionMismatch`] if `transitions` and `final_counts` have
    /// different lengths.
    pub fn from_parts(transitions: Vec<Vec<(T, u32)>>, final_counts: Vec<u32>) -> LexiconResult<Self> {
        if transitions.len() != final_counts.len() {
            return Err(LexiconError::DimensionMismatch { transitions: transitions.len(), final_counts: final_counts.len() });
        }

        let mut store = Store::with_capacity(transitions.len());
        for _ in 0..transitions.len() {
            store.append_state();
        }
        for (i, edges) in transitions.into_iter().enumerate() {
            for (sym, target) in edges {
                store.set_transition(StateId(i as u32), sym, StateId(target));
            }
        }
        for (i, count) in final_counts.into_iter().enumerate() {
            store.add_final_count(StateId(i as u32), count);
        }
        Ok(Self::from_store(store))
    }

    /// `true` iff `w` is a member. The empty sequence is never a member.
    pub fn contains(&self, w: &[T]) -> bool {
        if w.is_empty() || self.store.is_empty() {
            return false;
        }
        let mut state = StateId::START;
        for sym in w {
            match self.store.transition(state, sym) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.store.is_final(state)
    }

    /// Number of distinct members.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of states in the automaton. Diagnostic only -- not the number of words.
    pub fn length(&self) -> usize {
        self.store.state_count()
    }

    /// In-order enumeration of every member, ascending.
    pub fn iter(&self) -> WordIter<'_, T> {
        WordIter::whole(self)
    }

    /// In-order enumeration of every member starting with `prefix`, ascending. Empty if no
    /// member starts with `prefix`. `iter_prefix(&[])` is equivalent to [`Lexicon::iter`].
    pub fn iter_prefix(&self, prefix: &[T]) -> WordIter<'_, T> {
        if self.store.is_empty() {
            return WordIter::empty(self);
        }
        let mut state = StateId::START;
        for sym in prefix {
            match self.store.transition(state, sym) {
                Some(next) => state = next,
                None => return WordIter::empty(self),
            }
        }
        WordIter::seeded(self, prefix.to_vec(), state, self.store.is_final(state))
    }

    /// A new Lexicon containing exactly the members `w` with `from <= w < until`. Either bound
    /// may be absent.
    ///
    /// Implemented by enumerating the full Lexicon and rebuilding via the Builder with the
    /// filtered words. A pruned-traversal variant that avoids materialising the unfiltered tail
    /// is possible but not implemented (see DESIGN.md).
    pub fn range(&self, from: Option<&[T]>, until: Option<&[T]>) -> Self {
        let filtered: Vec<Vec<T>> = self
            .iter()
            .filter(|w| from.map_or(true, |f| w.as_slice() >= f))
            .filter(|w| until.map_or(true, |u| w.as_slice() < u))
            .collect();

        let mut builder = Builder::with_capacity(filtered.len());
        for word in &filtered {
            builder.push(word).expect("words drawn from an existing Lexicon, in order, never violate the builder contract");
        }
        builder.build()
    }

    /// Scans `input` from `start`, walking the automaton symbol-by-symbol, and returns the
    /// largest `end` such that `input[start..end]` is a member. `None` if no such member exists.
    /// `start > input.len()` returns `None` rather than panicking.
    pub fn index_of(&self, input: &[T], start: usize) -> Option<usize> {
        longest_match(&self.store, input, start)
    }

    /// Composes [`Lexicon::index_of`] with slicing.
    pub fn lookup<'a>(&self, input: &'a [T], start: usize) -> Option<&'a [T]> {
        self.index_of(input, start).map(|end| &input[start..end])
    }

    /// Returns a Lexicon containing every member of `self` plus `w`. If `w` is already a member,
    /// returns a clone of `self` without rebuilding.
    pub fn insert(&self, w: &[T]) -> Self {
        if self.contains(w) {
            return self.shallow_clone();
        }
        let mut words: Vec<Vec<T>> = self.iter().collect();
        match words.binary_search(&w.to_vec()) {
            Ok(_) => unreachable!("contains() already confirmed w is absent"),
            Err(pos) => words.insert(pos, w.to_vec()),
        }
        let mut builder = Builder::with_capacity(words.len());
        for word in &words {
            builder.push(word).expect("merged, sorted, deduplicated words never violate the builder contract");
        }
        builder.build()
    }

    /// Returns a Lexicon containing every member of `self` except `w`. If `w` is not a member,
    /// returns a clone of `self` without rebuilding.
    pub fn remove(&self, w: &[T]) -> Self {
        if !self.contains(w) {
            return self.shallow_clone();
        }
        let words: Vec<Vec<T>> = self.iter().filter(|word| word.as_slice() != w).collect();
        let mut builder = Builder::with_capacity(words.len());
        for word in &words {
            builder.push(word).expect("words drawn from an existing Lexicon, minus one, never violate the builder contract");
        }
        builder.build()
    }

    fn shallow_clone(&self) -> Self {
        Self { store: self.store.clone(), size: self.size, start_transitions: OnceCell::new() }
    }

    /// Emits this Lexicon as Graphviz DOT text.
    pub fn dot(&self, id: &str) -> String
    where
        T: std::fmt::Display,
    {
        let mut out = String::new();
        let _ = writeln!(out, "digraph {id} {{");
        let _ = writeln!(out, "  node [shape=circle]");
        for i in 0..self.store.state_count() {
            let s = StateId(i as u32);
            let label = if s == StateId::START { "S".to_string() } else { self.store.final_count(s).to_string() };
            let _ = writeln!(out, "  {i} [label={label}]");
            for (sym, child) in self.store.transitions_of(s) {
                let _ = writeln!(out, "    {i} -> {} [label=\" {sym} \"]", child.usize());
            }
        }
        let _ = write!(out, "}}");
        out
    }

    pub(crate) fn store_is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub(crate) fn is_final_state(&self, s: StateId) -> bool {
        self.store.is_final(s)
    }

    /// Owned snapshot of `s`'s outgoing transitions, in ascending symbol order. Used by
    /// [`WordIter`], which needs an owned, 'static-with-respect-to-the-frame iterator to push
    /// onto its explicit traversal stack.
    pub(crate) fn edges_owned(&self, s: StateId) -> Vec<(T, StateId)> {
        if s == StateId::START {
            return self.start_transitions.get_or_init(|| self.store.transitions_of(s).map(|(sym, c)| (sym.clone(), c)).collect()).clone();
        }
        self.store.transitions_of(s).map(|(sym, c)| (sym.clone(), c)).collect()
    }
}

impl<T: Symbol> Default for Lexicon<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Symbol> Clone for Lexicon<T> {
    fn clone(&self) -> Self {
        self.shallow_clone()
    }
}

impl<T: Symbol + std::fmt::Debug> std::fmt::Debug for Lexicon<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexicon").field("states", &self.store.state_count()).field("size", &self.size).finish()
    }
}

impl<T: Symbol> PartialEq for Lexicon<T> {
    fn eq(&self, other: &Self) -> bool {
        self.store == other.store
    }
}

impl<T: Symbol> Eq for Lexicon<T> {}

impl<T: Symbol> std::ops::Add<&[T]> for &Lexicon<T> {
    type Output = Lexicon<T>;

    fn add(self, w: &[T]) -> Lexicon<T> {
        self.insert(w)
    }
}

impl<T: Symbol> std::ops::Sub<&[T]> for &Lexicon<T> {
    type Output = Lexicon<T>;

    fn sub(self, w: &[T]) -> Lexicon<T> {
        self.remove(w)
    }
}

impl<T: Symbol> FromIterator<Vec<T>> for Lexicon<T> {
    /// Collects an arbitrary (possibly unsorted, possibly duplicated) iterator of words into a
    /// Lexicon, e.g. `words.into_iter().collect::<Lexicon<char>>()`. Empty words are dropped.
    fn from_iter<I: IntoIterator<Item = Vec<T>>>(words: I) -> Self {
        let mut sorted: Vec<Vec<T>> = words.into_iter().filter(|w| !w.is_empty()).collect();
        sorted.sort();
        sorted.dedup();

        let mut builder = Builder::with_capacity(sorted.len());
        for word in &sorted {
            builder.push(word).expect("sorted, deduplicated, non-empty words never violate the builder contract");
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq, test_log::test};

    fn words(strs: &[&str]) -> Vec<Vec<char>> {
        strs.iter().map(|s| s.chars().collect()).collect()
    }

    fn lex(strs: &[&str]) -> Lexicon<char> {
        Lexicon::from_words(words(strs))
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn empty_lexicon_has_no_states() {
        let l: Lexicon<char> = Lexicon::new();
        assert_eq!(l.size(), 0);
        assert_eq!(l.length(), 0);
    }

    #[test]
    fn shared_final_state_is_reused() {
        let l = lex(&["a", "b", "c"]);
        assert_eq!(l.length(), 2);
    }

    #[test]
    fn shared_prefix_and_shared_tail_both_merge() {
        let l = lex(&["aaa", "aba", "aca"]);
        assert_eq!(l.length(), 4);
    }

    #[test]
    fn prefix_word_does_not_make_its_extension_a_member() {
        let l = lex(&["a", "aaa"]);
        assert_eq!(l.length(), 4);
        assert!(!l.contains(&chars("aa")));
    }

    #[test]
    fn index_of_prefers_the_longest_member() {
        let l = lex(&["a", "aa", "b"]);
        assert_eq!(l.index_of(&chars("a"), 0), Some(1));
    }

    #[test]
    fn index_of_stops_at_the_longest_match_in_a_longer_input() {
        let l = lex(&["a", "aaa", "ab"]);
        assert_eq!(l.index_of(&chars("aaaaa"), 0), Some(3));
    }

    #[test]
    fn index_of_honours_a_nonzero_start() {
        let l = lex(&["a", "aa", "aaa"]);
        assert_eq!(l.index_of(&chars("baab"), 1), Some(3));
    }

    #[test]
    fn index_of_returns_none_when_nothing_matches() {
        let l = lex(&["a", "aa", "ab"]);
        assert_eq!(l.index_of(&chars("bbb"), 1), None);
    }

    #[test]
    fn lookup_slices_the_input_at_the_longest_match() {
        let l = lex(&["a", "aa", "aaa"]);
        let input = chars("baab");
        assert_eq!(l.lookup(&input, 1), Some(&input[1..3]));
    }

    #[test]
    fn prefix_iteration_yields_only_matching_members_in_order() {
        let l = lex(&["a", "aa", "aab", "aaa", "abb"]);
        let got: Vec<String> = l.iter_prefix(&chars("aa")).map(|w| w.into_iter().collect()).collect();
        assert_eq!(got, vec!["aa", "aaa", "aab"]);
    }

    #[test]
    fn range_is_half_open() {
        let l = lex(&["a", "aa", "aaa", "aab", "ab", "b"]);
        let from = chars("aa");
        let until = chars("ab");
        let got: Vec<String> =
            l.range(Some(from.as_slice()), Some(until.as_slice())).iter().map(|w| w.into_iter().collect()).collect();
        assert_eq!(got, vec!["aa", "aaa", "aab"]);
    }

    #[test]
    fn range_with_no_bounds_is_the_whole_lexicon() {
        let l = lex(&["a", "b", "c"]);
        assert_eq!(l.range(None, None), l);
    }

    #[test]
    fn insert_is_idempotent_on_an_existing_member() {
        let l = lex(&["a", "b"]);
        let inserted = l.insert(&chars("a"));
        assert_eq!(inserted, l);
    }

    #[test]
    fn insert_then_remove_recovers_the_original_value() {
        let l = lex(&["a", "ab", "b"]);
        let w = chars("ac");
        let round_tripped = l.insert(&w).remove(&w);
        assert_eq!(round_tripped, l);
    }

    #[test]
    fn insert_grows_size_by_one() {
        let l = lex(&["a", "b"]);
        let inserted = l.insert(&chars("c"));
        assert_eq!(inserted.size(), l.size() + 1);
        assert!(inserted.contains(&chars("c")));
    }

    #[test]
    fn remove_on_absent_member_is_a_no_op() {
        let l = lex(&["a", "b"]);
        assert_eq!(l.remove(&chars("c")), l);
    }

    #[test]
    fn remove_shrinks_size_by_one() {
        let l = lex(&["a", "b", "c"]);
        let removed = l.remove(&chars("b"));
        assert_eq!(removed.size(), l.size() - 1);
        assert!(!removed.contains(&chars("b")));
    }

    /// Regression test for the "minimality check on merge" step: once a freshly-added state
    /// is folded into an existing equivalent one, its parent's stale registry entry (keyed on
    /// the parent's pre-merge signature) must be dropped, or a later word sharing that parent
    /// can be matched against a signature the parent no longer has.
    #[test]
    fn reparenting_a_merged_state_does_not_corrupt_sibling_lookups() {
        let l = lex(&["ab", "ac", "cb", "cc"]);
        for w in ["ab", "ac", "cb", "cc"] {
            assert!(l.contains(&chars(w)), "{w} should be a member");
        }
        assert_eq!(l.size(), 4);
    }

    #[test]
    fn from_sorted_iter_rejects_order_violations() {
        let unsorted = vec![chars("b"), chars("a")];
        assert_eq!(Lexicon::from_sorted_iter(unsorted), Err(LexiconError::OrderViolation));
    }

    #[test]
    fn from_sorted_iter_rejects_empty_words() {
        let with_empty: Vec<Vec<char>> = vec![vec![]];
        assert_eq!(Lexicon::from_sorted_iter(with_empty), Err(LexiconError::EmptyWord));
    }

    #[test]
    fn collect_sorts_dedups_and_drops_empty_words() {
        let l: Lexicon<char> = vec![chars("b"), chars("a"), chars("b"), vec![]].into_iter().collect();
        assert_eq!(l.size(), 2);
        assert!(l.contains(&chars("a")));
        assert!(l.contains(&chars("b")));
    }

    #[test]
    fn from_parts_rejects_mismatched_lengths() {
        let transitions: Vec<Vec<(char, u32)>> = vec![vec![('a', 1)]];
        let final_counts = vec![0, 1];
        assert_eq!(
            Lexicon::from_parts(transitions, final_counts),
            Err(LexiconError::DimensionMismatch { transitions: 1, final_counts: 2 })
        );
    }

    #[test]
    fn from_parts_round_trips_a_built_lexicon() {
        let original = lex(&["a", "aa", "b"]);
        let transitions: Vec<Vec<(char, u32)>> =
            (0..original.length()).map(|i| original.store.transitions_of(StateId(i as u32)).map(|(&c, t)| (c, t.usize() as u32)).collect()).collect();
        let final_counts: Vec<u32> = (0..original.length()).map(|i| original.store.final_count(StateId(i as u32))).collect();

        let rebuilt = Lexicon::from_parts(transitions, final_counts).unwrap();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn dot_export_names_every_state() {
        let l = lex(&["a", "b"]);
        let rendered = l.dot("g");
        assert!(rendered.starts_with("digraph g {"));
        assert_eq!(rendered.matches("->").count(), 2);
    }
}
