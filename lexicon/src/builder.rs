use {
    crate::{
        error::{LexiconError, LexiconResult},
        lexicon::Lexicon,
        signature::Signature,
        state::{StateId, Store},
        symbol::Symbol,
    },
    log::{debug, trace},
    std::collections::HashMap,
};

/// Online construction of a minimal acyclic DFA from a lexicographically sorted, duplicate-free
/// stream of words (Daciuk et al., 2000, "Algorithm 1").
///
/// One builder instance absorbs one sequential stream via repeated [`Builder::push`], then
/// [`Builder::build`] detaches the finished [`Lexicon`] from the builder, consuming it. A builder
/// is not meant to be reused or shared across threads.
pub struct Builder<T: Symbol> {
    store: Store<T>,
    registry: HashMap<Signature<T>, StateId>,
    last_word: Option<Vec<T>>,
}

impl<T: Symbol> Default for Builder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Symbol> Builder<T> {
    pub fn new() -> Self {
        Self { store: Store::new(), registry: HashMap::new(), last_word: None }
    }

    /// Pre-reserves backing storage for `expected_words` words.
    pub fn with_capacity(expected_words: usize) -> Self {
        Self {
            store: Store::with_capacity(expected_words),
            registry: HashMap::with_capacity(expected_words),
            last_word: None,
        }
    }

    /// Absorbs one word. `word` must be strictly greater than every previously pushed word.
    ///
    /// # Errors
    /// Returns [`LexiconError::EmptyWord`] if `word` is empty, or
    /// [`LexiconError::OrderViolation`] if `word` is not strictly greater than the last word
    /// pushed. After an `OrderViolation`, the builder's state is undefined and must be discarded.
    pub fn push(&mut self, word: &[T]) -> LexiconResult<()> {
        if word.is_empty() {
            return Err(LexiconError::EmptyWord);
        }
        if let Some(last) = &self.last_word {
            if word <= last.as_slice() {
                return Err(LexiconError::OrderViolation);
            }
        }

        if self.store.is_empty() {
            self.store.append_state();
            self.add_suffix(StateId::START, word);
        } else {
            let (p, common_len) = self.common_prefix_endpoint(word);
            let last = self.last_word.take().expect("non-empty store implies a last word");
            if common_len < last.len() {
                self.freeze_from(p, &last, common_len);
            }
            self.add_suffix(p, &word[common_len..]);
        }

        debug!("pushed word of length {} (states so far: {})", word.len(), self.store.state_count());
        self.last_word = Some(word.to_vec());
        Ok(())
    }

    /// Absorbs an entire pre-sorted, duplicate-free stream.
    pub fn extend_sorted<I>(&mut self, words: I) -> LexiconResult<()>
    where
        I: IntoIterator,
        I::Item: AsRef<[T]>,
    {
        for word in words {
            self.push(word.as_ref())?;
        }
        Ok(())
    }

    /// Finalises construction, consuming the builder and returning the minimal automaton built
    /// so far.
    pub fn build(mut self) -> Lexicon<T> {
        if let Some(last) = self.last_word.take() {
            self.freeze_from(StateId::START, &last, 0);
        }
        debug!("build finished: {} states", self.store.state_count());
        Lexicon::from_store(self.store)
    }

    /// Walks `word` from the start state as far as transitions already exist. Returns the
    /// reached state and the number of symbols consumed.
    fn common_prefix_endpoint(&self, word: &[T]) -> (StateId, usize) {
        let mut cur = StateId::START;
        let mut consumed = 0;
        for sym in word {
            match self.store.transition(cur, sym) {
                Some(next) => {
                    cur = next;
                    consumed += 1;
                }
                None => break,
            }
        }
        (cur, consumed)
    }

    /// Appends one fresh state per remaining symbol of `suffix`, chained from `from`, and marks
    /// the terminal state (or `from` itself, if `suffix` is empty) final.
    fn add_suffix(&mut self, from: StateId, suffix: &[T]) {
        let mut cur = from;
        for sym in suffix {
            let next = self.store.append_state();
            self.store.set_transition(cur, sym.clone(), next);
            cur = next;
        }
        self.store.increment_final(cur);
    }

    /// Freezes the chain added for `word` strictly below `p` (i.e. `word[common_len..]`),
    /// running replace-or-register bottom-up.
    ///
    /// The reference algorithm describes this as following "the last newly-added state" at each
    /// step; since the simple algorithm only ever grows a single unbranched chain past the most
    /// recent common-prefix point, that chain is exactly `word[common_len..]` walked through the
    /// store's existing transitions, so we use `word` directly instead of tracking a separate
    /// "latest child" pointer.
    fn freeze_from(&mut self, p: StateId, word: &[T], common_len: usize) {
        let mut chain = Vec::with_capacity(word.len() - common_len);
        let mut cur = p;
        for sym in &word[common_len..] {
            let child = self.store.transition(cur, sym).expect("freeze chain must already exist in the store");
            chain.push((cur, sym, child));
            cur = child;
        }

        for (parent, sym, child) in chain.into_iter().rev() {
            self.replace_or_register(parent, sym, child);
        }
    }

    fn replace_or_register(&mut self, parent: StateId, sym: &T, child: StateId) {
        let sig = Signature::of(&self.store, child);
        match self.registry.get(&sig) {
            Some(&existing) if existing != child => {
                debug_assert_eq!(
                    child,
                    self.store.highest_index(),
                    "merge candidate must be the highest-indexed state in the store"
                );
                trace!("merging state {child:?} into existing equivalent state {existing:?}");
                let folded = self.store.final_count(child);
                self.store.add_final_count(existing, folded);
                self.reparent(parent, sym, existing);
                self.store.truncate_last();
            }
            Some(_) => {}
            None => {
                trace!("registering new state {child:?}");
                self.registry.insert(sig, child);
            }
        }
    }

    /// Redirects `parent --sym--> new_child`, dropping any stale registry entry for `parent`
    /// under its pre-redirect signature (its signature is about to change).
    fn reparent(&mut self, parent: StateId, sym: &T, new_child: StateId) {
        let old_sig = Signature::of(&self.store, parent);
        if self.registry.get(&old_sig) == Some(&parent) {
            self.registry.remove(&old_sig);
        }
        self.store.set_transition(parent, sym.clone(), new_child);
    }
}
