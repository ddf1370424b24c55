use crate::{
    lexicon::Lexicon,
    state::StateId,
    symbol::Symbol,
};

/// Lazy, finite, non-restartable in-order enumeration of a [`Lexicon`]'s members.
///
/// Returned by [`Lexicon::iter`] and [`Lexicon::iter_prefix`]. Uses an explicit stack rather than
/// recursion, since accepted words may be arbitrarily long. Borrows read-only from the
/// `Lexicon`; does not allocate O(n) auxiliary memory, only O(depth) stack space plus the path
/// buffer.
pub struct WordIter<'a, T: Symbol> {
    lexicon: &'a Lexicon<T>,
    stack: Vec<std::vec::IntoIter<(T, StateId)>>,
    path: Vec<T>,
    pending: Option<Vec<T>>,
}

impl<'a, T: Symbol> WordIter<'a, T> {
    pub(crate) fn empty(lexicon: &'a Lexicon<T>) -> Self {
        Self { lexicon, stack: Vec::new(), path: Vec::new(), pending: None }
    }

    pub(crate) fn whole(lexicon: &'a Lexicon<T>) -> Self {
        if lexicon.store_is_empty() {
            return Self::empty(lexicon);
        }
        Self {
            lexicon,
            stack: vec![lexicon.edges_owned(StateId::START).into_iter()],
            path: Vec::new(),
            pending: None,
        }
    }

    /// Seeds the iterator at `state`, reached by walking `path` from the start state. `pending`
    /// is emitted first, for the "yield the prefix itself" rule when `state` is final.
    pub(crate) fn seeded(lexicon: &'a Lexicon<T>, path: Vec<T>, state: StateId, state_is_final: bool) -> Self {
        Self {
            lexicon,
            stack: vec![lexicon.edges_owned(state).into_iter()],
            pending: if state_is_final { Some(path.clone()) } else { None },
            path,
        }
    }
}

impl<'a, T: Symbol> Iterator for WordIter<'a, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        if let Some(word) = self.pending.take() {
            return Some(word);
        }

        while let Some(frame) = self.stack.last_mut() {
            match frame.next() {
                Some((sym, child)) => {
                    self.path.push(sym);
                    let is_final = self.lexicon.is_final_state(child);
                    self.stack.push(self.lexicon.edges_owned(child).into_iter());
                    if is_final {
                        return Some(self.path.clone());
                    }
                }
                None => {
                    self.stack.pop();
                    self.path.pop();
                }
            }
        }
        None
    }
}
