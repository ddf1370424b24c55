use crate::state::{StateId, Store};

/// Canonical fingerprint of a state's right-language, used by the [`crate::Builder`] to
/// deduplicate states during construction.
///
/// Two states produced during a single build have equal signatures iff their right-languages
/// are equal: children are always signed after they've already been minimised (the builder
/// walks the latest-insertion chain deepest-first), so a child's index alone fully identifies
/// its right-language by the time its parent is signed.
///
/// `Eq`/`Hash` are derived directly over the owned `(is_final, edges)` pair rather than reduced
/// to a bare hash, so a `HashMap<Signature<T>, _>` registry only ever treats two signatures as
/// equal after comparing full symbol values, not merely their hashes — collisions in the
/// `Hash` impl can only cause a spurious bucket probe, never a spurious merge.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Signature<T> {
    is_final: bool,
    edges: Vec<(T, StateId)>,
}

impl<T: Ord + Clone> Signature<T> {
    /// Computes the signature of state `s` as it currently stands in `store`.
    ///
    /// Only valid to call once every descendant of `s` reachable via a single transition has
    /// already been frozen (registered or merged) -- i.e. from the builder's deepest-first
    /// replace-or-register walk.
    pub fn of(store: &Store<T>, s: StateId) -> Self {
        let edges = store.transitions_of(s).map(|(sym, child)| (sym.clone(), child)).collect();
        Signature { is_final: store.is_final(s), edges }
    }
}
