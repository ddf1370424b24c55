use crate::{
    state::{StateId, Store},
    symbol::Symbol,
};

/// Running state of a longest-match scan over an input sequence.
///
/// `Scanning` carries the current automaton state; `Halted` means no further transition exists
/// and the scan is over. The "Matched(end)" state named in the reference algorithm is not a
/// separate enum variant here: nothing branches on "are we currently matched", only on "is there
/// a best match so far", so that information is carried as the surrounding loop's running `best`
/// instead of folded into this enum.
enum ScanState {
    Scanning(StateId),
    Halted,
}

/// Scans `input` from `start`, walking `store` symbol-by-symbol, and returns the largest `end`
/// such that `input[start..end]` is a member (has `final_count > 0` in `store`). Returns `None`
/// if no member is found. Out-of-range `start` (greater than `input.len()`) returns `None`
/// rather than panicking.
pub(crate) fn longest_match<T: Symbol>(store: &Store<T>, input: &[T], start: usize) -> Option<usize> {
    if store.is_empty() || start > input.len() {
        return None;
    }

    let mut state = ScanState::Scanning(StateId::START);
    let mut best: Option<usize> = None;
    let mut pos = start;

    loop {
        let current = match state {
            ScanState::Scanning(s) => s,
            ScanState::Halted => break,
        };

        if store.is_final(current) {
            best = Some(pos);
        }

        state = match input.get(pos).and_then(|sym| store.transition(current, sym)) {
            Some(next) => {
                pos += 1;
                ScanState::Scanning(next)
            }
            None => ScanState::Halted,
        };
    }

    best
}
