//! Stack growth for the recursive parser and evaluator.

/// Space that must remain before recursing further.
const RED_ZONE: usize = 128 * 1024;

/// Size of each segment allocated when the red zone is reached.
const SEGMENT: usize = 1024 * 1024;

/// Runs `f`, first moving onto a fresh stack segment when the current one is nearly full.
#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT, f)
}
