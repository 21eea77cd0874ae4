use crate::runtime::error::RuntimeError;
use crate::runtime::object::Object;
use crate::token::Span;

/// Non-local exits unwinding through the tree walker.
///
/// Carried in the `Err` side of [`Exec`] so `?` propagates them, and every
/// scope entered with `EnvStack::scoped` is closed before the signal moves on.
#[derive(Debug)]
pub(crate) enum Signal {
    Break(Span),
    Continue(Span),
    Return(Object, Span),
    Exit(Object),
    Error(RuntimeError, Option<Span>),
}

impl Signal {
    /// Attaches `span` to an error that has no position yet.
    pub(crate) fn located(self, span: Span) -> Self {
        match self {
            Signal::Error(error, None) => Signal::Error(error, Some(span)),
            other => other,
        }
    }

    /// Converts loop signals that reached a function or program boundary.
    pub(crate) fn escaped_loop(self) -> Self {
        match self {
            Signal::Break(span) => Signal::Error(RuntimeError::BreakOutsideLoop, Some(span)),
            Signal::Continue(span) => Signal::Error(RuntimeError::ContinueOutsideLoop, Some(span)),
            other => other,
        }
    }
}

impl From<RuntimeError> for Signal {
    fn from(error: RuntimeError) -> Self {
        Signal::Error(error, None)
    }
}

pub(crate) type Exec<T> = Result<T, Signal>;
