//! The outward result-callback protocol.
//!
//! Every executed unit eventually reports `(success, result)` to a
//! [`ResultCallback`]. Nested frames compose callbacks with
//! [`ResultCallback::chain`] so an outer caller observes the innermost result.

use std::fmt;
use std::rc::Rc;

type CallbackFn = dyn Fn(bool, i32);

/// A cheaply cloneable consumer of command results.
#[derive(Clone, Default)]
pub struct ResultCallback(Option<Rc<CallbackFn>>);

impl ResultCallback {
    /// A callback that ignores every result.
    #[must_use]
    pub const fn empty() -> Self {
        Self(None)
    }

    /// Wraps a closure.
    pub fn new(f: impl Fn(bool, i32) + 'static) -> Self {
        Self(Some(Rc::new(f)))
    }

    /// Returns true if this callback ignores every result.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Reports an outcome.
    pub fn on_result(&self, success: bool, result: i32) {
        if let Some(f) = &self.0 {
            f(success, result);
        }
    }

    /// Reports a successful outcome.
    pub fn on_success(&self, result: i32) {
        self.on_result(true, result);
    }

    /// Reports a failed outcome.
    pub fn on_failure(&self) {
        self.on_result(false, 0);
    }

    /// Returns a callback that invokes `first` and then `second`.
    #[must_use]
    pub fn chain(first: &Self, second: &Self) -> Self {
        match (&first.0, &second.0) {
            (None, _) => second.clone(),
            (_, None) => first.clone(),
            (Some(a), Some(b)) => {
                let (a, b) = (Rc::clone(a), Rc::clone(b));
                Self::new(move |success, result| {
                    a(success, result);
                    b(success, result);
                })
            }
        }
    }
}

impl fmt::Debug for ResultCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "ResultCallback(empty)")
        } else {
            write!(f, "ResultCallback(..)")
        }
    }
}
