//! The capability set the engine requires from whoever issues commands.

use std::rc::Rc;

use cascade_foundation::CommandError;

use crate::callback::ResultCallback;
use crate::chain::CommandDispatcher;
use crate::diagnostics::TraceCallbacks;

/// An issuer of commands.
///
/// The engine is generic over this type. Sources are cloned freely while a
/// chain forks, so implementations are usually a handful of `Rc`s.
pub trait ExecutionSource: Clone + 'static {
    /// Returns true if this source holds the given permission level.
    fn has_permission(&self, level: u8) -> bool;

    /// Returns the callback that receives this source's command results.
    fn callback(&self) -> ResultCallback;

    /// Returns a copy of this source reporting results to `callback`.
    #[must_use]
    fn with_callback(&self, callback: ResultCallback) -> Self;

    /// Returns the dispatcher used to resolve commands for this source.
    fn dispatcher(&self) -> Rc<dyn CommandDispatcher<Self>>;

    /// Reports a failure to whoever is behind this source.
    fn send_failure(&self, error: &CommandError);

    /// Returns true if failures from this source are suppressed.
    fn is_silent(&self) -> bool;

    /// Routes a command error raised while running on behalf of this source.
    ///
    /// The tracer always sees the error. The source itself only hears about
    /// it when the chain has not forked and the source is not silent.
    fn handle_error(
        &self,
        error: &CommandError,
        forked: bool,
        tracer: Option<&mut (dyn TraceCallbacks + 'static)>,
    ) {
        if let Some(tracer) = tracer {
            tracer.on_error(&error.to_string());
        }
        if !forked && !self.is_silent() {
            self.send_failure(error);
        }
    }
}
