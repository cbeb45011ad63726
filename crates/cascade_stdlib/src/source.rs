//! The command source used by the standard command set.

use std::fmt;
use std::rc::Rc;

use cascade_engine::{CommandDispatcher, ExecutionSource, ResultCallback};
use cascade_foundation::CommandError;

use crate::host::{Host, OutputLine};

/// A named issuer of commands bound to a [`Host`].
#[derive(Clone)]
pub struct ScriptSource {
    name: Rc<str>,
    host: Rc<Host>,
    permission: u8,
    callback: ResultCallback,
    silent: bool,
}

impl ScriptSource {
    /// Creates a source.
    #[must_use]
    pub fn new(host: Rc<Host>, name: &str, permission: u8) -> Self {
        Self {
            name: name.into(),
            host,
            permission,
            callback: ResultCallback::empty(),
            silent: false,
        }
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &Rc<Host> {
        &self.host
    }

    /// Returns the permission level.
    #[must_use]
    pub fn permission(&self) -> u8 {
        self.permission
    }

    /// Returns a copy with another name.
    #[must_use]
    pub fn with_name(&self, name: &str) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Returns a copy at another permission level.
    #[must_use]
    pub fn with_permission(&self, permission: u8) -> Self {
        Self {
            permission,
            ..self.clone()
        }
    }

    /// Returns a copy whose failures are suppressed.
    #[must_use]
    pub fn silenced(&self) -> Self {
        Self {
            silent: true,
            ..self.clone()
        }
    }

    /// Emits a message from this source.
    pub fn say(&self, text: &str) {
        self.host.emit(OutputLine::Message {
            source: self.name.to_string(),
            text: text.to_string(),
        });
    }
}

impl ExecutionSource for ScriptSource {
    fn has_permission(&self, level: u8) -> bool {
        self.permission >= level
    }

    fn callback(&self) -> ResultCallback {
        self.callback.clone()
    }

    fn with_callback(&self, callback: ResultCallback) -> Self {
        Self {
            callback,
            ..self.clone()
        }
    }

    fn dispatcher(&self) -> Rc<dyn CommandDispatcher<Self>> {
        self.host.dispatcher()
    }

    fn send_failure(&self, error: &CommandError) {
        self.host.emit(OutputLine::Failure {
            source: self.name.to_string(),
            text: error.to_string(),
        });
    }

    fn is_silent(&self) -> bool {
        self.silent
    }
}

impl fmt::Debug for ScriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptSource")
            .field("name", &self.name)
            .field("permission", &self.permission)
            .field("silent", &self.silent)
            .finish_non_exhaustive()
    }
}
