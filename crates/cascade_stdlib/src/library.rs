//! Compiled functions by id, and loading them from text or disk.
//!
//! On disk a library is a directory of `.mcfunction` files. The first
//! directory level names the namespace and the rest of the path names the
//! function, so `data/demo/util/greet.mcfunction` loaded from `data/` is
//! `demo:util/greet`. Files directly under the root use [`DEFAULT_NAMESPACE`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use cascade_engine::{CommandFunction, FunctionId};
use cascade_foundation::{Error, ErrorContext, ErrorKind, Result};
use tracing::{debug, warn};

use crate::host::Host;
use crate::source::ScriptSource;

/// Namespace assumed for ids written without one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// File extension of function sources.
pub const FUNCTION_EXTENSION: &str = "mcfunction";

/// Adds the default namespace to an id that lacks one.
#[must_use]
pub fn normalize_id(id: &str) -> String {
    if id.contains(':') {
        id.to_string()
    } else {
        format!("{DEFAULT_NAMESPACE}:{id}")
    }
}

/// Compiled functions keyed by id.
#[derive(Default)]
pub struct FunctionLibrary {
    functions: BTreeMap<String, Rc<CommandFunction<ScriptSource>>>,
}

impl FunctionLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a function, replacing any with the same id.
    pub fn insert(&mut self, function: CommandFunction<ScriptSource>) -> Option<Rc<CommandFunction<ScriptSource>>> {
        self.functions.insert(function.id().to_string(), Rc::new(function))
    }

    /// Looks up a function. Ids without a namespace use the default one.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Rc<CommandFunction<ScriptSource>>> {
        match self.functions.get(id) {
            Some(function) => Some(Rc::clone(function)),
            None if !id.contains(':') => self.functions.get(&normalize_id(id)).cloned(),
            None => None,
        }
    }

    /// Returns true if `id` resolves.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Removes a function.
    pub fn remove(&mut self, id: &str) -> Option<Rc<CommandFunction<ScriptSource>>> {
        self.functions.remove(&normalize_id(id))
    }

    /// Iterates over ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Number of functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns true if there are no functions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Removes every function.
    pub fn clear(&mut self) {
        self.functions.clear();
    }
}

/// Compiles `text` as function `id` and adds it to the host's library.
///
/// # Errors
///
/// Returns the compilation error; the library is left unchanged.
pub fn load_str(host: &Rc<Host>, id: &str, text: &str) -> Result<FunctionId> {
    let lines: Vec<&str> = text.lines().collect();
    load_lines(host, id, &lines)
}

/// Compiles `lines` as function `id` and adds it to the host's library.
///
/// # Errors
///
/// Returns the compilation error; the library is left unchanged.
pub fn load_lines<L: AsRef<str>>(host: &Rc<Host>, id: &str, lines: &[L]) -> Result<FunctionId> {
    let function = CommandFunction::from_lines(normalize_id(id), &host.compiler(), lines)?;
    let id = function.id().clone();
    debug!(%id, macro_function = function.is_macro(), "function loaded");
    host.library_mut().insert(function);
    Ok(id)
}

/// What loading a directory produced.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Ids compiled, in load order.
    pub loaded: Vec<FunctionId>,
    /// Files that failed to compile.
    pub errors: Vec<Error>,
}

impl LoadReport {
    /// Returns true if every file compiled.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Loads every function file under `root`.
///
/// A file that fails to compile is recorded in the report and skipped.
///
/// # Errors
///
/// Returns an I/O error if a directory or file cannot be read.
pub fn load_directory(host: &Rc<Host>, root: &Path) -> Result<LoadReport> {
    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    files.sort();

    let mut report = LoadReport::default();
    for path in files {
        let Some(id) = id_for_path(root, &path) else {
            continue;
        };
        let text = fs::read_to_string(&path).map_err(|err| io_error(&path, &err))?;
        match load_str(host, &id, &text) {
            Ok(id) => report.loaded.push(id),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "function failed to compile");
                let context = err.context.clone().unwrap_or_default();
                report.errors.push(Error {
                    kind: err.kind,
                    context: Some(context.with_frame(path.display().to_string())),
                });
            }
        }
    }
    Ok(report)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|err| io_error(dir, &err))?;
    for entry in entries {
        let path = entry.map_err(|err| io_error(dir, &err))?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == FUNCTION_EXTENSION) {
            files.push(path);
        }
    }
    Ok(())
}

fn id_for_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    match parts.as_slice() {
        [] => None,
        [name] => Some(format!("{DEFAULT_NAMESPACE}:{name}")),
        [namespace, rest @ ..] => Some(format!("{namespace}:{}", rest.join("/"))),
    }
}

fn io_error(path: &Path, err: &std::io::Error) -> Error {
    Error::new(ErrorKind::Io(format!("{}: {err}", path.display())))
        .with_context(ErrorContext::new().with_source(path.display().to_string()))
}
