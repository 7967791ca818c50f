//! Dynamic module loading.
//!
//! Wraps `libloading` behind a lazily resolved, memoized handle.
//! Constructing a [`ReferenceLibrary`] never touches the filesystem;
//! the first invocation resolves the calling convention and loads the
//! module, and the outcome (success or failure) is memoized for the
//! lifetime of the reference.

use std::collections::HashMap;
use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;
use log::debug;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::proto::convention::CallingConvention;

/// Load state of a [`ReferenceLibrary`].
///
/// The `Unresolved -> Resolved | Failed` transition happens under the
/// state mutex, so at most one load occurs and every caller observes
/// the same handle.
enum LoadState {
    Unresolved,
    Resolved {
        library: Arc<Library>,
        convention: CallingConvention,
    },
    Failed {
        reason: String,
    },
}

/// A lazily loaded reference to a native module.
pub struct ReferenceLibrary {
    path: PathBuf,
    convention: CallingConvention,
    state: Mutex<LoadState>,
    symbols: Mutex<HashMap<String, usize>>,
}

impl ReferenceLibrary {
    /// Reference the module at `path` with automatic convention
    /// selection.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_convention(path, CallingConvention::Auto)
    }

    /// Reference the module at `path` with an explicit convention.
    pub fn with_convention(path: impl Into<PathBuf>, convention: CallingConvention) -> Self {
        Self {
            path: path.into(),
            convention,
            state: Mutex::new(LoadState::Unresolved),
            symbols: Mutex::new(HashMap::new()),
        }
    }

    /// Path this reference was constructed with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Convention requested at construction (possibly `Auto`).
    pub fn requested_convention(&self) -> CallingConvention {
        self.convention
    }

    /// Whether the module has been loaded successfully.
    pub fn is_loaded(&self) -> bool {
        matches!(&*self.state.lock(), LoadState::Resolved { .. })
    }

    /// Resolve the handle, loading the module on first use.
    ///
    /// A failed load is terminal: every later call returns
    /// [`Error::LoadFailure`] with the recorded reason.
    pub fn ensure_loaded(&self) -> Result<(Arc<Library>, CallingConvention)> {
        let mut state = self.state.lock();
        match &*state {
            LoadState::Resolved { library, convention } => {
                Ok((Arc::clone(library), *convention))
            }
            LoadState::Failed { reason } => Err(Error::LoadFailure {
                path: self.path.display().to_string(),
                reason: reason.clone(),
            }),
            LoadState::Unresolved => {
                let convention = self.convention.resolve(&self.path);
                match load_module(&self.path, convention) {
                    Ok(library) => {
                        debug!("loaded {} ({})", self.path.display(), convention);
                        let library = Arc::new(library);
                        *state = LoadState::Resolved {
                            library: Arc::clone(&library),
                            convention,
                        };
                        Ok((library, convention))
                    }
                    Err(err) => {
                        let reason = match &err {
                            Error::LoadFailure { reason, .. } => reason.clone(),
                            other => other.to_string(),
                        };
                        *state = LoadState::Failed { reason };
                        Err(err)
                    }
                }
            }
        }
    }

    /// Look up an exported function address by name, caching the
    /// result. A missing export is a deployment defect and surfaces as
    /// [`Error::LoadFailure`].
    pub fn symbol(&self, name: &str) -> Result<usize> {
        if let Some(&addr) = self.symbols.lock().get(name) {
            return Ok(addr);
        }

        let (library, _) = self.ensure_loaded()?;
        let c_name = CString::new(name)
            .map_err(|_| Error::InvalidArgument(format!("invalid symbol name: {:?}", name)))?;

        // Safety: the symbol is only taken as an address; its type is
        // imposed at the call site from the registered Signature.
        let symbol: libloading::Symbol<'_, *const ()> = unsafe {
            library.get(c_name.as_bytes_with_nul()).map_err(|e| Error::LoadFailure {
                path: self.path.display().to_string(),
                reason: format!("symbol {:?} not found: {}", name, e),
            })?
        };

        let addr = *symbol as usize;
        self.symbols.lock().insert(name.to_string(), addr);
        Ok(addr)
    }
}

/// Load the module with the loader for a concrete convention.
///
/// Both supported conventions go through the platform loader; the
/// convention matters at call time, where it selects the function
/// pointer ABI. `Auto` never reaches this point; it is resolved by
/// [`ReferenceLibrary::ensure_loaded`] first.
fn load_module(path: &Path, convention: CallingConvention) -> Result<Library> {
    match convention {
        CallingConvention::Cdecl | CallingConvention::StdCall => {
            // Safety: loading runs the module's initialization code.
            // The path is supplied by the caller, who is trusting the
            // deployment environment that shipped the module.
            unsafe { Library::new(path) }.map_err(|e| Error::LoadFailure {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        }
        CallingConvention::Auto => Err(Error::UnsupportedConvention("auto".to_string())),
    }
}
