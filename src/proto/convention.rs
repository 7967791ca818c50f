//! Calling-convention selection.
//!
//! The native suite ships both `cdecl` and `stdcall` builds; the
//! convention a module expects must be matched at call time or the
//! stack is corrupted. `Auto` infers the convention from the library
//! path the way the suite's own tooling does: Windows module
//! extensions mean the `stdcall` build.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::Error;

/// Binary-level calling convention used when invoking native exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallingConvention {
    /// Infer from the library path at load time: a `.dll` extension
    /// selects [`CallingConvention::StdCall`], anything else
    /// [`CallingConvention::Cdecl`].
    #[default]
    Auto,
    /// Platform C convention.
    Cdecl,
    /// Windows `stdcall`. Maps to `extern "system"`, which is the
    /// platform C convention everywhere but 32-bit Windows.
    StdCall,
}

impl CallingConvention {
    /// Resolve `Auto` to a concrete convention for the given library
    /// path. Performed exactly once, at load time; concrete selectors
    /// resolve to themselves.
    pub fn resolve(self, path: &Path) -> CallingConvention {
        match self {
            CallingConvention::Auto => {
                if has_windows_module_extension(path) {
                    CallingConvention::StdCall
                } else {
                    CallingConvention::Cdecl
                }
            }
            concrete => concrete,
        }
    }
}

impl fmt::Display for CallingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallingConvention::Auto => write!(f, "auto"),
            CallingConvention::Cdecl => write!(f, "cdecl"),
            CallingConvention::StdCall => write!(f, "stdcall"),
        }
    }
}

impl FromStr for CallingConvention {
    type Err = Error;

    /// Parse a selector name. The set is closed: anything but `auto`,
    /// `cdecl` or `stdcall` fails with
    /// [`Error::UnsupportedConvention`] carrying the offending value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(CallingConvention::Auto),
            "cdecl" => Ok(CallingConvention::Cdecl),
            "stdcall" => Ok(CallingConvention::StdCall),
            other => Err(Error::UnsupportedConvention(other.to_string())),
        }
    }
}

fn has_windows_module_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("dll"))
        .unwrap_or(false)
}
