//! Dynamic binding core.
//!
//! Everything flavor-independent lives here: calling-convention
//! selection, lazy module loading, the prototype registry, the
//! invocation core and the growable-buffer string protocol.
//!
//! # Architecture
//!
//! ```text
//! flavor surface (e.g. cep::AcbrLibCep)
//!       │  CommonMethods / ConfigMethods / domain operations
//!       ▼
//! NativeBinding          prototype check, marshaling, status mapping
//!       │
//!       ▼
//! ReferenceLibrary       lazy load, convention resolution, symbols
//!       │
//!       ▼
//! libloading             {PREFIX}_{Operation} exports
//! ```

mod api;
mod binding;
mod buffer;
mod convention;
mod library;
mod signature;

pub use api::{CommonMethods, ConfigMethods, NativeApi};
pub use binding::{CallArg, NativeBinding, TextEncoding};
pub use buffer::BUFFER_LENGTH;
pub use convention::CallingConvention;
pub use library::ReferenceLibrary;
pub use signature::{
    common_method_prototypes, config_method_prototypes, ParamType, Prototypes, ReturnType,
    Signature,
};

#[cfg(test)]
mod tests;
