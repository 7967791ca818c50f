//! Safe Rust binding for the ACBrLibCEP shared library.
//!
//! ACBrLibCEP is the CEP (Brazilian postal code) flavor of the ACBrLib
//! suite: a pre-built native module exposing a C-style API whose
//! exports follow the shape
//! `int CEP_{Operation}(in_params..., [out_buffer, out_size])`.
//! This crate performs no address resolution itself: it loads the
//! module with the right calling convention, marshals NUL-terminated
//! strings and fixed-size output buffers across the boundary, and
//! parses the module's INI-like responses into typed records.
//!
//! # Architecture
//!
//! ```text
//! AcbrLibCep                       flavor surface (CEP_* exports)
//!       │  CommonMethods / ConfigMethods / buscar_*
//!       ▼
//! NativeBinding                    prototype check, marshaling,
//!       │                          status mapping, buffer protocol
//!       ▼
//! ReferenceLibrary                 lazy load, convention resolution,
//!       │                          symbol cache
//!       ▼
//! libloading                       dlopen / LoadLibrary
//! ```
//!
//! # Example
//!
//! ```no_run
//! use acbrlib_cep::{AcbrLibCep, CallingConvention, CommonMethods};
//!
//! fn main() -> acbrlib_cep::Result<()> {
//!     AcbrLibCep::session(
//!         "/usr/lib/libacbrcep64.so",
//!         CallingConvention::Auto,
//!         "", // arquivo INI
//!         "", // chave de criptografia
//!         |cep| {
//!             println!("{}, versao {}", cep.nome()?, cep.versao()?);
//!             for endereco in cep.buscar_por_cep("18270-170")? {
//!                 println!("{}", endereco);
//!             }
//!             Ok(())
//!         },
//!     )
//! }
//! ```
//!
//! Every operation either returns a value or fails with a typed
//! [`Error`]; native status codes never escape raw. The only automatic
//! retry anywhere is the single buffer-resize follow-up of the
//! growable-buffer string protocol, which is protocol-specified
//! behavior rather than error recovery.

pub mod cep;
pub mod error;
pub mod proto;

pub use cep::{processar_resposta, AcbrLibCep, Endereco, WebserviceCep};
pub use error::{Error, Result};
pub use proto::{
    CallingConvention, CommonMethods, ConfigMethods, NativeApi, TextEncoding, BUFFER_LENGTH,
};
