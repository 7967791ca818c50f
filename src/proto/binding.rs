//! Invocation core.
//!
//! [`NativeBinding`] ties a function-name prefix, a lazily loaded
//! module and a prototype registry together. `invoke` validates the
//! call against the registered [`Signature`], marshals the arguments
//! as pointer-sized words and dispatches through a function pointer
//! typed by the resolved calling convention. Status interpretation is
//! left to each operation, since the meaning of non-zero codes is
//! operation-specific.

use std::ffi::{CStr, CString};
use std::os::raw::c_int;

use log::trace;

use crate::error::{Error, Result};
use crate::proto::buffer::{read_buffered, until_nul, BUFFER_LENGTH};
use crate::proto::convention::CallingConvention;
use crate::proto::library::ReferenceLibrary;
use crate::proto::signature::{ParamType, Prototypes, Signature};

/// Text encoding used for strings crossing the native boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// ISO-8859-1, for legacy Windows deployments of the native suite.
    Latin1,
}

/// One marshaled argument for [`NativeBinding::invoke`].
pub enum CallArg<'a> {
    /// NUL-terminated input text.
    Text(&'a CStr),
    /// Caller-allocated output buffer.
    OutBuffer(&'a mut [u8]),
    /// Capacity-in/size-out integer cell.
    OutLen(&'a mut c_int),
}

impl CallArg<'_> {
    fn kind(&self) -> ParamType {
        match self {
            CallArg::Text(_) => ParamType::Text,
            CallArg::OutBuffer(_) => ParamType::OutBuffer,
            CallArg::OutLen(_) => ParamType::OutLen,
        }
    }

    fn word(&mut self) -> usize {
        match self {
            CallArg::Text(text) => text.as_ptr() as usize,
            CallArg::OutBuffer(buf) => buf.as_mut_ptr() as usize,
            CallArg::OutLen(cell) => {
                let ptr: *mut c_int = &mut **cell;
                ptr as usize
            }
        }
    }
}

/// Failure table for `{prefix}_UltimoRetorno`.
const ULTIMO_RETORNO_ERROS: &[(c_int, &str)] = &[(-10, "Falha na execucao do metodo")];

/// Binds a prefix, a module reference and a prototype registry into a
/// callable surface.
pub struct NativeBinding {
    prefix: String,
    library: ReferenceLibrary,
    prototypes: Prototypes,
    encoding: TextEncoding,
}

impl NativeBinding {
    pub fn new(
        prefix: impl Into<String>,
        library: ReferenceLibrary,
        prototypes: Prototypes,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            library,
            prototypes,
            encoding: TextEncoding::default(),
        }
    }

    /// Select the text encoding used across the native boundary.
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn library(&self) -> &ReferenceLibrary {
        &self.library
    }

    pub fn prototypes(&self) -> &Prototypes {
        &self.prototypes
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Fully-qualified export name for an operation suffix.
    pub fn method(&self, suffix: &str) -> String {
        format!("{}_{}", self.prefix, suffix)
    }

    /// Encode caller text for the native boundary.
    pub fn encode(&self, value: &str) -> Result<CString> {
        let bytes = match self.encoding {
            TextEncoding::Utf8 => value.as_bytes().to_vec(),
            TextEncoding::Latin1 => value
                .chars()
                .map(|ch| {
                    let code = ch as u32;
                    if code <= 0xFF {
                        Ok(code as u8)
                    } else {
                        Err(Error::InvalidArgument(format!(
                            "character {:?} is not representable in Latin-1",
                            ch
                        )))
                    }
                })
                .collect::<Result<Vec<u8>>>()?,
        };
        CString::new(bytes)
            .map_err(|_| Error::InvalidArgument("text contains an interior NUL byte".to_string()))
    }

    /// Decode native bytes (without trailing NUL) into owned text.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self.encoding {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        }
    }

    /// Invoke a named export, returning the raw status code.
    ///
    /// The method must be present in the prototype registry and the
    /// arguments must match its signature; both checks happen before
    /// any load attempt, so programmer errors fail fast even with no
    /// module present.
    pub fn invoke(&self, method: &str, args: &mut [CallArg<'_>]) -> Result<c_int> {
        let signature = self
            .prototypes
            .get(method)
            .ok_or_else(|| Error::UnknownMethod(method.to_string()))?;
        check_args(method, signature, args)?;

        let (_library, convention) = self.library.ensure_loaded()?;
        let addr = self.library.symbol(method)?;

        let words: Vec<usize> = args.iter_mut().map(|arg| arg.word()).collect();
        trace!("invoke {} ({} args, {})", method, words.len(), convention);

        // Safety: the address came from the loaded module, the word
        // list matches the registered prototype, and every referenced
        // buffer outlives the call (still borrowed through `args`).
        unsafe { dispatch(addr, convention, &words) }
    }

    /// Invoke and map a non-zero status through a per-operation table.
    pub fn call_status(
        &self,
        method: &str,
        args: &mut [CallArg<'_>],
        errors: &[(c_int, &str)],
    ) -> Result<()> {
        let status = self.invoke(method, args)?;
        if status == 0 {
            Ok(())
        } else {
            Err(Error::native(method, status, errors))
        }
    }

    /// Single-shot buffered read: no truncation retry, non-zero status
    /// mapped through `errors`.
    pub fn read_direct(
        &self,
        method: &str,
        texts: &[&str],
        buffer_len: usize,
        errors: &[(c_int, &str)],
    ) -> Result<String> {
        let ctexts = self.encode_all(texts)?;
        let mut buf = vec![0u8; buffer_len.max(1)];
        let mut size = buf.len() as c_int;
        let mut args = buffered_args(&ctexts, &mut buf, &mut size);
        let status = self.invoke(method, &mut args)?;
        if status != 0 {
            return Err(Error::native(method, status, errors));
        }
        Ok(self.decode(until_nul(&buf)))
    }

    /// Buffered read with the growable-buffer truncation protocol and
    /// the default initial capacity.
    pub fn read_string_buffer(
        &self,
        method: &str,
        texts: &[&str],
        errors: &[(c_int, &str)],
    ) -> Result<String> {
        self.read_string_buffer_len(method, texts, BUFFER_LENGTH, errors)
    }

    /// Buffered read with the growable-buffer truncation protocol and
    /// an explicit initial capacity.
    pub fn read_string_buffer_len(
        &self,
        method: &str,
        texts: &[&str],
        buffer_len: usize,
        errors: &[(c_int, &str)],
    ) -> Result<String> {
        let ctexts = self.encode_all(texts)?;
        let bytes = read_buffered(
            buffer_len,
            |buf, size| {
                let mut args = buffered_args(&ctexts, buf, size);
                self.invoke(method, &mut args)
            },
            |required| self.ultimo_retorno_bytes(required),
            |status| Error::native(method, status, errors),
        )?;
        Ok(self.decode(&bytes))
    }

    /// Read the message left by the last native call, with a buffer of
    /// exactly `buffer_len` bytes. Used directly and as the truncation
    /// fallback of the buffered protocol; never re-enters truncation
    /// handling.
    pub fn ultimo_retorno(&self, buffer_len: usize) -> Result<String> {
        let bytes = self.ultimo_retorno_bytes(buffer_len)?;
        Ok(self.decode(&bytes))
    }

    fn ultimo_retorno_bytes(&self, buffer_len: usize) -> Result<Vec<u8>> {
        let method = self.method("UltimoRetorno");
        let mut buf = vec![0u8; buffer_len.max(1)];
        let mut size = buf.len() as c_int;
        let mut args = [CallArg::OutBuffer(&mut buf), CallArg::OutLen(&mut size)];
        let status = self.invoke(&method, &mut args)?;
        if status != 0 {
            return Err(Error::native(&method, status, ULTIMO_RETORNO_ERROS));
        }
        Ok(until_nul(&buf).to_vec())
    }

    fn encode_all(&self, texts: &[&str]) -> Result<Vec<CString>> {
        texts.iter().map(|text| self.encode(text)).collect()
    }
}

fn check_args(method: &str, signature: &Signature, args: &[CallArg<'_>]) -> Result<()> {
    if args.len() != signature.arity() {
        return Err(Error::InvalidArgument(format!(
            "{} expects {} argument(s), got {}",
            method,
            signature.arity(),
            args.len()
        )));
    }
    for (arg, param) in args.iter().zip(signature.params()) {
        if arg.kind() != *param {
            return Err(Error::InvalidArgument(format!(
                "{}: argument kind {:?} does not match prototype {:?}",
                method,
                arg.kind(),
                param
            )));
        }
    }
    Ok(())
}

/// Append the output buffer and size cell to the input texts, in the
/// trailing-output-parameter order every buffered export uses.
fn buffered_args<'a>(
    ctexts: &'a [CString],
    buf: &'a mut [u8],
    size: &'a mut c_int,
) -> Vec<CallArg<'a>> {
    let mut args: Vec<CallArg<'a>> = ctexts
        .iter()
        .map(|text| CallArg::Text(text.as_c_str()))
        .collect();
    args.push(CallArg::OutBuffer(buf));
    args.push(CallArg::OutLen(size));
    args
}

/// Perform the native call.
///
/// # Safety
///
/// `addr` must be an export of a currently loaded module whose real
/// prototype takes `args.len()` pointer-sized parameters under
/// `convention` and returns a platform `int`.
unsafe fn dispatch(addr: usize, convention: CallingConvention, args: &[usize]) -> Result<c_int> {
    match convention {
        CallingConvention::Cdecl => dispatch_cdecl(addr, args),
        CallingConvention::StdCall => dispatch_stdcall(addr, args),
        // Resolved to a concrete convention at load time; kept total so
        // there is no panic path through the dispatcher.
        CallingConvention::Auto => Err(Error::UnsupportedConvention("auto".to_string())),
    }
}

// One transmute per arity: the exact parameter count must be known at
// compile time. Arity 7 is the widest prototype in the suite
// (lookup-by-attributes: five texts plus buffer and size).

unsafe fn dispatch_cdecl(addr: usize, args: &[usize]) -> Result<c_int> {
    use std::mem::transmute;

    type Fn0 = unsafe extern "C" fn() -> c_int;
    type Fn1 = unsafe extern "C" fn(usize) -> c_int;
    type Fn2 = unsafe extern "C" fn(usize, usize) -> c_int;
    type Fn3 = unsafe extern "C" fn(usize, usize, usize) -> c_int;
    type Fn4 = unsafe extern "C" fn(usize, usize, usize, usize) -> c_int;
    type Fn5 = unsafe extern "C" fn(usize, usize, usize, usize, usize) -> c_int;
    type Fn6 = unsafe extern "C" fn(usize, usize, usize, usize, usize, usize) -> c_int;
    type Fn7 = unsafe extern "C" fn(usize, usize, usize, usize, usize, usize, usize) -> c_int;

    Ok(match args {
        &[] => transmute::<usize, Fn0>(addr)(),
        &[a] => transmute::<usize, Fn1>(addr)(a),
        &[a, b] => transmute::<usize, Fn2>(addr)(a, b),
        &[a, b, c] => transmute::<usize, Fn3>(addr)(a, b, c),
        &[a, b, c, d] => transmute::<usize, Fn4>(addr)(a, b, c, d),
        &[a, b, c, d, e] => transmute::<usize, Fn5>(addr)(a, b, c, d, e),
        &[a, b, c, d, e, f] => transmute::<usize, Fn6>(addr)(a, b, c, d, e, f),
        &[a, b, c, d, e, f, g] => transmute::<usize, Fn7>(addr)(a, b, c, d, e, f, g),
        _ => {
            return Err(Error::InvalidArgument(format!(
                "native calls support at most 7 parameters, got {}",
                args.len()
            )))
        }
    })
}

unsafe fn dispatch_stdcall(addr: usize, args: &[usize]) -> Result<c_int> {
    use std::mem::transmute;

    type Fn0 = unsafe extern "system" fn() -> c_int;
    type Fn1 = unsafe extern "system" fn(usize) -> c_int;
    type Fn2 = unsafe extern "system" fn(usize, usize) -> c_int;
    type Fn3 = unsafe extern "system" fn(usize, usize, usize) -> c_int;
    type Fn4 = unsafe extern "system" fn(usize, usize, usize, usize) -> c_int;
    type Fn5 = unsafe extern "system" fn(usize, usize, usize, usize, usize) -> c_int;
    type Fn6 = unsafe extern "system" fn(usize, usize, usize, usize, usize, usize) -> c_int;
    type Fn7 = unsafe extern "system" fn(usize, usize, usize, usize, usize, usize, usize) -> c_int;

    Ok(match args {
        &[] => transmute::<usize, Fn0>(addr)(),
        &[a] => transmute::<usize, Fn1>(addr)(a),
        &[a, b] => transmute::<usize, Fn2>(addr)(a, b),
        &[a, b, c] => transmute::<usize, Fn3>(addr)(a, b, c),
        &[a, b, c, d] => transmute::<usize, Fn4>(addr)(a, b, c, d),
        &[a, b, c, d, e] => transmute::<usize, Fn5>(addr)(a, b, c, d, e),
        &[a, b, c, d, e, f] => transmute::<usize, Fn6>(addr)(a, b, c, d, e, f),
        &[a, b, c, d, e, f, g] => transmute::<usize, Fn7>(addr)(a, b, c, d, e, f, g),
        _ => {
            return Err(Error::InvalidArgument(format!(
                "native calls support at most 7 parameters, got {}",
                args.len()
            )))
        }
    })
}
