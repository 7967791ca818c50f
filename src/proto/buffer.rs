//! Growable-buffer string retrieval.
//!
//! Native text queries write into a caller-supplied buffer and report
//! the used size through an integer cell. When the output does not
//! fit, the module still reports success and writes the *required*
//! size into the cell; the payload is then fetched once through the
//! last-return-message operation with a buffer of exactly that size.
//! That follow-up is assumed to fit; it never re-enters truncation
//! handling, so there is at most one retry per read.

use std::os::raw::c_int;

use log::trace;

use crate::error::{Error, Result};

/// Default initial capacity for buffered reads.
pub const BUFFER_LENGTH: usize = 1024;

/// Drive one buffered read.
///
/// `call` performs the native call against the supplied buffer and
/// size cell and returns the raw status. On truncation, `last_message`
/// is invoked exactly once with the required size and its result is
/// returned as-is, so a second retry is impossible by construction. A
/// non-zero status is mapped through `on_failure`.
pub(crate) fn read_buffered<C, L, E>(
    buffer_len: usize,
    call: C,
    last_message: L,
    on_failure: E,
) -> Result<Vec<u8>>
where
    C: FnOnce(&mut [u8], &mut c_int) -> Result<c_int>,
    L: FnOnce(usize) -> Result<Vec<u8>>,
    E: FnOnce(c_int) -> Error,
{
    let mut buf = vec![0u8; buffer_len.max(1)];
    let mut size = buf.len() as c_int;
    let status = call(&mut buf, &mut size)?;
    if status != 0 {
        return Err(on_failure(status));
    }
    let reported = size.max(0) as usize;
    if reported > buf.len() {
        trace!("buffered read truncated: capacity {}, required {}", buf.len(), reported);
        return last_message(reported);
    }
    Ok(until_nul(&buf).to_vec())
}

/// Slice a C string buffer up to its first NUL.
pub(crate) fn until_nul(buf: &[u8]) -> &[u8] {
    match buf.iter().position(|&b| b == 0) {
        Some(pos) => &buf[..pos],
        None => buf,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn write_cstr(buf: &mut [u8], text: &[u8]) {
        buf[..text.len()].copy_from_slice(text);
        if text.len() < buf.len() {
            buf[text.len()] = 0;
        }
    }

    #[test]
    fn fits_in_initial_buffer() {
        let calls = Cell::new(0usize);
        let result = read_buffered(
            16,
            |buf, size| {
                calls.set(calls.get() + 1);
                write_cstr(buf, b"ACBrLibCEP");
                *size = 10;
                Ok(0)
            },
            |_| panic!("no fallback expected"),
            |_| panic!("no failure expected"),
        )
        .unwrap();
        assert_eq!(result, b"ACBrLibCEP");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn exact_fit_is_not_a_truncation() {
        let result = read_buffered(
            4,
            |buf, size| {
                write_cstr(buf, b"abcd");
                *size = 4;
                Ok(0)
            },
            |_| panic!("no fallback expected"),
            |_| panic!("no failure expected"),
        )
        .unwrap();
        assert_eq!(result, b"abcd");
    }

    #[test]
    fn truncation_triggers_single_fallback() {
        let first_calls = Cell::new(0usize);
        let fallback_calls = Cell::new(0usize);
        let result = read_buffered(
            8,
            |buf, size| {
                first_calls.set(first_calls.get() + 1);
                write_cstr(buf, b"trunc");
                *size = 100;
                Ok(0)
            },
            |required| {
                fallback_calls.set(fallback_calls.get() + 1);
                assert_eq!(required, 100);
                Ok(b"payload completo".to_vec())
            },
            |_| panic!("no failure expected"),
        )
        .unwrap();
        assert_eq!(result, b"payload completo");
        assert_eq!(first_calls.get(), 1);
        assert_eq!(fallback_calls.get(), 1);
    }

    #[test]
    fn fallback_is_returned_as_is_without_second_retry() {
        // Even a fallback that would itself look truncated is accepted
        // verbatim; the protocol allows exactly one follow-up.
        let first_calls = Cell::new(0usize);
        let fallback_calls = Cell::new(0usize);
        let result = read_buffered(
            4,
            |_, size| {
                first_calls.set(first_calls.get() + 1);
                *size = 4096;
                Ok(0)
            },
            |_| {
                fallback_calls.set(fallback_calls.get() + 1);
                Ok(b"curto".to_vec())
            },
            |_| panic!("no failure expected"),
        )
        .unwrap();
        assert_eq!(result, b"curto");
        assert_eq!(first_calls.get(), 1);
        assert_eq!(fallback_calls.get(), 1);
    }

    #[test]
    fn non_zero_status_maps_through_on_failure() {
        let err = read_buffered(
            8,
            |_, _| Ok(-10),
            |_| panic!("no fallback expected"),
            |status| Error::native("CEP_Versao", status, &[(-10, "falha na execucao")]),
        )
        .unwrap_err();
        match err {
            Error::NativeCallFailure { method, code, message } => {
                assert_eq!(method, "CEP_Versao");
                assert_eq!(code, -10);
                assert_eq!(message, "falha na execucao");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn call_errors_propagate_untouched() {
        let err = read_buffered(
            8,
            |_, _| Err(Error::UnknownMethod("CEP_Inexistente".to_string())),
            |_| panic!("no fallback expected"),
            |_| panic!("no failure expected"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownMethod(name) if name == "CEP_Inexistente"));
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        read_buffered(
            0,
            |buf, size| {
                assert_eq!(buf.len(), 1);
                *size = 0;
                Ok(0)
            },
            |_| panic!("no fallback expected"),
            |_| panic!("no failure expected"),
        )
        .unwrap();
    }

    #[test]
    fn until_nul_slices_at_terminator() {
        assert_eq!(until_nul(b"abc\0def"), b"abc");
        assert_eq!(until_nul(b"abc"), b"abc");
        assert_eq!(until_nul(b"\0"), b"");
    }
}
