//! Binding core tests.

use std::os::raw::c_int;
use std::path::Path;

use super::*;
use crate::error::Error;

// =============================================================================
// Calling convention
// =============================================================================

#[test]
fn auto_resolves_stdcall_for_windows_module_extensions() {
    let auto = CallingConvention::Auto;
    assert_eq!(
        auto.resolve(Path::new("C:\\ACBr\\ACBrCEP32.dll")),
        CallingConvention::StdCall
    );
    assert_eq!(
        auto.resolve(Path::new("C:\\ACBr\\ACBrCEP64.DLL")),
        CallingConvention::StdCall
    );
    assert_eq!(auto.resolve(Path::new("acbrcep.Dll")), CallingConvention::StdCall);
}

#[test]
fn auto_resolves_cdecl_for_anything_else() {
    let auto = CallingConvention::Auto;
    assert_eq!(
        auto.resolve(Path::new("/usr/lib/libacbrcep64.so")),
        CallingConvention::Cdecl
    );
    assert_eq!(
        auto.resolve(Path::new("libacbrcep.dylib")),
        CallingConvention::Cdecl
    );
    assert_eq!(auto.resolve(Path::new("acbrcep")), CallingConvention::Cdecl);
}

#[test]
fn concrete_conventions_resolve_to_themselves() {
    assert_eq!(
        CallingConvention::Cdecl.resolve(Path::new("acbrcep.dll")),
        CallingConvention::Cdecl
    );
    assert_eq!(
        CallingConvention::StdCall.resolve(Path::new("libacbrcep.so")),
        CallingConvention::StdCall
    );
}

#[test]
fn convention_parsing_round_trips() {
    for convention in [
        CallingConvention::Auto,
        CallingConvention::Cdecl,
        CallingConvention::StdCall,
    ] {
        assert_eq!(convention.to_string().parse::<CallingConvention>().unwrap(), convention);
    }
}

#[test]
fn unknown_convention_selector_fails_closed() {
    let err = "pascal".parse::<CallingConvention>().unwrap_err();
    assert!(matches!(err, Error::UnsupportedConvention(name) if name == "pascal"));
}

// =============================================================================
// Signatures and prototype sets
// =============================================================================

#[test]
fn signature_params_are_a_defensive_copy() {
    let mut source = vec![ParamType::Text, ParamType::Text];
    let signature = Signature::new(&source);

    source.push(ParamType::OutLen);
    assert_eq!(signature.params(), &[ParamType::Text, ParamType::Text]);
    assert_eq!(signature.arity(), 2);
    assert_eq!(signature.return_type(), ReturnType::CInt);
}

#[test]
fn common_method_prototypes_full_set() {
    let prototypes = common_method_prototypes("CEP", &[]).unwrap();
    assert_eq!(prototypes.len(), 5);
    for name in [
        "CEP_Inicializar",
        "CEP_Finalizar",
        "CEP_UltimoRetorno",
        "CEP_Nome",
        "CEP_Versao",
    ] {
        assert!(prototypes.contains_key(name), "missing {}", name);
    }
    assert_eq!(
        prototypes["CEP_Inicializar"].params(),
        &[ParamType::Text, ParamType::Text]
    );
    assert_eq!(prototypes["CEP_Finalizar"].arity(), 0);
    assert_eq!(
        prototypes["CEP_UltimoRetorno"].params(),
        &[ParamType::OutBuffer, ParamType::OutLen]
    );
}

#[test]
fn common_method_prototypes_excludes_named_operations() {
    let prototypes = common_method_prototypes("CEP", &["CEP_Finalizar"]).unwrap();
    assert_eq!(prototypes.len(), 4);
    assert!(!prototypes.contains_key("CEP_Finalizar"));
    assert!(prototypes.contains_key("CEP_Inicializar"));
}

#[test]
fn excluding_an_absent_operation_is_an_error() {
    let err = common_method_prototypes("CEP", &["CEP_Inexistente"]).unwrap_err();
    assert!(matches!(err, Error::UnknownMethod(name) if name == "CEP_Inexistente"));
}

#[test]
fn config_method_prototypes_full_set() {
    let prototypes = config_method_prototypes("NFE", &[]).unwrap();
    assert_eq!(prototypes.len(), 6);
    for name in [
        "NFE_ConfigLer",
        "NFE_ConfigGravar",
        "NFE_ConfigLerValor",
        "NFE_ConfigGravarValor",
        "NFE_ConfigImportar",
        "NFE_ConfigExportar",
    ] {
        assert!(prototypes.contains_key(name), "missing {}", name);
    }
    assert_eq!(
        prototypes["NFE_ConfigLerValor"].params(),
        &[
            ParamType::Text,
            ParamType::Text,
            ParamType::OutBuffer,
            ParamType::OutLen
        ]
    );
}

#[test]
fn config_method_prototypes_excludes_named_operations() {
    let prototypes =
        config_method_prototypes("DIS", &["DIS_ConfigImportar", "DIS_ConfigExportar"]).unwrap();
    assert_eq!(prototypes.len(), 4);
    assert!(!prototypes.contains_key("DIS_ConfigImportar"));
    assert!(!prototypes.contains_key("DIS_ConfigExportar"));
}

// =============================================================================
// Reference library
// =============================================================================

#[test]
fn construction_does_not_load() {
    let library = ReferenceLibrary::new("/nonexistent/libacbrcep64.so");
    assert!(!library.is_loaded());
    assert_eq!(library.requested_convention(), CallingConvention::Auto);
}

#[test]
fn load_failure_is_memoized() {
    let library = ReferenceLibrary::new("/nonexistent/libacbrcep64.so");

    let first = library.ensure_loaded().unwrap_err();
    assert!(matches!(first, Error::LoadFailure { .. }));
    assert!(!library.is_loaded());

    // The failed state is terminal; the second attempt reports the
    // recorded reason without touching the filesystem again.
    let second = library.ensure_loaded().unwrap_err();
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn symbol_lookup_on_a_missing_library_fails_with_load_failure() {
    let library = ReferenceLibrary::new("/nonexistent/libacbrcep64.so");
    let err = library.symbol("CEP_Nome").unwrap_err();
    assert!(matches!(err, Error::LoadFailure { .. }));
}

// =============================================================================
// Invocation core (no native module required)
// =============================================================================

fn binding_without_module() -> NativeBinding {
    let mut prototypes = common_method_prototypes("CEP", &[]).unwrap();
    prototypes.extend(config_method_prototypes("CEP", &[]).unwrap());
    NativeBinding::new(
        "CEP",
        ReferenceLibrary::new("/nonexistent/libacbrcep64.so"),
        prototypes,
    )
}

#[test]
fn unknown_method_fails_before_any_load_attempt() {
    let binding = binding_without_module();
    let err = binding.invoke("CEP_Inexistente", &mut []).unwrap_err();
    assert!(matches!(err, Error::UnknownMethod(name) if name == "CEP_Inexistente"));
    assert!(!binding.library().is_loaded());
}

#[test]
fn arity_mismatch_fails_before_any_load_attempt() {
    let binding = binding_without_module();
    let arq = binding.encode("acbrlib.ini").unwrap();
    let err = binding
        .invoke("CEP_Inicializar", &mut [CallArg::Text(&arq)])
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(!binding.library().is_loaded());
}

#[test]
fn argument_kind_mismatch_fails_before_any_load_attempt() {
    let binding = binding_without_module();
    let mut size: c_int = 0;
    let mut other: c_int = 0;
    let err = binding
        .invoke(
            "CEP_Inicializar",
            &mut [CallArg::OutLen(&mut size), CallArg::OutLen(&mut other)],
        )
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn well_formed_call_reaches_the_loader() {
    let binding = binding_without_module();
    let err = binding.invoke("CEP_Finalizar", &mut []).unwrap_err();
    assert!(matches!(err, Error::LoadFailure { .. }));
}

#[test]
fn method_joins_prefix_and_suffix() {
    let binding = binding_without_module();
    assert_eq!(binding.method("BuscarPorCEP"), "CEP_BuscarPorCEP");
}

// =============================================================================
// Text encoding
// =============================================================================

#[test]
fn utf8_encode_decode_round_trip() {
    let binding = binding_without_module();
    let encoded = binding.encode("Tatuí, São Paulo").unwrap();
    assert_eq!(binding.decode(encoded.as_bytes()), "Tatuí, São Paulo");
}

#[test]
fn latin1_encodes_to_single_bytes() {
    let binding = binding_without_module().with_encoding(TextEncoding::Latin1);
    let encoded = binding.encode("ação").unwrap();
    assert_eq!(encoded.as_bytes(), &[b'a', 0xE7, 0xE3, b'o']);
    assert_eq!(binding.decode(encoded.as_bytes()), "ação");
}

#[test]
fn latin1_rejects_unrepresentable_characters() {
    let binding = binding_without_module().with_encoding(TextEncoding::Latin1);
    let err = binding.encode("preço em €").unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn interior_nul_is_rejected() {
    let binding = binding_without_module();
    let err = binding.encode("antes\0depois").unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

// =============================================================================
// End-to-end dispatch against a real module
// =============================================================================

#[cfg(target_os = "linux")]
#[test]
fn dispatch_against_libc() {
    // libc is always present on Linux and getpid has the status-code
    // shape: no parameters, int return.
    let mut prototypes = Prototypes::new();
    prototypes.insert("getpid".to_string(), Signature::new(&[]));

    let binding = NativeBinding::new("", ReferenceLibrary::new("libc.so.6"), prototypes);
    let status = binding.invoke("getpid", &mut []).unwrap();
    assert_eq!(status as u32, std::process::id());
    assert!(binding.library().is_loaded());

    // Symbol addresses are cached; a second call goes through the same
    // path and agrees.
    let again = binding.invoke("getpid", &mut []).unwrap();
    assert_eq!(again, status);
}
