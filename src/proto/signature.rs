//! Function prototypes for the native export surface.
//!
//! Every export of the native suite follows the shape
//! `int {PREFIX}_{Operation}(in_params..., [out_buffer, out_size])`
//! where all parameters are pointer sized. A [`Signature`] records the
//! parameter tags so call sites are validated before dispatch, and the
//! two builder functions produce the prototype sets shared by every
//! library flavor.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Parameter type tags for native prototypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// NUL-terminated input text (`const char *`).
    Text,
    /// Caller-allocated output buffer (`char *`).
    OutBuffer,
    /// Capacity-in/size-out integer cell (`int *`).
    OutLen,
}

/// Return type tag. Every known export returns a platform `int`
/// status, so `CInt` is the default and currently the only variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnType {
    #[default]
    CInt,
}

/// Immutable description of one native function.
#[derive(Debug, Clone)]
pub struct Signature {
    params: Vec<ParamType>,
    ret: ReturnType,
}

impl Signature {
    /// Describe a function by its parameter tags. The slice is copied
    /// at construction, so later mutation of the source never affects
    /// the signature.
    pub fn new(params: &[ParamType]) -> Self {
        Self {
            params: params.to_vec(),
            ret: ReturnType::default(),
        }
    }

    /// Describe a function with an explicit return type tag.
    pub fn with_return(params: &[ParamType], ret: ReturnType) -> Self {
        Self {
            params: params.to_vec(),
            ret,
        }
    }

    /// Parameter tags, in call order.
    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    /// Return type tag.
    pub fn return_type(&self) -> ReturnType {
        self.ret
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Prototype registry: fully-qualified export name to signature.
pub type Prototypes = HashMap<String, Signature>;

/// Build the "library methods" prototype set shared by every flavor:
/// initialize, finalize, last-return-message, name and version.
///
/// `excludes` removes fully-qualified names (e.g. `CEP_UltimoRetorno`)
/// for flavors that do not ship a given standard operation; excluding
/// a name the set does not contain is an error.
pub fn common_method_prototypes(prefix: &str, excludes: &[&str]) -> Result<Prototypes> {
    use ParamType::{OutBuffer, OutLen, Text};

    let mut prototypes = Prototypes::new();
    // eArqConfig, eChaveCrypt
    prototypes.insert(format!("{}_Inicializar", prefix), Signature::new(&[Text, Text]));
    prototypes.insert(format!("{}_Finalizar", prefix), Signature::new(&[]));
    // sMensagem, esTamanho
    prototypes.insert(
        format!("{}_UltimoRetorno", prefix),
        Signature::new(&[OutBuffer, OutLen]),
    );
    prototypes.insert(format!("{}_Nome", prefix), Signature::new(&[OutBuffer, OutLen]));
    prototypes.insert(format!("{}_Versao", prefix), Signature::new(&[OutBuffer, OutLen]));
    apply_excludes(prototypes, excludes)
}

/// Build the "configuration methods" prototype set shared by every
/// flavor: read/write the configuration file, read/write a single
/// value, import and export.
pub fn config_method_prototypes(prefix: &str, excludes: &[&str]) -> Result<Prototypes> {
    use ParamType::{OutBuffer, OutLen, Text};

    let mut prototypes = Prototypes::new();
    // eArqConfig
    prototypes.insert(format!("{}_ConfigLer", prefix), Signature::new(&[Text]));
    prototypes.insert(format!("{}_ConfigGravar", prefix), Signature::new(&[Text]));
    // eSessao, eChave, sValor, esTamanho
    prototypes.insert(
        format!("{}_ConfigLerValor", prefix),
        Signature::new(&[Text, Text, OutBuffer, OutLen]),
    );
    // eSessao, eChave, sValor
    prototypes.insert(
        format!("{}_ConfigGravarValor", prefix),
        Signature::new(&[Text, Text, Text]),
    );
    prototypes.insert(format!("{}_ConfigImportar", prefix), Signature::new(&[Text]));
    prototypes.insert(
        format!("{}_ConfigExportar", prefix),
        Signature::new(&[OutBuffer, OutLen]),
    );
    apply_excludes(prototypes, excludes)
}

fn apply_excludes(mut prototypes: Prototypes, excludes: &[&str]) -> Result<Prototypes> {
    for name in excludes {
        if prototypes.remove(*name).is_none() {
            return Err(Error::UnknownMethod((*name).to_string()));
        }
    }
    Ok(prototypes)
}
