//! CEP flavor: address lookup through the ACBrLibCEP shared library.
//!
//! [`AcbrLibCep`] owns the invocation core for the `CEP_*` export
//! surface. The lifecycle and configuration operation sets come from
//! the [`CommonMethods`] and [`ConfigMethods`] capability traits; the
//! domain operations (lookup by CEP number and lookup by street
//! attributes) live here, feeding the native module's textual
//! responses through [`processar_resposta`].

mod constants;
mod model;
mod response;

pub use constants::WebserviceCep;
pub use model::Endereco;
pub use response::processar_resposta;

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::proto::{
    common_method_prototypes, config_method_prototypes, CallingConvention, CommonMethods,
    ConfigMethods, NativeApi, NativeBinding, ParamType, ReferenceLibrary, Signature, TextEncoding,
};

/// Three-letter symbol prefix of this flavor.
const PREFIXO: &str = "CEP";

/// Binding to the ACBrLibCEP shared library.
///
/// Construction only records the module path; the module is loaded on
/// the first native call and the handle is reused for the lifetime of
/// this value. Create one `AcbrLibCep` per library path.
pub struct AcbrLibCep {
    binding: NativeBinding,
}

impl AcbrLibCep {
    /// Reference the native module at `caminho` with automatic
    /// calling-convention selection.
    pub fn new(caminho: impl Into<PathBuf>) -> Result<Self> {
        Self::with_convention(caminho, CallingConvention::Auto)
    }

    /// Reference the native module at `caminho` with an explicit
    /// calling convention.
    pub fn with_convention(
        caminho: impl Into<PathBuf>,
        convencao: CallingConvention,
    ) -> Result<Self> {
        use ParamType::{OutBuffer, OutLen, Text};

        let mut prototipos = common_method_prototypes(PREFIXO, &[])?;
        prototipos.extend(config_method_prototypes(PREFIXO, &[])?);
        // eCEP, sResposta, esTamanho
        prototipos.insert(
            format!("{}_BuscarPorCEP", PREFIXO),
            Signature::new(&[Text, OutBuffer, OutLen]),
        );
        // eCidade, eTipo_Logradouro, eLogradouro, eUF, eBairro,
        // sResposta, esTamanho
        prototipos.insert(
            format!("{}_BuscarPorLogradouro", PREFIXO),
            Signature::new(&[Text, Text, Text, Text, Text, OutBuffer, OutLen]),
        );

        let biblioteca = ReferenceLibrary::with_convention(caminho, convencao);
        Ok(Self {
            binding: NativeBinding::new(PREFIXO, biblioteca, prototipos),
        })
    }

    /// Select the text encoding used across the native boundary.
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.binding = self.binding.with_encoding(encoding);
        self
    }

    /// Scoped session: construct, `inicializar`, run `f`, and
    /// guarantee `finalizar` on every exit path, including when `f`
    /// fails or panics.
    ///
    /// On the normal path a finalization failure is reported; when `f`
    /// itself failed, its error wins and the finalization outcome is
    /// discarded.
    pub fn session<T>(
        caminho: impl Into<PathBuf>,
        convencao: CallingConvention,
        arq_config: &str,
        chave_crypt: &str,
        f: impl FnOnce(&AcbrLibCep) -> Result<T>,
    ) -> Result<T> {
        let cep = Self::with_convention(caminho, convencao)?;
        cep.inicializar(arq_config, chave_crypt)?;

        let mut guard = FinalizeGuard { cep: &cep, armed: true };
        let result = f(guard.cep);
        guard.armed = false;
        let finalizado = cep.finalizar();

        match result {
            Ok(value) => {
                finalizado?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }

    /// Look up addresses by CEP number.
    ///
    /// Non-digit characters are stripped; the remainder must be exactly
    /// eight digits, validated before any native call.
    pub fn buscar_por_cep(&self, numero: &str) -> Result<Vec<Endereco>> {
        let cep: String = numero.chars().filter(|c| c.is_ascii_digit()).collect();
        if cep.len() != 8 {
            return Err(Error::InvalidArgument(format!(
                "CEP informado nao possui oito digitos: {:?}",
                numero
            )));
        }
        let metodo = self.binding.method("BuscarPorCEP");
        let resposta = self.binding.read_string_buffer(&metodo, &[&cep], &[])?;
        processar_resposta(&resposta)
    }

    /// Look up addresses by street attributes.
    ///
    /// Every attribute is optional; pass an empty string for the ones
    /// you do not know. The more attributes given, the closer the
    /// match; precision ultimately depends on the configured
    /// webservice.
    pub fn buscar_por_logradouro(
        &self,
        tipo_logradouro: &str,
        logradouro: &str,
        bairro: &str,
        municipio: &str,
        uf: &str,
    ) -> Result<Vec<Endereco>> {
        let metodo = self.binding.method("BuscarPorLogradouro");
        // Wire order is fixed by the native prototype.
        let resposta = self.binding.read_string_buffer(
            &metodo,
            &[municipio, tipo_logradouro, logradouro, uf, bairro],
            &[],
        )?;
        processar_resposta(&resposta)
    }
}

impl NativeApi for AcbrLibCep {
    fn binding(&self) -> &NativeBinding {
        &self.binding
    }
}

impl CommonMethods for AcbrLibCep {}
impl ConfigMethods for AcbrLibCep {}

/// Finalizes the session when dropped while armed (unwind or early
/// exit); disarmed on the normal path so the finalization outcome
/// stays observable.
struct FinalizeGuard<'a> {
    cep: &'a AcbrLibCep,
    armed: bool,
}

impl Drop for FinalizeGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let _ = self.cep.finalizar();
        }
    }
}
