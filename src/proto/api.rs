//! Shared operation surface.
//!
//! Every flavor of the native suite exposes the same two operation
//! sets: the "library methods" (lifecycle) and the "configuration
//! methods". They are provided here as capability traits with default
//! bodies that delegate through the flavor's [`NativeBinding`], so a
//! flavor opts in by implementing the [`NativeApi`] seam and the empty
//! trait impls.

use std::os::raw::c_int;

use crate::error::Result;
use crate::proto::binding::{CallArg, NativeBinding};
use crate::proto::buffer::BUFFER_LENGTH;

/// Seam between a library flavor and its invocation core.
pub trait NativeApi {
    fn binding(&self) -> &NativeBinding;
}

const INICIALIZAR_ERROS: &[(c_int, &str)] = &[
    (-1, "Falha na inicializacao da biblioteca"),
    (-5, "Nao foi possivel localizar o arquivo INI informado"),
    (-6, "Nao foi possivel encontrar o diretorio do arquivo INI"),
];

const FINALIZAR_ERROS: &[(c_int, &str)] = &[(-2, "Falha na finalizacao da biblioteca")];

const CONFIG_ARQUIVO_ERROS: &[(c_int, &str)] = &[
    (-5, "Nao foi possivel localizar o arquivo INI informado"),
    (-6, "Nao foi possivel encontrar o diretorio do arquivo INI"),
    (-10, "Houve uma falha na execucao do metodo"),
];

const CONFIG_VALOR_ERROS: &[(c_int, &str)] = &[
    (-1, "A biblioteca nao foi inicializada"),
    (-3, "Erro ao ler a configuracao informada"),
];

const CONFIG_EXPORTAR_ERROS: &[(c_int, &str)] =
    &[(-10, "Houve uma falha na execucao do metodo")];

/// Lifecycle operations ("Metodos da Biblioteca").
pub trait CommonMethods: NativeApi {
    /// Initialize the native library with a configuration file path
    /// and crypto key; both may be empty strings.
    fn inicializar(&self, arq_config: &str, chave_crypt: &str) -> Result<()> {
        let binding = self.binding();
        let metodo = binding.method("Inicializar");
        let arq = binding.encode(arq_config)?;
        let chave = binding.encode(chave_crypt)?;
        binding.call_status(
            &metodo,
            &mut [CallArg::Text(&arq), CallArg::Text(&chave)],
            INICIALIZAR_ERROS,
        )
    }

    /// Release the native library.
    fn finalizar(&self) -> Result<()> {
        let binding = self.binding();
        binding.call_status(&binding.method("Finalizar"), &mut [], FINALIZAR_ERROS)
    }

    /// Message left by the last native call.
    fn ultimo_retorno(&self) -> Result<String> {
        self.binding().ultimo_retorno(BUFFER_LENGTH)
    }

    /// Library name as reported by the native module.
    fn nome(&self) -> Result<String> {
        let binding = self.binding();
        binding.read_string_buffer(&binding.method("Nome"), &[], &[])
    }

    /// Library version as reported by the native module.
    fn versao(&self) -> Result<String> {
        let binding = self.binding();
        binding.read_string_buffer(&binding.method("Versao"), &[], &[])
    }
}

/// Configuration operations ("Metodos da Configuracao"). Persistence
/// is entirely the native module's concern; this layer only round-trips
/// paths, section/key names and values.
pub trait ConfigMethods: NativeApi {
    /// Load the configuration file at `arq_config`.
    fn config_ler(&self, arq_config: &str) -> Result<()> {
        config_arquivo(self.binding(), "ConfigLer", arq_config)
    }

    /// Write the current configuration to `arq_config`.
    fn config_gravar(&self, arq_config: &str) -> Result<()> {
        config_arquivo(self.binding(), "ConfigGravar", arq_config)
    }

    /// Read one configuration value.
    fn config_ler_valor(&self, sessao: &str, chave: &str) -> Result<String> {
        let binding = self.binding();
        binding.read_direct(
            &binding.method("ConfigLerValor"),
            &[sessao, chave],
            BUFFER_LENGTH,
            CONFIG_VALOR_ERROS,
        )
    }

    /// Write one configuration value.
    fn config_gravar_valor(&self, sessao: &str, chave: &str, valor: &str) -> Result<()> {
        let binding = self.binding();
        let metodo = binding.method("ConfigGravarValor");
        let sessao = binding.encode(sessao)?;
        let chave = binding.encode(chave)?;
        let valor = binding.encode(valor)?;
        binding.call_status(
            &metodo,
            &mut [
                CallArg::Text(&sessao),
                CallArg::Text(&chave),
                CallArg::Text(&valor),
            ],
            CONFIG_VALOR_ERROS,
        )
    }

    /// Import a configuration file over the current configuration.
    fn config_importar(&self, arq_config: &str) -> Result<()> {
        config_arquivo(self.binding(), "ConfigImportar", arq_config)
    }

    /// Export the current configuration as INI text.
    fn config_exportar(&self) -> Result<String> {
        let binding = self.binding();
        binding.read_direct(
            &binding.method("ConfigExportar"),
            &[],
            BUFFER_LENGTH,
            CONFIG_EXPORTAR_ERROS,
        )
    }
}

fn config_arquivo(binding: &NativeBinding, sufixo: &str, arq_config: &str) -> Result<()> {
    let metodo = binding.method(sufixo);
    let arq = binding.encode(arq_config)?;
    binding.call_status(&metodo, &mut [CallArg::Text(&arq)], CONFIG_ARQUIVO_ERROS)
}
