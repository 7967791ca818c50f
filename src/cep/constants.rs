//! Constant tables for the CEP flavor.

use std::fmt;

/// CEP webservice providers accepted by the native `CEP/WebService`
/// configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebserviceCep {
    Nenhum = 0,
    BuscarCep = 1,
    CepLivre = 2,
    RepublicaVirtual = 3,
    Bases4You = 4,
    RnSolucoes = 5,
    KingHost = 6,
    ByJg = 7,
    Correios = 8,
    DevMedia = 9,
    ViaCep = 10,
    CorreiosSigep = 11,
    CepAberto = 12,
    WsCep = 13,
}

impl WebserviceCep {
    /// Numeric code expected by the native configuration.
    pub fn codigo(self) -> i32 {
        self as i32
    }

    /// Value to write through `config_gravar_valor("CEP", "WebService", ..)`.
    pub fn valor_config(self) -> String {
        self.codigo().to_string()
    }

    /// Human-readable provider name.
    pub fn nome(self) -> &'static str {
        match self {
            WebserviceCep::Nenhum => "Nenhum",
            WebserviceCep::BuscarCep => "BuscarCEP",
            WebserviceCep::CepLivre => "CEP Livre",
            WebserviceCep::RepublicaVirtual => "República Virtual",
            WebserviceCep::Bases4You => "Bases4You",
            WebserviceCep::RnSolucoes => "RN Soluções",
            WebserviceCep::KingHost => "King Host",
            WebserviceCep::ByJg => "By JG",
            WebserviceCep::Correios => "Correios",
            WebserviceCep::DevMedia => "DevMedia",
            WebserviceCep::ViaCep => "ViaCEP",
            WebserviceCep::CorreiosSigep => "Correios SIGEP",
            WebserviceCep::CepAberto => "CEP Aberto",
            WebserviceCep::WsCep => "WS CEP",
        }
    }

    /// All providers, in code order.
    pub fn todos() -> &'static [WebserviceCep] {
        &[
            WebserviceCep::Nenhum,
            WebserviceCep::BuscarCep,
            WebserviceCep::CepLivre,
            WebserviceCep::RepublicaVirtual,
            WebserviceCep::Bases4You,
            WebserviceCep::RnSolucoes,
            WebserviceCep::KingHost,
            WebserviceCep::ByJg,
            WebserviceCep::Correios,
            WebserviceCep::DevMedia,
            WebserviceCep::ViaCep,
            WebserviceCep::CorreiosSigep,
            WebserviceCep::CepAberto,
            WebserviceCep::WsCep,
        ]
    }
}

impl fmt::Display for WebserviceCep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nome())
    }
}
