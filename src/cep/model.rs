//! Address record model.

use std::fmt;

/// One matched address from a lookup response.
///
/// Inert value object: the fields mirror the keys of the native
/// response document and are never validated beyond presence. Blank
/// values are kept as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endereco {
    pub tipo_logradouro: String,
    pub logradouro: String,
    pub complemento: String,
    pub bairro: String,
    pub municipio: String,
    /// State abbreviation.
    pub uf: String,
    pub cep: String,
    /// IBGE numeric code of the municipality.
    pub ibge_municipio: String,
    /// IBGE numeric code of the state.
    pub ibge_uf: String,
}

impl fmt::Display for Endereco {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let via = format!("{} {}", self.tipo_logradouro, self.logradouro);
        write!(
            f,
            "{}, {}, {}/{} - CEP {}",
            via.trim(),
            self.bairro,
            self.municipio,
            self.uf,
            self.cep
        )
    }
}
