//! Response decoding.
//!
//! The native module answers lookup queries with an INI-like text
//! document:
//!
//! ```text
//! [CEP]
//! Quantidade=2
//!
//! [Endereco1]
//! Tipo_Logradouro=Rua
//! Logradouro=Coronel Aureliano de Camargo
//! Complemento=
//! Bairro=Centro
//! Municipio=Tatui
//! UF=SP
//! CEP=18270-170
//! IBGE_Municipio=3554003
//! IBGE_UF=35
//!
//! [Endereco2]
//! ...
//! ```
//!
//! Decoding is pure text processing: no I/O, no native calls.

use std::collections::HashMap;

use crate::error::{Error, Result};

use super::model::Endereco;

/// Decode a lookup response into address records.
///
/// The document must declare its record count under `[CEP] Quantidade`
/// and provide one `Endereco{i}` section per record (1-based, in any
/// document order) with all nine keys present. The output always has
/// exactly the declared length, in index order; any missing piece
/// fails the whole parse; a partial list is never returned.
pub fn processar_resposta(resposta: &str) -> Result<Vec<Endereco>> {
    let documento = IniDocument::parse(resposta);

    let quantidade = documento.get("CEP", "Quantidade").ok_or_else(|| {
        Error::MalformedResponse(
            "a resposta nao possui a informacao da quantidade de enderecos encontrados"
                .to_string(),
        )
    })?;
    let quantidade: usize = quantidade.parse().map_err(|_| {
        Error::MalformedResponse(format!(
            "quantidade de enderecos invalida: {:?}",
            quantidade
        ))
    })?;

    let mut enderecos = Vec::with_capacity(quantidade);
    for indice in 0..quantidade {
        enderecos.push(endereco(&documento, indice)?);
    }
    Ok(enderecos)
}

fn endereco(documento: &IniDocument, indice: usize) -> Result<Endereco> {
    let secao = format!("Endereco{}", indice + 1);
    if !documento.has_section(&secao) {
        return Err(Error::MalformedResponse(format!(
            "a resposta nao possui a secao {:?}",
            secao
        )));
    }
    let campo = |chave: &str| -> Result<String> {
        documento
            .get(&secao, chave)
            .map(str::to_string)
            .ok_or_else(|| {
                Error::MalformedResponse(format!(
                    "a resposta nao possui a informacao {:?} na secao {:?}",
                    chave, secao
                ))
            })
    };
    Ok(Endereco {
        tipo_logradouro: campo("Tipo_Logradouro")?,
        logradouro: campo("Logradouro")?,
        complemento: campo("Complemento")?,
        bairro: campo("Bairro")?,
        municipio: campo("Municipio")?,
        uf: campo("UF")?,
        cep: campo("CEP")?,
        ibge_municipio: campo("IBGE_Municipio")?,
        ibge_uf: campo("IBGE_UF")?,
    })
}

/// Minimal reader for the response grammar: `[Section]` headers and
/// `Key = Value` lines split at the first `=`, surrounding whitespace
/// trimmed, section and key matching case-insensitive, values
/// case-preserving. Blank lines, `;`/`#` comment lines and stray
/// content outside a section are skipped.
struct IniDocument {
    sections: HashMap<String, HashMap<String, String>>,
}

impl IniDocument {
    fn parse(text: &str) -> Self {
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current: Option<String> = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') && line.ends_with(']') {
                let nome = line[1..line.len() - 1].trim().to_ascii_lowercase();
                sections.entry(nome.clone()).or_default();
                current = Some(nome);
                continue;
            }
            if let (Some(secao), Some((chave, valor))) = (current.as_ref(), line.split_once('=')) {
                sections
                    .entry(secao.clone())
                    .or_default()
                    .insert(chave.trim().to_ascii_lowercase(), valor.trim().to_string());
            }
        }

        Self { sections }
    }

    fn has_section(&self, nome: &str) -> bool {
        self.sections.contains_key(&nome.to_ascii_lowercase())
    }

    fn get(&self, secao: &str, chave: &str) -> Option<&str> {
        self.sections
            .get(&secao.to_ascii_lowercase())?
            .get(&chave.to_ascii_lowercase())
            .map(String::as_str)
    }
}
