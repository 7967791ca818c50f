//! Address lookup demo.
//!
//! ```text
//! $ ACBRLIB_PATH=/usr/lib/libacbrcep64.so \
//!       cargo run --example busca_cep -- 18270-170
//! ```
//!
//! The library path, INI path and crypto key can come from the
//! command line or from the `ACBRLIB_PATH`, `ACBRLIB_INI_PATH` and
//! `ACBRLIB_CHAVE_CRYPT` environment variables.

use anyhow::Context;
use clap::Parser;

use acbrlib_cep::{AcbrLibCep, CallingConvention, CommonMethods};

#[derive(Parser)]
#[command(name = "busca_cep", about = "Consulta enderecos via ACBrLibCEP")]
struct Cli {
    /// CEP a consultar, com ou sem formatacao (ex.: 18270-170)
    cep: String,

    /// Caminho da biblioteca nativa
    #[arg(long)]
    biblioteca: Option<String>,

    /// Convencao de chamada: auto, cdecl ou stdcall
    #[arg(long, default_value = "auto")]
    convencao: String,

    /// Arquivo INI de configuracao
    #[arg(long)]
    arq_config: Option<String>,

    /// Chave de criptografia da configuracao
    #[arg(long)]
    chave_crypt: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let biblioteca = cli
        .biblioteca
        .or_else(|| std::env::var("ACBRLIB_PATH").ok())
        .unwrap_or_else(|| "/usr/lib/libacbrcep64.so".to_string());
    let arq_config = cli
        .arq_config
        .or_else(|| std::env::var("ACBRLIB_INI_PATH").ok())
        .unwrap_or_default();
    let chave_crypt = cli
        .chave_crypt
        .or_else(|| std::env::var("ACBRLIB_CHAVE_CRYPT").ok())
        .unwrap_or_default();

    let convencao: CallingConvention = cli.convencao.parse()?;

    let enderecos = AcbrLibCep::session(
        &biblioteca,
        convencao,
        &arq_config,
        &chave_crypt,
        |cep| {
            println!("{}, versao {}", cep.nome()?, cep.versao()?);
            cep.buscar_por_cep(&cli.cep)
        },
    )
    .with_context(|| format!("consulta do CEP {:?} falhou", cli.cep))?;

    if enderecos.is_empty() {
        println!("Nenhum endereco encontrado.");
    }
    for endereco in &enderecos {
        println!("{}", endereco);
    }
    Ok(())
}
