// src/common/csv_export.rs

use chrono::NaiveDate;

use crate::common::error::{erro_de_validacao, AppError};

// UTF-8 BOM no início do arquivo, senão o Excel desmonta os acentos.
const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

// Uma coluna da exportação: rótulo do cabeçalho e como extrair o valor.
// Campos vazios viram string vazia; quem formata número/data é o accessor.
pub struct ColunaCsv<T> {
    pub rotulo: &'static str,
    pub valor: fn(&T) -> String,
}

impl<T> ColunaCsv<T> {
    pub fn new(rotulo: &'static str, valor: fn(&T) -> String) -> Self {
        Self { rotulo, valor }
    }
}

/// Arquivo pronto para entrega: nome sugerido + bytes.
#[derive(Debug, Clone)]
pub struct ArquivoCsv {
    pub nome: String,
    pub conteudo: Vec<u8>,
}

/// Gera o CSV com cabeçalho, uma linha por registro e o nome
/// `{prefixo}-AAAA-MM-DD.csv`. Exportar sem dados é erro de validação.
pub fn exportar_csv<T>(
    dados: &[T],
    prefixo: &str,
    colunas: &[ColunaCsv<T>],
    hoje: NaiveDate,
) -> Result<ArquivoCsv, AppError> {
    if dados.is_empty() {
        return Err(erro_de_validacao("dados", "Nenhum dado para exportar."));
    }

    // Toda célula sai entre aspas, como o formato de exportação define
    let mut escritor = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());
    escritor
        .write_record(colunas.iter().map(|c| c.rotulo))
        .map_err(anyhow::Error::from)?;
    for linha in dados {
        escritor
            .write_record(colunas.iter().map(|c| (c.valor)(linha)))
            .map_err(anyhow::Error::from)?;
    }
    let corpo = escritor
        .into_inner()
        .map_err(|e| anyhow::Error::from(e.into_error()))?;

    let mut conteudo = Vec::with_capacity(BOM.len() + corpo.len());
    conteudo.extend_from_slice(BOM);
    conteudo.extend_from_slice(&corpo);

    Ok(ArquivoCsv {
        nome: format!("{}-{}.csv", prefixo, hoje.format("%Y-%m-%d")),
        conteudo,
    })
}
