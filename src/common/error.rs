// src/common/error.rs

use thiserror::Error;

use crate::services::conversao::EtapaConversao;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    Validacao(#[from] validator::ValidationErrors),

    #[error("Registro não encontrado")]
    NaoEncontrado,

    // O Supabase respondeu com erro (ou a rede caiu no caminho).
    // Guardamos a mensagem do servidor como ela veio.
    #[error("Erro do armazenamento remoto: {0}")]
    Remoto(String),

    // A conversão de lead criou a obra mas parou no meio do caminho.
    // A obra existe; `concluidas` diz até onde fomos e `etapa` onde parou.
    #[error("Conversão incompleta: obra {obra_id} criada, falha em {etapa}")]
    ConversaoParcial {
        obra_id: uuid::Uuid,
        etapa: EtapaConversao,
        concluidas: Vec<EtapaConversao>,
        #[source]
        fonte: Box<AppError>,
    },

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno")]
    Interno(#[from] anyhow::Error),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Remoto(err.to_string())
    }
}

// Helper para criar erro de validação de um campo só.
pub(crate) fn erro_de_validacao(campo: &str, mensagem: &str) -> AppError {
    let mut err = validator::ValidationErrors::new();
    let mut validation_err = validator::ValidationError::new("invalid_type");
    validation_err.message = Some(mensagem.to_string().into());

    // Leak seguro para erro estático
    let campo_estatico: &'static str = Box::leak(campo.to_string().into_boxed_str());
    err.add(campo_estatico, validation_err);

    AppError::Validacao(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erro_de_validacao_carrega_campo_e_mensagem() {
        let err = erro_de_validacao("condominio", "O nome do condomínio é obrigatório.");
        match err {
            AppError::Validacao(errors) => {
                let campos = errors.field_errors();
                let do_campo = campos.get("condominio").expect("campo ausente");
                assert_eq!(
                    do_campo[0].message.as_deref(),
                    Some("O nome do condomínio é obrigatório.")
                );
            }
            outro => panic!("esperava Validacao, veio {outro:?}"),
        }
    }
}
