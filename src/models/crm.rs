// src/models/crm.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// --- Enums (mapeando as colunas de status) ---

// Etapas do funil, na ordem em que aparecem no pipeline.
// Status que o banco mandar e a gente não conhecer cai em `Outro`,
// preservando o texto original (ninguém some da tela por causa disso).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EstagioLead {
    Lead,
    VisitaTecnica,
    OrcamentoEnviado,
    Negociacao,
    Aprovado,
    Perdido,
    Outro(String),
}

// Os seis estágios fixos do funil, na ordem de exibição
pub const ESTAGIOS: [EstagioLead; 6] = [
    EstagioLead::Lead,
    EstagioLead::VisitaTecnica,
    EstagioLead::OrcamentoEnviado,
    EstagioLead::Negociacao,
    EstagioLead::Aprovado,
    EstagioLead::Perdido,
];

impl EstagioLead {
    /// Identificador como vai para o banco.
    pub fn as_str(&self) -> &str {
        match self {
            EstagioLead::Lead => "lead",
            EstagioLead::VisitaTecnica => "visita_tecnica",
            EstagioLead::OrcamentoEnviado => "orcamento_enviado",
            EstagioLead::Negociacao => "negociacao",
            EstagioLead::Aprovado => "aprovado",
            EstagioLead::Perdido => "perdido",
            EstagioLead::Outro(s) => s,
        }
    }

    /// Rótulo de exibição em português.
    pub fn rotulo(&self) -> &str {
        match self {
            EstagioLead::Lead => "Lead",
            EstagioLead::VisitaTecnica => "Visita Técnica",
            EstagioLead::OrcamentoEnviado => "Orçamento Enviado",
            EstagioLead::Negociacao => "Negociação",
            EstagioLead::Aprovado => "Aprovado",
            EstagioLead::Perdido => "Perdido",
            EstagioLead::Outro(s) => s,
        }
    }

    /// Lead ainda em aberto (não aprovado nem perdido).
    pub fn ativo(&self) -> bool {
        !matches!(self, EstagioLead::Aprovado | EstagioLead::Perdido)
    }
}

impl From<String> for EstagioLead {
    fn from(valor: String) -> Self {
        match valor.as_str() {
            "lead" => EstagioLead::Lead,
            "visita_tecnica" => EstagioLead::VisitaTecnica,
            "orcamento_enviado" => EstagioLead::OrcamentoEnviado,
            "negociacao" => EstagioLead::Negociacao,
            "aprovado" => EstagioLead::Aprovado,
            "perdido" => EstagioLead::Perdido,
            _ => EstagioLead::Outro(valor),
        }
    }
}

impl From<EstagioLead> for String {
    fn from(estagio: EstagioLead) -> Self {
        estagio.as_str().to_string()
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,

    pub condominio: String,
    pub cidade: Option<String>,
    pub tipo_servico: Option<String>,

    // Contato
    pub nome_contato: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub administradora: Option<String>,

    // Negociação
    pub valor_estimado: Option<Decimal>,
    pub status: EstagioLead,
    pub probabilidade: Option<i32>, // 0 a 100; nulo assume 30 na previsão
    pub proxima_acao: Option<String>,
    pub observacoes: Option<String>,

    // Datas de marco do funil (cada uma preenchida no máximo uma vez)
    pub data_entrada: Option<NaiveDate>,
    pub data_envio_orcamento: Option<NaiveDate>,
    pub data_aprovacao: Option<NaiveDate>,
    pub data_perdido: Option<NaiveDate>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// Probabilidade assumida quando o lead não tem uma informada
pub const PROBABILIDADE_PADRAO: i32 = 30;

impl Lead {
    /// Valor ponderado que entra na previsão de faturamento.
    pub fn valor_ponderado(&self) -> Decimal {
        let valor = self.valor_estimado.unwrap_or_default();
        let probabilidade = self.probabilidade.unwrap_or(PROBABILIDADE_PADRAO);
        valor * Decimal::from(probabilidade) / Decimal::from(100)
    }
}

fn validar_nao_negativo(valor: &Decimal) -> Result<(), validator::ValidationError> {
    if valor.is_sign_negative() {
        let mut err = validator::ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// Payload de criação/edição. O `id` fica fora: quem sabe se é novo ou
// edição é o serviço.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LeadPayload {
    #[validate(length(min = 1, message = "Informe o condomínio."))]
    pub condominio: String,

    pub cidade: Option<String>, // vazio vira "Não informada" ao salvar
    pub tipo_servico: Option<String>,

    pub nome_contato: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub administradora: Option<String>,

    #[validate(custom(function = "validar_nao_negativo"))]
    pub valor_estimado: Option<Decimal>,

    pub status: EstagioLead,

    #[validate(range(min = 0, max = 100, message = "A probabilidade deve estar entre 0 e 100."))]
    pub probabilidade: Option<i32>,

    #[validate(length(min = 1, message = "Informe a próxima ação."))]
    pub proxima_acao: String,

    pub observacoes: Option<String>,

    pub data_entrada: Option<NaiveDate>,
    pub data_envio_orcamento: Option<NaiveDate>,
    pub data_aprovacao: Option<NaiveDate>,
    pub data_perdido: Option<NaiveDate>,
}

impl LeadPayload {
    /// Preenche a data de marco do status atual, se ainda estiver vazia.
    /// Nunca sobrescreve uma data que o usuário já informou.
    pub fn preencher_data_do_status(&mut self, hoje: NaiveDate) {
        match self.status {
            EstagioLead::OrcamentoEnviado if self.data_envio_orcamento.is_none() => {
                self.data_envio_orcamento = Some(hoje);
            }
            EstagioLead::Aprovado if self.data_aprovacao.is_none() => {
                self.data_aprovacao = Some(hoje);
            }
            EstagioLead::Perdido if self.data_perdido.is_none() => {
                self.data_perdido = Some(hoje);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_desconhecido_preserva_o_texto() {
        let estagio: EstagioLead = serde_json::from_str("\"pausado\"").unwrap();
        assert_eq!(estagio, EstagioLead::Outro("pausado".to_string()));
        assert_eq!(estagio.as_str(), "pausado");
        assert!(estagio.ativo());

        let de_volta = serde_json::to_string(&estagio).unwrap();
        assert_eq!(de_volta, "\"pausado\"");
    }

    #[test]
    fn valor_ponderado_usa_probabilidade_padrao() {
        let lead = lead_de_teste(Some(Decimal::from(10000)), None);
        assert_eq!(lead.valor_ponderado(), Decimal::from(3000));

        let com_probabilidade = lead_de_teste(Some(Decimal::from(10000)), Some(50));
        assert_eq!(com_probabilidade.valor_ponderado(), Decimal::from(5000));

        let zerada = lead_de_teste(Some(Decimal::from(10000)), Some(0));
        assert_eq!(zerada.valor_ponderado(), Decimal::ZERO);
    }

    #[test]
    fn data_do_status_nao_sobrescreve() {
        let ontem = NaiveDate::from_ymd_opt(2026, 8, 22).unwrap();
        let hoje = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();

        let mut payload = payload_de_teste(EstagioLead::Aprovado);
        payload.preencher_data_do_status(hoje);
        assert_eq!(payload.data_aprovacao, Some(hoje));

        let mut ja_datado = payload_de_teste(EstagioLead::Aprovado);
        ja_datado.data_aprovacao = Some(ontem);
        ja_datado.preencher_data_do_status(hoje);
        assert_eq!(ja_datado.data_aprovacao, Some(ontem));

        let mut sem_marco = payload_de_teste(EstagioLead::Negociacao);
        sem_marco.preencher_data_do_status(hoje);
        assert_eq!(sem_marco.data_envio_orcamento, None);
        assert_eq!(sem_marco.data_aprovacao, None);
        assert_eq!(sem_marco.data_perdido, None);
    }

    fn lead_de_teste(valor: Option<Decimal>, probabilidade: Option<i32>) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            condominio: "Teste".to_string(),
            cidade: None,
            tipo_servico: None,
            nome_contato: None,
            telefone: None,
            email: None,
            administradora: None,
            valor_estimado: valor,
            status: EstagioLead::Lead,
            probabilidade,
            proxima_acao: None,
            observacoes: None,
            data_entrada: None,
            data_envio_orcamento: None,
            data_aprovacao: None,
            data_perdido: None,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }

    fn payload_de_teste(status: EstagioLead) -> LeadPayload {
        LeadPayload {
            condominio: "Edifício Teste".to_string(),
            cidade: None,
            tipo_servico: None,
            nome_contato: None,
            telefone: None,
            email: None,
            administradora: None,
            valor_estimado: None,
            status,
            probabilidade: None,
            proxima_acao: "Ligar".to_string(),
            observacoes: None,
            data_entrada: None,
            data_envio_orcamento: None,
            data_aprovacao: None,
            data_perdido: None,
        }
    }
}
