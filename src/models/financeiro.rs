// src/models/financeiro.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// --- Enums ---

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusReceita {
    Previsto,
    Recebido,
    Outro(String),
}

impl StatusReceita {
    pub fn as_str(&self) -> &str {
        match self {
            StatusReceita::Previsto => "previsto",
            StatusReceita::Recebido => "recebido",
            StatusReceita::Outro(s) => s,
        }
    }

    pub fn rotulo(&self) -> &str {
        match self {
            StatusReceita::Previsto => "Previsto",
            StatusReceita::Recebido => "Recebido",
            StatusReceita::Outro(s) => s,
        }
    }
}

impl From<String> for StatusReceita {
    fn from(valor: String) -> Self {
        match valor.as_str() {
            "previsto" => StatusReceita::Previsto,
            "recebido" => StatusReceita::Recebido,
            _ => StatusReceita::Outro(valor),
        }
    }
}

impl From<StatusReceita> for String {
    fn from(status: StatusReceita) -> Self {
        status.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusDespesa {
    Pendente,
    Pago,
    Outro(String),
}

impl StatusDespesa {
    pub fn as_str(&self) -> &str {
        match self {
            StatusDespesa::Pendente => "pendente",
            StatusDespesa::Pago => "pago",
            StatusDespesa::Outro(s) => s,
        }
    }

    pub fn rotulo(&self) -> &str {
        match self {
            StatusDespesa::Pendente => "Pendente",
            StatusDespesa::Pago => "Pago",
            StatusDespesa::Outro(s) => s,
        }
    }
}

impl From<String> for StatusDespesa {
    fn from(valor: String) -> Self {
        match valor.as_str() {
            "pendente" => StatusDespesa::Pendente,
            "pago" => StatusDespesa::Pago,
            _ => StatusDespesa::Outro(valor),
        }
    }
}

impl From<StatusDespesa> for String {
    fn from(status: StatusDespesa) -> Self {
        status.as_str().to_string()
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receita {
    pub id: Uuid,
    pub obra_id: Option<Uuid>, // receita avulsa não tem vínculo

    pub descricao: String,
    pub valor: Option<Decimal>,
    pub data_prevista: Option<NaiveDate>,
    pub status: StatusReceita,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Despesa {
    pub id: Uuid,
    pub obra_id: Option<Uuid>,

    pub descricao: String,
    pub categoria: Option<String>,
    pub valor: Option<Decimal>,
    pub data_vencimento: Option<NaiveDate>,
    pub status: StatusDespesa,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

fn validar_positivo(valor: &Decimal) -> Result<(), validator::ValidationError> {
    if valor.is_sign_negative() || valor.is_zero() {
        let mut err = validator::ValidationError::new("range");
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReceitaPayload {
    pub obra_id: Option<Uuid>,

    #[validate(length(min = 1, message = "Informe a descrição."))]
    pub descricao: String,

    #[validate(custom(function = "validar_positivo"))]
    pub valor: Decimal,

    pub data_prevista: NaiveDate,
    pub status: StatusReceita,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DespesaPayload {
    pub obra_id: Option<Uuid>,

    #[validate(length(min = 1, message = "Informe a descrição."))]
    pub descricao: String,

    #[validate(length(min = 1, message = "Informe a categoria."))]
    pub categoria: String,

    #[validate(custom(function = "validar_positivo"))]
    pub valor: Decimal,

    pub data_vencimento: NaiveDate,
    pub status: StatusDespesa,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valor_zerado_ou_negativo_nao_passa() {
        let mut payload = ReceitaPayload {
            obra_id: None,
            descricao: "Parcela única".to_string(),
            valor: Decimal::ZERO,
            data_prevista: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            status: StatusReceita::Previsto,
        };
        assert!(payload.validate().is_err());

        payload.valor = Decimal::from(-10);
        assert!(payload.validate().is_err());

        payload.valor = Decimal::from(10);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn status_financeiro_fora_do_dominio_vira_outro() {
        let status: StatusReceita = serde_json::from_str("\"estornado\"").unwrap();
        assert_eq!(status, StatusReceita::Outro("estornado".to_string()));

        let pago: StatusDespesa = serde_json::from_str("\"pago\"").unwrap();
        assert_eq!(pago, StatusDespesa::Pago);
        assert_eq!(pago.rotulo(), "Pago");
    }
}
