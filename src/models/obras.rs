// src/models/obras.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// --- Enums ---

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusObra {
    Planejamento,
    EmExecucao,
    Finalizada,
    Outro(String),
}

// Colunas fixas do quadro de obras, na ordem de exibição
pub const STATUS_OBRA: [StatusObra; 3] = [
    StatusObra::Planejamento,
    StatusObra::EmExecucao,
    StatusObra::Finalizada,
];

impl StatusObra {
    pub fn as_str(&self) -> &str {
        match self {
            StatusObra::Planejamento => "planejamento",
            StatusObra::EmExecucao => "em_execucao",
            StatusObra::Finalizada => "finalizada",
            StatusObra::Outro(s) => s,
        }
    }

    pub fn rotulo(&self) -> &str {
        match self {
            StatusObra::Planejamento => "Planejamento",
            StatusObra::EmExecucao => "Em Execução",
            StatusObra::Finalizada => "Finalizada",
            StatusObra::Outro(s) => s,
        }
    }
}

impl From<String> for StatusObra {
    fn from(valor: String) -> Self {
        match valor.as_str() {
            "planejamento" => StatusObra::Planejamento,
            "em_execucao" => StatusObra::EmExecucao,
            "finalizada" => StatusObra::Finalizada,
            _ => StatusObra::Outro(valor),
        }
    }
}

impl From<StatusObra> for String {
    fn from(status: StatusObra) -> Self {
        status.as_str().to_string()
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obra {
    pub id: Uuid,

    pub condominio: String,
    pub cliente: Option<String>,
    pub cnpj: Option<String>,
    pub cidade: Option<String>,

    // Contrato
    pub valor_fechado: Option<Decimal>,
    pub data_inicio: Option<NaiveDate>,
    pub prazo_dias: Option<i32>,

    pub status: StatusObra,
    pub observacoes: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Obra {
    /// Percentual do prazo já decorrido em relação a `hoje`.
    ///
    /// Passa de 100 quando a obra estourou o prazo e fica negativo quando o
    /// início ainda está no futuro. Sem data de início ou sem prazo, 0.
    pub fn progresso(&self, hoje: NaiveDate) -> f64 {
        let (Some(inicio), Some(prazo)) = (self.data_inicio, self.prazo_dias) else {
            return 0.0;
        };
        if prazo <= 0 {
            return 0.0;
        }
        let dias_passados = (hoje - inicio).num_days();
        dias_passados as f64 / prazo as f64 * 100.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObraPayload {
    #[validate(length(min = 1, message = "Informe o condomínio."))]
    pub condominio: String,

    #[validate(length(min = 1, message = "Informe o cliente."))]
    pub cliente: String,

    pub cnpj: Option<String>,
    pub cidade: Option<String>,

    pub valor_fechado: Option<Decimal>,
    pub data_inicio: Option<NaiveDate>,
    pub prazo_dias: Option<i32>, // nulo assume 90 ao salvar

    pub status: StatusObra,
    pub observacoes: Option<String>,
}
