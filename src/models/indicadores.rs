// src/models/indicadores.rs

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

// As linhas de KPI chegam de views e funções do banco que podem devolver
// campo nulo (SUM sobre conjunto vazio) ou nem devolver o campo. Por isso a
// montagem é feita campo a campo com zero como padrão, em vez de depender do
// formato exato da linha.

// --- KPIs do CRM (vw_crm_kpis) ---

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicadoresCrm {
    pub leads_ativos: i64,
    pub previsao_faturamento: Decimal,
    pub em_negociacao: i64,
    pub aprovados_mes: i64,
}

impl IndicadoresCrm {
    pub fn do_mapa(mapa: &Map<String, Value>) -> Self {
        Self {
            leads_ativos: campo_inteiro(mapa, "leads_ativos"),
            previsao_faturamento: campo_decimal(mapa, "previsao_faturamento"),
            em_negociacao: campo_inteiro(mapa, "em_negociacao"),
            aprovados_mes: campo_inteiro(mapa, "aprovados_mes"),
        }
    }
}

// --- KPIs de obras (vw_obras_kpis) ---

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicadoresObras {
    pub em_andamento: i64,
    pub finalizadas: i64,
    pub valor_em_execucao: Decimal,
}

impl IndicadoresObras {
    pub fn do_mapa(mapa: &Map<String, Value>) -> Self {
        Self {
            em_andamento: campo_inteiro(mapa, "em_andamento"),
            finalizadas: campo_inteiro(mapa, "finalizadas"),
            valor_em_execucao: campo_decimal(mapa, "valor_em_execucao"),
        }
    }
}

// --- KPIs do mês (fn_financeiro_kpis) ---

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicadoresFinanceiro {
    pub faturamento_mes: Decimal,
    pub despesas_mes: Decimal,
    pub lucro_bruto: Decimal,
}

impl IndicadoresFinanceiro {
    pub fn do_mapa(mapa: &Map<String, Value>) -> Self {
        Self {
            faturamento_mes: campo_decimal(mapa, "faturamento_mes"),
            despesas_mes: campo_decimal(mapa, "despesas_mes"),
            lucro_bruto: campo_decimal(mapa, "lucro_bruto"),
        }
    }

    pub fn do_valor(valor: &Value) -> Self {
        valor.as_object().map(Self::do_mapa).unwrap_or_default()
    }
}

// --- Um mês do fluxo de caixa (fn_fluxo_caixa) ---

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FluxoMes {
    pub mes_nome: String, // "Ago/26"
    pub receitas_total: Decimal,
    pub despesas_total: Decimal,
    pub saldo: Decimal,
}

impl FluxoMes {
    pub fn do_valor(valor: &Value) -> Self {
        let vazio = Map::new();
        let mapa = valor.as_object().unwrap_or(&vazio);
        Self {
            mes_nome: mapa
                .get("mes_nome")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            receitas_total: campo_decimal(mapa, "receitas_total"),
            despesas_total: campo_decimal(mapa, "despesas_total"),
            saldo: campo_decimal(mapa, "saldo"),
        }
    }

    /// A série completa devolvida pela função (mais antigo primeiro).
    pub fn serie_do_valor(valor: &Value) -> Vec<Self> {
        valor
            .as_array()
            .map(|linhas| linhas.iter().map(Self::do_valor).collect())
            .unwrap_or_default()
    }
}

fn campo_inteiro(mapa: &Map<String, Value>, campo: &str) -> i64 {
    mapa.get(campo).and_then(Value::as_i64).unwrap_or(0)
}

// numeric pode chegar como número ou como string, dependendo da coluna.
// Número JSON é parseado pelos dígitos decimais do texto; passar por f64
// meteria ruído binário em valores exatos.
fn campo_decimal(mapa: &Map<String, Value>, campo: &str) -> Decimal {
    match mapa.get(campo) {
        Some(Value::Number(n)) => n.to_string().parse().unwrap_or_default(),
        Some(Value::String(s)) => s.parse().unwrap_or_default(),
        _ => Decimal::ZERO,
    }
}
