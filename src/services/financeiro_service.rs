// src/services/financeiro_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::csv_export::{exportar_csv, ArquivoCsv, ColunaCsv},
    common::datas::Competencia,
    common::error::AppError,
    models::financeiro::{
        Despesa, DespesaPayload, Receita, ReceitaPayload, StatusDespesa, StatusReceita,
    },
    models::indicadores::{FluxoMes, IndicadoresFinanceiro},
    services::indicadores::FonteIndicadores,
    services::parcelas::{gerar_parcelas, rotulo_parcela},
    store::{ListaParams, Store},
};

#[derive(Clone)]
pub struct FinanceiroService {
    store: Store,
    indicadores: Arc<dyn FonteIndicadores>,
}

impl FinanceiroService {
    pub fn new(store: Store, indicadores: Arc<dyn FonteIndicadores>) -> Self {
        Self { store, indicadores }
    }

    pub async fn listar_receitas(&self) -> Result<Vec<Receita>, AppError> {
        self.store
            .listar("receitas", &ListaParams::new().ordenar_por("data_prevista", false))
            .await
    }

    pub async fn listar_despesas(&self) -> Result<Vec<Despesa>, AppError> {
        self.store
            .listar(
                "despesas",
                &ListaParams::new().ordenar_por("data_vencimento", false),
            )
            .await
    }

    /// Cria a receita, parcelando quando `parcelas > 1`: cada parcela leva o
    /// rótulo "descrição - Parcela i/N" e a data avança mês a mês. Devolve o
    /// que foi criado (1 ou N receitas).
    pub async fn criar_receita(
        &self,
        payload: ReceitaPayload,
        parcelas: u32,
    ) -> Result<Vec<Receita>, AppError> {
        payload.validate()?;

        if parcelas <= 1 {
            let criada = self.store.criar("receitas", &payload).await?;
            return Ok(vec![criada]);
        }

        tracing::info!(
            "Parcelando receita \"{}\" em {parcelas} vezes",
            payload.descricao
        );
        let geradas = gerar_parcelas(payload.valor, parcelas, payload.data_prevista);
        let mut criadas = Vec::with_capacity(geradas.len());
        for parcela in &geradas {
            let da_parcela = ReceitaPayload {
                obra_id: payload.obra_id,
                descricao: rotulo_parcela(Some(&payload.descricao), parcela.numero, parcelas),
                valor: parcela.valor,
                data_prevista: parcela.data_prevista,
                status: payload.status.clone(),
            };
            criadas.push(self.store.criar("receitas", &da_parcela).await?);
        }
        Ok(criadas)
    }

    /// Edição nunca reparcela; é sempre a receita inteira.
    pub async fn atualizar_receita(
        &self,
        id: Uuid,
        payload: ReceitaPayload,
    ) -> Result<Receita, AppError> {
        payload.validate()?;
        self.store.atualizar("receitas", id, &payload).await
    }

    pub async fn marcar_recebido(&self, id: Uuid) -> Result<Receita, AppError> {
        self.store
            .atualizar("receitas", id, &json!({ "status": "recebido" }))
            .await
    }

    pub async fn remover_receita(&self, id: Uuid) -> Result<(), AppError> {
        self.store.remover("receitas", id).await
    }

    pub async fn criar_despesa(&self, payload: DespesaPayload) -> Result<Despesa, AppError> {
        payload.validate()?;
        self.store.criar("despesas", &payload).await
    }

    pub async fn atualizar_despesa(
        &self,
        id: Uuid,
        payload: DespesaPayload,
    ) -> Result<Despesa, AppError> {
        payload.validate()?;
        self.store.atualizar("despesas", id, &payload).await
    }

    pub async fn marcar_pago(&self, id: Uuid) -> Result<Despesa, AppError> {
        self.store
            .atualizar("despesas", id, &json!({ "status": "pago" }))
            .await
    }

    pub async fn remover_despesa(&self, id: Uuid) -> Result<(), AppError> {
        self.store.remover("despesas", id).await
    }

    pub async fn indicadores(
        &self,
        receitas: &[Receita],
        despesas: &[Despesa],
        competencia: Competencia,
    ) -> Result<IndicadoresFinanceiro, AppError> {
        self.indicadores
            .financeiro(receitas, despesas, competencia)
            .await
    }

    pub async fn fluxo_caixa(
        &self,
        receitas: &[Receita],
        despesas: &[Despesa],
        fim: Competencia,
        meses: u32,
    ) -> Result<Vec<FluxoMes>, AppError> {
        self.indicadores
            .fluxo_caixa(receitas, despesas, fim, meses)
            .await
    }
}

// ===== Fatias do mês =====

pub fn receitas_da_competencia(receitas: &[Receita], competencia: Competencia) -> Vec<Receita> {
    receitas
        .iter()
        .filter(|r| r.data_prevista.is_some_and(|d| competencia.contem(d)))
        .cloned()
        .collect()
}

pub fn despesas_da_competencia(despesas: &[Despesa], competencia: Competencia) -> Vec<Despesa> {
    despesas
        .iter()
        .filter(|d| d.data_vencimento.is_some_and(|v| competencia.contem(v)))
        .cloned()
        .collect()
}

// ===== Exportação do mês =====

// Receitas e despesas misturadas numa planilha só, com a coluna Tipo
// distinguindo as duas.
#[derive(Debug, Clone)]
pub struct LancamentoMes {
    pub tipo: &'static str,
    pub descricao: String,
    pub categoria: Option<String>,
    pub valor: Option<Decimal>,
    pub data: Option<NaiveDate>,
    pub status: String,
}

pub fn colunas_csv_mes() -> Vec<ColunaCsv<LancamentoMes>> {
    vec![
        ColunaCsv::new("Tipo", |l: &LancamentoMes| l.tipo.to_string()),
        ColunaCsv::new("Descrição", |l: &LancamentoMes| l.descricao.clone()),
        ColunaCsv::new("Categoria", |l: &LancamentoMes| {
            l.categoria.clone().unwrap_or_default()
        }),
        ColunaCsv::new("Valor", |l: &LancamentoMes| {
            l.valor.map(|v| v.to_string()).unwrap_or_default()
        }),
        ColunaCsv::new("Data", |l: &LancamentoMes| {
            l.data.map(|d| d.to_string()).unwrap_or_default()
        }),
        ColunaCsv::new("Status", |l: &LancamentoMes| l.status.clone()),
    ]
}

pub fn exportar_mes(
    receitas: &[Receita],
    despesas: &[Despesa],
    competencia: Competencia,
    hoje: NaiveDate,
) -> Result<ArquivoCsv, AppError> {
    let mut lancamentos: Vec<LancamentoMes> = receitas_da_competencia(receitas, competencia)
        .into_iter()
        .map(|r| LancamentoMes {
            tipo: "Receita",
            descricao: r.descricao,
            categoria: None,
            valor: r.valor,
            data: r.data_prevista,
            status: r.status.rotulo().to_string(),
        })
        .collect();
    lancamentos.extend(
        despesas_da_competencia(despesas, competencia)
            .into_iter()
            .map(|d| LancamentoMes {
                tipo: "Despesa",
                descricao: d.descricao,
                categoria: d.categoria,
                valor: d.valor,
                data: d.data_vencimento,
                status: d.status.rotulo().to_string(),
            }),
    );

    let prefixo = format!("financeiro-{}-{:02}", competencia.ano, competencia.mes);
    exportar_csv(&lancamentos, &prefixo, &colunas_csv_mes(), hoje)
}
