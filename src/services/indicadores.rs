// src/services/indicadores.rs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde_json::json;

use crate::{
    common::datas::Competencia,
    common::error::AppError,
    models::crm::{EstagioLead, Lead},
    models::financeiro::{Despesa, Receita, StatusDespesa, StatusReceita},
    models::indicadores::{FluxoMes, IndicadoresCrm, IndicadoresFinanceiro, IndicadoresObras},
    models::obras::{Obra, StatusObra},
    store::Store,
};

// A mesma leitura de indicadores tem duas origens possíveis: as views e
// funções do banco (caminho normal) ou o recálculo local sobre as listas já
// carregadas (quando o banco não tem as views). Qual das duas vale é
// decidido UMA vez, na inicialização, pelo `resolver` — nenhum serviço fica
// fazendo try/catch por chamada.
#[async_trait]
pub trait FonteIndicadores: Send + Sync {
    /// De onde os números estão vindo, para o log de inicialização.
    fn origem(&self) -> &'static str;

    async fn crm(&self, leads: &[Lead], hoje: NaiveDate) -> Result<IndicadoresCrm, AppError>;

    async fn obras(&self, obras: &[Obra]) -> Result<IndicadoresObras, AppError>;

    async fn financeiro(
        &self,
        receitas: &[Receita],
        despesas: &[Despesa],
        competencia: Competencia,
    ) -> Result<IndicadoresFinanceiro, AppError>;

    async fn fluxo_caixa(
        &self,
        receitas: &[Receita],
        despesas: &[Despesa],
        fim: Competencia,
        meses: u32,
    ) -> Result<Vec<FluxoMes>, AppError>;
}

/// Sonda a view de KPIs do CRM e escolhe a fonte.
pub async fn resolver(store: &Store) -> Arc<dyn FonteIndicadores> {
    let fonte: Arc<dyn FonteIndicadores> = match store.kpis("vw_crm_kpis").await {
        Ok(_) => Arc::new(IndicadoresRemotos::new(store.clone())),
        Err(err) => {
            tracing::warn!("⚠️ Views de KPI indisponíveis ({err}), caindo para cálculo local");
            Arc::new(IndicadoresLocais)
        }
    };
    tracing::info!("✅ Indicadores: {}", fonte.origem());
    fonte
}

// --- Fonte primária: views e RPCs do banco ---

#[derive(Clone)]
pub struct IndicadoresRemotos {
    store: Store,
}

impl IndicadoresRemotos {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl FonteIndicadores for IndicadoresRemotos {
    fn origem(&self) -> &'static str {
        "views do banco"
    }

    async fn crm(&self, _leads: &[Lead], _hoje: NaiveDate) -> Result<IndicadoresCrm, AppError> {
        let linha = self.store.kpis("vw_crm_kpis").await?;
        Ok(IndicadoresCrm::do_mapa(&linha))
    }

    async fn obras(&self, _obras: &[Obra]) -> Result<IndicadoresObras, AppError> {
        let linha = self.store.kpis("vw_obras_kpis").await?;
        Ok(IndicadoresObras::do_mapa(&linha))
    }

    async fn financeiro(
        &self,
        _receitas: &[Receita],
        _despesas: &[Despesa],
        competencia: Competencia,
    ) -> Result<IndicadoresFinanceiro, AppError> {
        let corpo = self
            .store
            .rpc(
                "fn_financeiro_kpis",
                &json!({ "p_ano": competencia.ano, "p_mes": competencia.mes }),
            )
            .await?;
        Ok(IndicadoresFinanceiro::do_valor(&corpo))
    }

    async fn fluxo_caixa(
        &self,
        _receitas: &[Receita],
        _despesas: &[Despesa],
        _fim: Competencia,
        meses: u32,
    ) -> Result<Vec<FluxoMes>, AppError> {
        let corpo = self
            .store
            .rpc("fn_fluxo_caixa", &json!({ "p_meses": meses }))
            .await?;
        Ok(FluxoMes::serie_do_valor(&corpo))
    }
}

// --- Fonte de contingência: recálculo sobre as listas carregadas ---

pub struct IndicadoresLocais;

#[async_trait]
impl FonteIndicadores for IndicadoresLocais {
    fn origem(&self) -> &'static str {
        "cálculo local"
    }

    async fn crm(&self, leads: &[Lead], hoje: NaiveDate) -> Result<IndicadoresCrm, AppError> {
        Ok(indicadores_crm_locais(leads, hoje))
    }

    async fn obras(&self, obras: &[Obra]) -> Result<IndicadoresObras, AppError> {
        Ok(indicadores_obras_locais(obras))
    }

    async fn financeiro(
        &self,
        receitas: &[Receita],
        despesas: &[Despesa],
        competencia: Competencia,
    ) -> Result<IndicadoresFinanceiro, AppError> {
        Ok(indicadores_financeiro_locais(receitas, despesas, competencia))
    }

    async fn fluxo_caixa(
        &self,
        receitas: &[Receita],
        despesas: &[Despesa],
        fim: Competencia,
        meses: u32,
    ) -> Result<Vec<FluxoMes>, AppError> {
        Ok(fluxo_caixa_local(receitas, despesas, fim, meses))
    }
}

// As contas locais espelham o que as views fazem no banco; para dados bem
// formados as duas fontes devolvem o mesmo resultado.

pub fn indicadores_crm_locais(leads: &[Lead], hoje: NaiveDate) -> IndicadoresCrm {
    let ativos: Vec<&Lead> = leads.iter().filter(|l| l.status.ativo()).collect();

    let previsao_faturamento = ativos.iter().map(|l| l.valor_ponderado()).sum();

    let em_negociacao = leads
        .iter()
        .filter(|l| l.status == EstagioLead::Negociacao)
        .count() as i64;

    // aprovado neste mês: compara mês E ano da última atualização
    let aprovados_mes = leads
        .iter()
        .filter(|l| l.status == EstagioLead::Aprovado)
        .filter(|l| {
            l.updated_at.is_some_and(|em| {
                let data = em.date_naive();
                data.year() == hoje.year() && data.month() == hoje.month()
            })
        })
        .count() as i64;

    IndicadoresCrm {
        leads_ativos: ativos.len() as i64,
        previsao_faturamento,
        em_negociacao,
        aprovados_mes,
    }
}

pub fn indicadores_obras_locais(obras: &[Obra]) -> IndicadoresObras {
    let em_execucao: Vec<&Obra> = obras
        .iter()
        .filter(|o| o.status == StatusObra::EmExecucao)
        .collect();

    IndicadoresObras {
        em_andamento: em_execucao.len() as i64,
        finalizadas: obras
            .iter()
            .filter(|o| o.status == StatusObra::Finalizada)
            .count() as i64,
        valor_em_execucao: em_execucao
            .iter()
            .map(|o| o.valor_fechado.unwrap_or_default())
            .sum(),
    }
}

pub fn indicadores_financeiro_locais(
    receitas: &[Receita],
    despesas: &[Despesa],
    competencia: Competencia,
) -> IndicadoresFinanceiro {
    let faturamento_mes: Decimal = receitas
        .iter()
        .filter(|r| r.status == StatusReceita::Recebido)
        .filter(|r| r.data_prevista.is_some_and(|d| competencia.contem(d)))
        .map(|r| r.valor.unwrap_or_default())
        .sum();

    let despesas_mes: Decimal = despesas
        .iter()
        .filter(|d| d.status == StatusDespesa::Pago)
        .filter(|d| d.data_vencimento.is_some_and(|v| competencia.contem(v)))
        .map(|d| d.valor.unwrap_or_default())
        .sum();

    IndicadoresFinanceiro {
        faturamento_mes,
        despesas_mes,
        lucro_bruto: faturamento_mes - despesas_mes,
    }
}

/// Série dos últimos `meses` meses terminando em `fim`, do mais antigo para
/// o mais recente.
pub fn fluxo_caixa_local(
    receitas: &[Receita],
    despesas: &[Despesa],
    fim: Competencia,
    meses: u32,
) -> Vec<FluxoMes> {
    let meses = meses.max(1);
    (0..meses)
        .rev()
        .map(|atras| {
            let competencia = fim.menos_meses(atras);
            let parcial = indicadores_financeiro_locais(receitas, despesas, competencia);
            FluxoMes {
                mes_nome: competencia.rotulo_curto(),
                receitas_total: parcial.faturamento_mes,
                despesas_total: parcial.despesas_mes,
                saldo: parcial.lucro_bruto,
            }
        })
        .collect()
}
