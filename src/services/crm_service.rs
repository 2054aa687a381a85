// src/services/crm_service.rs

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::csv_export::{exportar_csv, ArquivoCsv, ColunaCsv},
    common::error::AppError,
    models::consulta::{paginar, CampoLead, ConsultaLeads, Pagina},
    models::crm::{EstagioLead, Lead, LeadPayload, ESTAGIOS},
    models::indicadores::IndicadoresCrm,
    services::indicadores::FonteIndicadores,
    store::{ListaParams, Store},
};

// ===== CRUD de leads =====

#[derive(Clone)]
pub struct CrmService {
    store: Store,
    indicadores: Arc<dyn FonteIndicadores>,
}

impl CrmService {
    pub fn new(store: Store, indicadores: Arc<dyn FonteIndicadores>) -> Self {
        Self { store, indicadores }
    }

    /// Todos os leads não excluídos, mais recentes primeiro.
    pub async fn listar(&self) -> Result<Vec<Lead>, AppError> {
        self.store.listar("leads", &ListaParams::new()).await
    }

    pub async fn buscar(&self, id: Uuid) -> Result<Lead, AppError> {
        self.store.buscar("leads", id).await
    }

    /// Cria (`id = None`) ou edita um lead. Preenche a data de marco do
    /// status quando ela ainda está vazia e assume "Não informada" para
    /// cidade em branco, como a tela fazia.
    pub async fn salvar(
        &self,
        id: Option<Uuid>,
        mut payload: LeadPayload,
        hoje: NaiveDate,
    ) -> Result<Lead, AppError> {
        payload.validate()?;
        payload.preencher_data_do_status(hoje);
        if payload.cidade.as_deref().is_none_or(str::is_empty) {
            payload.cidade = Some("Não informada".to_string());
        }

        match id {
            Some(id) => {
                tracing::info!("Atualizando lead {id}");
                self.store.atualizar("leads", id, &payload).await
            }
            None => {
                if payload.data_entrada.is_none() {
                    payload.data_entrada = Some(hoje);
                }
                tracing::info!("Criando lead \"{}\"", payload.condominio);
                self.store.criar("leads", &payload).await
            }
        }
    }

    pub async fn remover(&self, id: Uuid) -> Result<(), AppError> {
        self.store.remover("leads", id).await
    }

    pub async fn indicadores(
        &self,
        leads: &[Lead],
        hoje: NaiveDate,
    ) -> Result<IndicadoresCrm, AppError> {
        self.indicadores.crm(leads, hoje).await
    }
}

// ===== Pipeline =====

#[derive(Debug, Clone)]
pub struct ColunaPipeline {
    pub estagio: EstagioLead,
    pub leads: Vec<Lead>,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    /// As seis colunas fixas, sempre presentes (vazias inclusive).
    pub colunas: Vec<ColunaPipeline>,
    /// Leads cujo status não é nenhum dos seis estágios. Ficam visíveis
    /// aqui em vez de sumirem do quadro.
    pub fora_do_funil: Vec<Lead>,
}

pub fn agrupar_pipeline(leads: &[Lead]) -> Pipeline {
    let colunas = ESTAGIOS
        .iter()
        .map(|estagio| ColunaPipeline {
            estagio: estagio.clone(),
            leads: leads
                .iter()
                .filter(|l| &l.status == estagio)
                .cloned()
                .collect(),
        })
        .collect();

    let fora_do_funil = leads
        .iter()
        .filter(|l| matches!(l.status, EstagioLead::Outro(_)))
        .cloned()
        .collect();

    Pipeline {
        colunas,
        fora_do_funil,
    }
}

// ===== Tabela =====

/// Busca + filtro de status + ordenação + página, tudo sobre a lista já
/// carregada. Empates preservam a ordem original (sort estável).
pub fn tabela_leads(leads: &[Lead], consulta: &ConsultaLeads) -> Pagina<Lead> {
    let busca = consulta.busca.to_lowercase();

    let mut filtrados: Vec<Lead> = leads
        .iter()
        .filter(|l| {
            let bate_busca = busca.is_empty()
                || contem(Some(&l.condominio), &busca)
                || contem(l.nome_contato.as_deref(), &busca)
                || contem(l.cidade.as_deref(), &busca)
                || contem(l.administradora.as_deref(), &busca);
            let bate_status = match &consulta.status {
                None => true,
                Some(status) => &l.status == status,
            };
            bate_busca && bate_status
        })
        .cloned()
        .collect();

    filtrados.sort_by(|a, b| {
        let ordem = comparar(a, b, consulta.ordenar_por);
        if consulta.ascendente {
            ordem
        } else {
            ordem.reverse()
        }
    });

    paginar(&filtrados, consulta.pagina, consulta.por_pagina)
}

fn contem(campo: Option<&str>, busca: &str) -> bool {
    campo.is_some_and(|texto| texto.to_lowercase().contains(busca))
}

fn comparar(a: &Lead, b: &Lead, campo: CampoLead) -> Ordering {
    match campo {
        CampoLead::Condominio => texto(Some(&a.condominio)).cmp(&texto(Some(&b.condominio))),
        CampoLead::Cidade => texto(a.cidade.as_deref()).cmp(&texto(b.cidade.as_deref())),
        CampoLead::NomeContato => {
            texto(a.nome_contato.as_deref()).cmp(&texto(b.nome_contato.as_deref()))
        }
        CampoLead::ValorEstimado => a
            .valor_estimado
            .unwrap_or_default()
            .cmp(&b.valor_estimado.unwrap_or_default()),
        CampoLead::Status => texto(Some(a.status.as_str())).cmp(&texto(Some(b.status.as_str()))),
        CampoLead::ProximaAcao => {
            texto(a.proxima_acao.as_deref()).cmp(&texto(b.proxima_acao.as_deref()))
        }
        CampoLead::CriadoEm => a.created_at.cmp(&b.created_at),
    }
}

// comparação de texto sem caixa; campo ausente conta como vazio
fn texto(campo: Option<&str>) -> String {
    campo.unwrap_or_default().to_lowercase()
}

// ===== Relatórios anuais =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiltroAno {
    Todos,
    Ano(i32),
}

// Um mesmo lead pode contar em mais de uma coluna: enviados/contratados/
// perdidos medem eventos (as datas de marco), não identidade.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricasRelatorio {
    pub enviados: i64,
    pub contratados: i64,
    pub perdidos: i64,
    pub valor_enviados: Decimal,
    pub valor_contratados: Decimal,
    pub valor_perdidos: Decimal,
    /// round(100 × contratados / enviados); 0 sem orçamentos enviados.
    pub taxa_conversao: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RelatorioAnual {
    pub resumo: MetricasRelatorio,
    /// Uma linha por tipo de serviço, em ordem alfabética. A linha de
    /// total da tabela é o próprio `resumo`.
    pub por_servico: Vec<(String, MetricasRelatorio)>,
}

pub fn relatorio_anual(leads: &[Lead], filtro: FiltroAno) -> RelatorioAnual {
    let enviados = com_data_no_ano(leads, filtro, |l| l.data_envio_orcamento);
    let contratados = com_data_no_ano(leads, filtro, |l| l.data_aprovacao);
    let perdidos = com_data_no_ano(leads, filtro, |l| l.data_perdido);

    let servicos: BTreeSet<String> = enviados
        .iter()
        .chain(&contratados)
        .chain(&perdidos)
        .map(servico_de)
        .collect();

    let por_servico = servicos
        .into_iter()
        .map(|servico| {
            let metricas = metricas(
                &so_do_servico(&enviados, &servico),
                &so_do_servico(&contratados, &servico),
                &so_do_servico(&perdidos, &servico),
            );
            (servico, metricas)
        })
        .collect();

    RelatorioAnual {
        resumo: metricas(&enviados, &contratados, &perdidos),
        por_servico,
    }
}

/// As métricas de cada ano, do mais antigo para o mais recente (dados dos
/// gráficos comparativos da aba de relatórios).
pub fn comparativo_anual(leads: &[Lead], anos: &[i32]) -> Vec<(i32, MetricasRelatorio)> {
    let mut crescente: Vec<i32> = anos.to_vec();
    crescente.sort_unstable();
    crescente
        .into_iter()
        .map(|ano| (ano, relatorio_anual(leads, FiltroAno::Ano(ano)).resumo))
        .collect()
}

/// Anos com algum evento registrado, do mais recente para o mais antigo.
/// Sem data nenhuma na base, o ano corrente.
pub fn anos_disponiveis(leads: &[Lead], hoje: NaiveDate) -> Vec<i32> {
    let mut anos: BTreeSet<i32> = BTreeSet::new();
    for lead in leads {
        for data in [
            lead.data_entrada,
            lead.data_envio_orcamento,
            lead.data_aprovacao,
            lead.data_perdido,
            lead.created_at.map(|em| em.date_naive()),
        ]
        .into_iter()
        .flatten()
        {
            anos.insert(data.year());
        }
    }
    if anos.is_empty() {
        anos.insert(hoje.year());
    }
    anos.into_iter().rev().collect()
}

fn com_data_no_ano(
    leads: &[Lead],
    filtro: FiltroAno,
    data: fn(&Lead) -> Option<NaiveDate>,
) -> Vec<Lead> {
    leads
        .iter()
        .filter(|l| match (data(l), filtro) {
            (None, _) => false,
            (Some(_), FiltroAno::Todos) => true,
            (Some(d), FiltroAno::Ano(ano)) => d.year() == ano,
        })
        .cloned()
        .collect()
}

fn servico_de(lead: &Lead) -> String {
    lead.tipo_servico
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Outro".to_string())
}

fn so_do_servico(leads: &[Lead], servico: &str) -> Vec<Lead> {
    leads
        .iter()
        .filter(|l| servico_de(l) == servico)
        .cloned()
        .collect()
}

fn metricas(enviados: &[Lead], contratados: &[Lead], perdidos: &[Lead]) -> MetricasRelatorio {
    let soma = |leads: &[Lead]| -> Decimal {
        leads
            .iter()
            .map(|l| l.valor_estimado.unwrap_or_default())
            .sum()
    };
    let taxa_conversao = if enviados.is_empty() {
        0
    } else {
        (contratados.len() as f64 / enviados.len() as f64 * 100.0).round() as u32
    };

    MetricasRelatorio {
        enviados: enviados.len() as i64,
        contratados: contratados.len() as i64,
        perdidos: perdidos.len() as i64,
        valor_enviados: soma(enviados),
        valor_contratados: soma(contratados),
        valor_perdidos: soma(perdidos),
        taxa_conversao,
    }
}

// ===== Dados de gráfico =====

/// Quantos leads em cada um dos seis estágios (gráfico de rosca).
pub fn contagem_por_estagio(leads: &[Lead]) -> Vec<(EstagioLead, usize)> {
    ESTAGIOS
        .iter()
        .map(|estagio| {
            (
                estagio.clone(),
                leads.iter().filter(|l| &l.status == estagio).count(),
            )
        })
        .collect()
}

/// Valor estimado somado por cidade, as 10 maiores, leads perdidos fora.
/// Cidade em branco agrupa como "Sem cidade".
pub fn valor_por_cidade(leads: &[Lead]) -> Vec<(String, Decimal)> {
    let mut por_cidade: BTreeMap<String, Decimal> = BTreeMap::new();
    for lead in leads.iter().filter(|l| l.status != EstagioLead::Perdido) {
        let cidade = lead
            .cidade
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "Sem cidade".to_string());
        *por_cidade.entry(cidade).or_default() += lead.valor_estimado.unwrap_or_default();
    }

    let mut ordenado: Vec<(String, Decimal)> = por_cidade.into_iter().collect();
    ordenado.sort_by(|a, b| b.1.cmp(&a.1));
    ordenado.truncate(10);
    ordenado
}

// ===== Exportação =====

pub fn colunas_csv_leads() -> Vec<ColunaCsv<Lead>> {
    vec![
        ColunaCsv::new("Condomínio", |l: &Lead| l.condominio.clone()),
        ColunaCsv::new("Cidade", |l: &Lead| l.cidade.clone().unwrap_or_default()),
        ColunaCsv::new("Contato", |l: &Lead| {
            l.nome_contato.clone().unwrap_or_default()
        }),
        ColunaCsv::new("Telefone", |l: &Lead| {
            l.telefone.clone().unwrap_or_default()
        }),
        ColunaCsv::new("Tipo Serviço", |l: &Lead| {
            l.tipo_servico.clone().unwrap_or_default()
        }),
        ColunaCsv::new("Valor Estimado", |l: &Lead| {
            l.valor_estimado.map(|v| v.to_string()).unwrap_or_default()
        }),
        ColunaCsv::new("Status", |l: &Lead| l.status.rotulo().to_string()),
        ColunaCsv::new("Probabilidade", |l: &Lead| {
            l.probabilidade.map(|p| p.to_string()).unwrap_or_default()
        }),
        ColunaCsv::new("Próxima Ação", |l: &Lead| {
            l.proxima_acao.clone().unwrap_or_default()
        }),
        ColunaCsv::new("Administradora", |l: &Lead| {
            l.administradora.clone().unwrap_or_default()
        }),
        ColunaCsv::new("Data Entrada", |l: &Lead| data_texto(l.data_entrada)),
        ColunaCsv::new("Data Envio Orçamento", |l: &Lead| {
            data_texto(l.data_envio_orcamento)
        }),
        ColunaCsv::new("Data Aprovação", |l: &Lead| data_texto(l.data_aprovacao)),
        ColunaCsv::new("Data Perdido", |l: &Lead| data_texto(l.data_perdido)),
        ColunaCsv::new("Observações", |l: &Lead| {
            l.observacoes.clone().unwrap_or_default()
        }),
    ]
}

pub fn exportar_leads(leads: &[Lead], hoje: NaiveDate) -> Result<ArquivoCsv, AppError> {
    exportar_csv(leads, "crm-leads", &colunas_csv_leads(), hoje)
}

fn data_texto(data: Option<NaiveDate>) -> String {
    data.map(|d| d.to_string()).unwrap_or_default()
}
