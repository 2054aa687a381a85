// src/services/conversao.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    common::error::{erro_de_validacao, AppError},
    models::financeiro::{Receita, ReceitaPayload, StatusReceita},
    models::obras::Obra,
    services::parcelas::{gerar_parcelas, rotulo_parcela},
    store::{ListaParams, Store},
};

// A conversão de lead em obra não é uma transação: o banco só garante o
// primeiro passo (RPC que cria obra + receita única de uma vez). Os passos
// seguintes são remendos sequenciais, e uma falha no meio deixa a obra num
// estado degradado que a gente reporta mas não desfaz.

/// Os passos da conversão, na ordem em que executam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtapaConversao {
    CriarObra,
    GravarCnpj,
    MarcarAprovacao,
    GerarParcelas,
}

impl std::fmt::Display for EtapaConversao {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let nome = match self {
            EtapaConversao::CriarObra => "criação da obra",
            EtapaConversao::GravarCnpj => "gravação do CNPJ",
            EtapaConversao::MarcarAprovacao => "registro da data de aprovação",
            EtapaConversao::GerarParcelas => "geração das parcelas",
        };
        f.write_str(nome)
    }
}

/// O que o usuário pediu na tela de conversão.
#[derive(Debug, Clone)]
pub struct PedidoConversao {
    pub lead_id: Uuid,
    // None deixa o servidor usar o valor_estimado do lead
    pub valor_fechado: Option<Decimal>,
    pub data_inicio: NaiveDate,
    pub prazo_dias: i32,
    pub parcelas: u32,
    pub cnpj: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultadoConversao {
    pub obra_id: Uuid,
    /// 0 quando ficou na receita única criada pelo servidor.
    pub parcelas_criadas: u32,
}

#[derive(Clone)]
pub struct ConversaoService {
    store: Store,
}

impl ConversaoService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Converte o lead em obra.
    ///
    /// O passo 1 (RPC `converter_lead_em_obra`) é atômico no servidor; se ele
    /// falhar nada foi criado e o erro sobe como `Remoto` comum. Dos passos 2
    /// em diante a obra já existe, então qualquer falha vira
    /// `ConversaoParcial` com o rastro do que chegou a completar.
    pub async fn converter(
        &self,
        pedido: &PedidoConversao,
        hoje: NaiveDate,
    ) -> Result<ResultadoConversao, AppError> {
        if pedido.parcelas == 0 {
            return Err(erro_de_validacao(
                "parcelas",
                "A quantidade de parcelas deve ser pelo menos 1.",
            ));
        }
        if pedido.prazo_dias <= 0 {
            return Err(erro_de_validacao(
                "prazo_dias",
                "O prazo em dias deve ser maior que zero.",
            ));
        }

        // Passo 1: obra + receita única, atômico no servidor
        let obra_id: Uuid = self
            .store
            .rpc_tipado(
                "converter_lead_em_obra",
                &json!({
                    "p_lead_id": pedido.lead_id,
                    "p_valor_fechado": pedido.valor_fechado,
                    "p_data_inicio": pedido.data_inicio,
                    "p_prazo_dias": pedido.prazo_dias,
                }),
            )
            .await?;
        tracing::info!("Obra {obra_id} criada a partir do lead {}", pedido.lead_id);

        let mut concluidas = vec![EtapaConversao::CriarObra];

        // Passo 2: CNPJ na obra, se veio
        if let Some(cnpj) = &pedido.cnpj {
            let _: Value = self
                .store
                .atualizar("obras", obra_id, &json!({ "cnpj": cnpj }))
                .await
                .map_err(|err| parcial(obra_id, EtapaConversao::GravarCnpj, &concluidas, err))?;
            concluidas.push(EtapaConversao::GravarCnpj);
        }

        // Passo 3: data de aprovação no lead
        let _: Value = self
            .store
            .atualizar("leads", pedido.lead_id, &json!({ "data_aprovacao": hoje }))
            .await
            .map_err(|err| parcial(obra_id, EtapaConversao::MarcarAprovacao, &concluidas, err))?;
        concluidas.push(EtapaConversao::MarcarAprovacao);

        // Passo 4: trocar a receita única pelas parcelas
        let mut parcelas_criadas = 0;
        if pedido.parcelas > 1 {
            parcelas_criadas = self
                .substituir_por_parcelas(
                    obra_id,
                    pedido.valor_fechado,
                    pedido.parcelas,
                    pedido.data_inicio,
                )
                .await
                .map_err(|err| parcial(obra_id, EtapaConversao::GerarParcelas, &concluidas, err))?;
        }

        tracing::info!(
            "Conversão do lead {} concluída (obra {obra_id}, {parcelas_criadas} parcelas)",
            pedido.lead_id
        );
        Ok(ResultadoConversao {
            obra_id,
            parcelas_criadas,
        })
    }

    /// Troca as receitas da obra por `quantidade` parcelas mensais.
    ///
    /// Idempotente por obra: apaga TODAS as receitas vinculadas antes de
    /// criar as novas, então repetir a chamada depois de uma falha no meio
    /// converge para exatamente N parcelas somando o valor fechado. Sem
    /// `total` informado, o valor vem da própria obra.
    pub async fn substituir_por_parcelas(
        &self,
        obra_id: Uuid,
        total: Option<Decimal>,
        quantidade: u32,
        inicio: NaiveDate,
    ) -> Result<u32, AppError> {
        let total = match total {
            Some(valor) => valor,
            None => {
                let obra: Obra = self.store.buscar("obras", obra_id).await?;
                obra.valor_fechado.unwrap_or_default()
            }
        };

        let existentes: Vec<Receita> = self
            .store
            .listar(
                "receitas",
                &ListaParams::new().filtro("obra_id", Some(obra_id.to_string())),
            )
            .await?;
        for receita in &existentes {
            self.store.remover("receitas", receita.id).await?;
        }

        let parcelas = gerar_parcelas(total, quantidade, inicio);
        let quantidade = parcelas.len() as u32;
        for parcela in &parcelas {
            let payload = ReceitaPayload {
                obra_id: Some(obra_id),
                descricao: rotulo_parcela(None, parcela.numero, quantidade),
                valor: parcela.valor,
                data_prevista: parcela.data_prevista,
                status: StatusReceita::Previsto,
            };
            let _: Value = self.store.criar("receitas", &payload).await?;
        }

        Ok(quantidade)
    }
}

fn parcial(
    obra_id: Uuid,
    etapa: EtapaConversao,
    concluidas: &[EtapaConversao],
    fonte: AppError,
) -> AppError {
    tracing::warn!("Conversão parou em \"{etapa}\" com a obra {obra_id} já criada: {fonte}");
    AppError::ConversaoParcial {
        obra_id,
        etapa,
        concluidas: concluidas.to_vec(),
        fonte: Box::new(fonte),
    }
}
