// src/services/obras_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::consulta::{paginar, Pagina},
    models::financeiro::{Despesa, Receita, StatusDespesa, StatusReceita},
    models::indicadores::IndicadoresObras,
    models::obras::{Obra, ObraPayload, StatusObra, STATUS_OBRA},
    services::indicadores::FonteIndicadores,
    store::{ListaParams, Store},
};

// Prazo assumido quando a obra é salva sem um
pub const PRAZO_PADRAO_DIAS: i32 = 90;

#[derive(Clone)]
pub struct ObrasService {
    store: Store,
    indicadores: Arc<dyn FonteIndicadores>,
}

impl ObrasService {
    pub fn new(store: Store, indicadores: Arc<dyn FonteIndicadores>) -> Self {
        Self { store, indicadores }
    }

    pub async fn listar(&self) -> Result<Vec<Obra>, AppError> {
        self.store.listar("obras", &ListaParams::new()).await
    }

    /// Obras em ordem alfabética, para o select de vínculo do financeiro.
    pub async fn listar_para_vinculo(&self) -> Result<Vec<Obra>, AppError> {
        self.store
            .listar("obras", &ListaParams::new().ordenar_por("condominio", true))
            .await
    }

    pub async fn buscar(&self, id: Uuid) -> Result<Obra, AppError> {
        self.store.buscar("obras", id).await
    }

    pub async fn salvar(
        &self,
        id: Option<Uuid>,
        mut payload: ObraPayload,
    ) -> Result<Obra, AppError> {
        payload.validate()?;
        if payload.prazo_dias.is_none_or(|prazo| prazo <= 0) {
            payload.prazo_dias = Some(PRAZO_PADRAO_DIAS);
        }

        match id {
            Some(id) => {
                tracing::info!("Atualizando obra {id}");
                self.store.atualizar("obras", id, &payload).await
            }
            None => {
                tracing::info!("Criando obra \"{}\"", payload.condominio);
                self.store.criar("obras", &payload).await
            }
        }
    }

    pub async fn remover(&self, id: Uuid) -> Result<(), AppError> {
        self.store.remover("obras", id).await
    }

    pub async fn indicadores(&self, obras: &[Obra]) -> Result<IndicadoresObras, AppError> {
        self.indicadores.obras(obras).await
    }

    /// Receitas e despesas vinculadas à obra, com os totais do modal
    /// financeiro.
    pub async fn financeiro_da_obra(&self, id: Uuid) -> Result<ResumoFinanceiroObra, AppError> {
        let obra: Obra = self.store.buscar("obras", id).await?;
        let vinculo = ListaParams::new().filtro("obra_id", Some(id.to_string()));
        let receitas: Vec<Receita> = self.store.listar("receitas", &vinculo).await?;
        let despesas: Vec<Despesa> = self.store.listar("despesas", &vinculo).await?;
        Ok(ResumoFinanceiroObra::montar(obra, receitas, despesas))
    }
}

// ===== Financeiro por obra =====

#[derive(Debug, Clone)]
pub struct ResumoFinanceiroObra {
    pub obra: Obra,
    pub receitas: Vec<Receita>,
    pub despesas: Vec<Despesa>,
    pub total_previsto: Decimal,
    pub total_recebido: Decimal,
    pub total_despesas: Decimal,
    pub total_pago: Decimal,
}

impl ResumoFinanceiroObra {
    fn montar(obra: Obra, receitas: Vec<Receita>, despesas: Vec<Despesa>) -> Self {
        let total_previsto = receitas.iter().map(|r| r.valor.unwrap_or_default()).sum();
        let total_recebido = receitas
            .iter()
            .filter(|r| r.status == StatusReceita::Recebido)
            .map(|r| r.valor.unwrap_or_default())
            .sum();
        let total_despesas = despesas.iter().map(|d| d.valor.unwrap_or_default()).sum();
        let total_pago = despesas
            .iter()
            .filter(|d| d.status == StatusDespesa::Pago)
            .map(|d| d.valor.unwrap_or_default())
            .sum();

        Self {
            obra,
            receitas,
            despesas,
            total_previsto,
            total_recebido,
            total_despesas,
            total_pago,
        }
    }
}

// ===== Quadro =====

#[derive(Debug, Clone)]
pub struct ColunaQuadro {
    pub status: StatusObra,
    pub obras: Vec<Obra>,
}

#[derive(Debug, Clone)]
pub struct QuadroObras {
    pub colunas: Vec<ColunaQuadro>,
    /// Obras com status fora do fluxo fixo, como no pipeline do CRM.
    pub fora_do_quadro: Vec<Obra>,
}

pub fn agrupar_quadro(obras: &[Obra]) -> QuadroObras {
    let colunas = STATUS_OBRA
        .iter()
        .map(|status| ColunaQuadro {
            status: status.clone(),
            obras: obras
                .iter()
                .filter(|o| &o.status == status)
                .cloned()
                .collect(),
        })
        .collect();

    let fora_do_quadro = obras
        .iter()
        .filter(|o| matches!(o.status, StatusObra::Outro(_)))
        .cloned()
        .collect();

    QuadroObras {
        colunas,
        fora_do_quadro,
    }
}

// ===== Tabela =====

/// Busca por condomínio/cliente mais paginação, na ordem em que a lista
/// veio do banco.
pub fn tabela_obras(obras: &[Obra], busca: &str, pagina: usize, por_pagina: usize) -> Pagina<Obra> {
    let busca = busca.to_lowercase();
    let filtradas: Vec<Obra> = obras
        .iter()
        .filter(|o| {
            busca.is_empty()
                || o.condominio.to_lowercase().contains(&busca)
                || o.cliente
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&busca))
        })
        .cloned()
        .collect();

    paginar(&filtradas, pagina, por_pagina)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::consulta::POR_PAGINA_PADRAO;
    use chrono::NaiveDate;

    fn obra(condominio: &str, cliente: Option<&str>, status: StatusObra) -> Obra {
        Obra {
            id: Uuid::new_v4(),
            condominio: condominio.to_string(),
            cliente: cliente.map(str::to_string),
            cnpj: None,
            cidade: None,
            valor_fechado: None,
            data_inicio: None,
            prazo_dias: None,
            status,
            observacoes: None,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }

    #[test]
    fn quadro_tem_as_tres_colunas_fixas() {
        let obras = vec![
            obra("A", None, StatusObra::Planejamento),
            obra("B", None, StatusObra::EmExecucao),
            obra("C", None, StatusObra::Outro("paralisada".into())),
        ];

        let quadro = agrupar_quadro(&obras);
        assert_eq!(quadro.colunas.len(), 3);
        assert_eq!(quadro.colunas[0].obras.len(), 1);
        assert_eq!(quadro.colunas[1].obras.len(), 1);
        assert!(quadro.colunas[2].obras.is_empty());
        assert_eq!(quadro.fora_do_quadro.len(), 1);
        assert_eq!(quadro.fora_do_quadro[0].condominio, "C");
    }

    #[test]
    fn tabela_busca_condominio_e_cliente() {
        let obras = vec![
            obra("Residencial Norte", Some("Síndica Ana"), StatusObra::EmExecucao),
            obra("Edifício Sul", Some("Carlos"), StatusObra::Planejamento),
        ];

        let por_cliente = tabela_obras(&obras, "ana", 1, POR_PAGINA_PADRAO);
        assert_eq!(por_cliente.total, 1);
        assert_eq!(por_cliente.itens[0].condominio, "Residencial Norte");

        let por_condominio = tabela_obras(&obras, "sul", 1, POR_PAGINA_PADRAO);
        assert_eq!(por_condominio.total, 1);

        let sem_busca = tabela_obras(&obras, "", 1, POR_PAGINA_PADRAO);
        assert_eq!(sem_busca.total, 2);
    }

    #[test]
    fn resumo_financeiro_separa_previsto_de_realizado() {
        let o = obra("A", None, StatusObra::EmExecucao);
        let obra_id = o.id;
        let receita = move |valor: &str, status: StatusReceita| Receita {
            id: Uuid::new_v4(),
            obra_id: Some(obra_id),
            descricao: "r".to_string(),
            valor: Some(valor.parse().unwrap()),
            data_prevista: NaiveDate::from_ymd_opt(2026, 8, 1),
            status,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        };
        let despesa = move |valor: &str, status: StatusDespesa| Despesa {
            id: Uuid::new_v4(),
            obra_id: Some(obra_id),
            descricao: "d".to_string(),
            categoria: None,
            valor: Some(valor.parse().unwrap()),
            data_vencimento: NaiveDate::from_ymd_opt(2026, 8, 1),
            status,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        };

        let resumo = ResumoFinanceiroObra::montar(
            o,
            vec![
                receita("1000.00", StatusReceita::Recebido),
                receita("500.00", StatusReceita::Previsto),
            ],
            vec![
                despesa("300.00", StatusDespesa::Pago),
                despesa("200.00", StatusDespesa::Pendente),
            ],
        );

        assert_eq!(resumo.receitas[0].obra_id, Some(resumo.obra.id));
        assert_eq!(resumo.total_previsto, Decimal::from(1500));
        assert_eq!(resumo.total_recebido, Decimal::from(1000));
        assert_eq!(resumo.total_despesas, Decimal::from(500));
        assert_eq!(resumo.total_pago, Decimal::from(300));
    }
}
