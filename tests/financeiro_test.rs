// Financeiro contra um servidor falso: a escolha da fonte de indicadores na
// inicialização, a concordância entre a fonte remota e o recálculo local, o
// parcelamento manual de receita e as baixas de status.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use erp_predial::common::datas::Competencia;
use erp_predial::models::financeiro::{
    Despesa, Receita, ReceitaPayload, StatusDespesa, StatusReceita,
};
use erp_predial::services::indicadores::{
    indicadores_financeiro_locais, resolver, IndicadoresRemotos,
};
use erp_predial::services::FinanceiroService;
use erp_predial::store::Store;
use erp_predial::AppError;

fn store(servidor: &MockServer) -> Store {
    Store::new(&servidor.uri(), "chave-teste").unwrap()
}

fn receita(status: StatusReceita, valor: &str, data: (i32, u32, u32)) -> Receita {
    Receita {
        id: Uuid::new_v4(),
        obra_id: None,
        descricao: "r".to_string(),
        valor: Some(valor.parse().unwrap()),
        data_prevista: NaiveDate::from_ymd_opt(data.0, data.1, data.2),
        status,
        created_at: None,
        updated_at: None,
        deleted_at: None,
    }
}

fn despesa(status: StatusDespesa, valor: &str, data: (i32, u32, u32)) -> Despesa {
    Despesa {
        id: Uuid::new_v4(),
        obra_id: None,
        descricao: "d".to_string(),
        categoria: None,
        valor: Some(valor.parse().unwrap()),
        data_vencimento: NaiveDate::from_ymd_opt(data.0, data.1, data.2),
        status,
        created_at: None,
        updated_at: None,
        deleted_at: None,
    }
}

#[tokio::test]
async fn resolver_prefere_as_views_quando_existem() {
    let servidor = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/vw_crm_kpis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "leads_ativos": 4 }])))
        .mount(&servidor)
        .await;

    let fonte = resolver(&store(&servidor)).await;
    assert_eq!(fonte.origem(), "views do banco");
}

#[tokio::test]
async fn resolver_cai_para_o_calculo_local_sem_as_views() {
    let servidor = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/vw_crm_kpis"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "relation \"public.vw_crm_kpis\" does not exist"
        })))
        .mount(&servidor)
        .await;

    let fonte = resolver(&store(&servidor)).await;
    assert_eq!(fonte.origem(), "cálculo local");
}

// Para dados bem formados as duas fontes têm que bater no centavo.
#[tokio::test]
async fn fonte_remota_e_recalculo_local_concordam() {
    let servidor = MockServer::start().await;
    let competencia = Competencia::new(2026, 8);

    let receitas = vec![
        receita(StatusReceita::Recebido, "750.50", (2026, 8, 5)),
        receita(StatusReceita::Recebido, "249.50", (2026, 8, 18)),
        receita(StatusReceita::Previsto, "400.00", (2026, 8, 20)),
    ];
    let despesas = vec![
        despesa(StatusDespesa::Pago, "300.00", (2026, 8, 10)),
        despesa(StatusDespesa::Pendente, "120.00", (2026, 8, 12)),
    ];
    let local = indicadores_financeiro_locais(&receitas, &despesas, competencia);

    // a função do banco, calculando a mesma coisa do lado de lá
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/fn_financeiro_kpis"))
        .and(body_json(json!({ "p_ano": 2026, "p_mes": 8 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "faturamento_mes": 1000.0,
            "despesas_mes": 300.0,
            "lucro_bruto": 700.0,
        })))
        .expect(1)
        .mount(&servidor)
        .await;

    let remota = FinanceiroService::new(
        store(&servidor),
        Arc::new(IndicadoresRemotos::new(store(&servidor))),
    );
    let kpis = remota
        .indicadores(&receitas, &despesas, competencia)
        .await
        .unwrap();

    assert_eq!(kpis, local);
    assert_eq!(kpis.lucro_bruto, Decimal::from(700));
}

#[tokio::test]
async fn criar_receita_parcelada_fecha_a_soma_e_clampa_as_datas() {
    let servidor = MockServer::start().await;

    let resposta = json!([{
        "id": Uuid::new_v4(),
        "descricao": "Retrofit - Parcela",
        "status": "previsto",
    }]);
    // 1000 em 3: duas de 333,33 e a última de 333,34; partindo de 31/jan as
    // datas clampam no fim do mês
    let esperadas = [
        json!({ "descricao": "Retrofit fachada - Parcela 1/3", "valor": 333.33, "data_prevista": "2026-01-31" }),
        json!({ "descricao": "Retrofit fachada - Parcela 2/3", "valor": 333.33, "data_prevista": "2026-02-28" }),
        json!({ "descricao": "Retrofit fachada - Parcela 3/3", "valor": 333.34, "data_prevista": "2026-03-31" }),
    ];
    for corpo in &esperadas {
        Mock::given(method("POST"))
            .and(path("/rest/v1/receitas"))
            .and(body_partial_json(corpo))
            .respond_with(ResponseTemplate::new(201).set_body_json(&resposta))
            .expect(1)
            .mount(&servidor)
            .await;
    }

    let servico = FinanceiroService::new(
        store(&servidor),
        Arc::new(IndicadoresRemotos::new(store(&servidor))),
    );
    let payload = ReceitaPayload {
        obra_id: None,
        descricao: "Retrofit fachada".to_string(),
        valor: "1000.00".parse().unwrap(),
        data_prevista: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        status: StatusReceita::Previsto,
    };

    let criadas = servico.criar_receita(payload, 3).await.unwrap();
    assert_eq!(criadas.len(), 3);
}

#[tokio::test]
async fn receita_invalida_nao_chega_na_rede() {
    // servidor sem mock nenhum: qualquer requisição estouraria em 404
    let servidor = MockServer::start().await;
    let servico = FinanceiroService::new(
        store(&servidor),
        Arc::new(IndicadoresRemotos::new(store(&servidor))),
    );

    let payload = ReceitaPayload {
        obra_id: None,
        descricao: "Sem valor".to_string(),
        valor: Decimal::ZERO,
        data_prevista: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        status: StatusReceita::Previsto,
    };

    let erro = servico.criar_receita(payload, 1).await;
    assert!(matches!(erro, Err(AppError::Validacao(_))));
}

#[tokio::test]
async fn marcar_recebido_e_um_patch_de_status() {
    let servidor = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/receitas"))
        .and(query_param("id", format!("eq.{id}")))
        .and(body_json(json!({ "status": "recebido" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": id,
            "descricao": "Parcela 2/3",
            "status": "recebido",
        }])))
        .expect(1)
        .mount(&servidor)
        .await;

    let servico = FinanceiroService::new(
        store(&servidor),
        Arc::new(IndicadoresRemotos::new(store(&servidor))),
    );
    let recebida = servico.marcar_recebido(id).await.unwrap();
    assert_eq!(recebida.status, StatusReceita::Recebido);
}

#[tokio::test]
async fn fluxo_de_caixa_remoto_parseia_a_serie_da_funcao() {
    let servidor = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/fn_fluxo_caixa"))
        .and(body_json(json!({ "p_meses": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "mes_nome": "Jun/26", "receitas_total": 100.0, "despesas_total": 40.0, "saldo": 60.0 },
            { "mes_nome": "Jul/26", "receitas_total": "80.00", "despesas_total": 0, "saldo": "80.00" },
            { "mes_nome": "Ago/26", "receitas_total": 0, "despesas_total": 0, "saldo": 0 },
        ])))
        .expect(1)
        .mount(&servidor)
        .await;

    let servico = FinanceiroService::new(
        store(&servidor),
        Arc::new(IndicadoresRemotos::new(store(&servidor))),
    );
    let serie = servico
        .fluxo_caixa(&[], &[], Competencia::new(2026, 8), 3)
        .await
        .unwrap();

    assert_eq!(serie.len(), 3);
    assert_eq!(serie[0].mes_nome, "Jun/26");
    assert_eq!(serie[0].saldo, Decimal::from(60));
    assert_eq!(serie[1].receitas_total, "80.00".parse().unwrap());
    assert_eq!(serie[2].saldo, Decimal::ZERO);
}
