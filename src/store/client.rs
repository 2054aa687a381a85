// src/store/client.rs

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::store::params::{filtro_aplicavel, ListaParams};

// ===== CRUD genérico sobre a API REST do Supabase =====
//
// Todas as coleções passam por aqui: leads, obras, receitas, despesas e as
// views de KPI. Exclusão é sempre soft delete (`deleted_at`), e as listagens
// escondem o que foi excluído.
#[derive(Clone)]
pub struct Store {
    http: reqwest::Client,
    base: String,
}

impl Store {
    /// `url` é a URL do projeto; a chave vai nos headers `apikey` e
    /// `Authorization` de toda requisição.
    pub fn new(url: &str, chave: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(chave)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {chave}"))?,
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base: format!("{}/rest/v1", url.trim_end_matches('/')),
        })
    }

    fn url(&self, caminho: &str) -> String {
        format!("{}/{}", self.base, caminho)
    }

    // Listar registros (sem os soft-deleted)
    pub async fn listar<T: DeserializeOwned>(
        &self,
        colecao: &str,
        params: &ListaParams,
    ) -> Result<Vec<T>, AppError> {
        let mut query = vec![
            ("select".to_string(), "*".to_string()),
            ("deleted_at".to_string(), "is.null".to_string()),
        ];
        query.extend(params.pares_query());

        let resposta = self.http.get(self.url(colecao)).query(&query).send().await?;
        let resposta = Self::conferir(resposta).await?;
        Ok(resposta.json().await?)
    }

    // Buscar um registro por ID. Zero linhas (ou mais de uma) é NaoEncontrado.
    pub async fn buscar<T: DeserializeOwned>(
        &self,
        colecao: &str,
        id: Uuid,
    ) -> Result<T, AppError> {
        let query = [("select", "*".to_string()), ("id", format!("eq.{id}"))];
        let resposta = self.http.get(self.url(colecao)).query(&query).send().await?;
        let resposta = Self::conferir(resposta).await?;

        let mut linhas: Vec<T> = resposta.json().await?;
        if linhas.len() == 1 {
            Ok(linhas.remove(0))
        } else {
            Err(AppError::NaoEncontrado)
        }
    }

    // Criar registro, devolvendo a linha persistida inteira
    pub async fn criar<T, B>(&self, colecao: &str, campos: &B) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let resposta = self
            .http
            .post(self.url(colecao))
            .header("Prefer", "return=representation")
            .query(&[("select", "*")])
            .json(campos)
            .send()
            .await?;
        let resposta = Self::conferir(resposta).await?;

        let mut linhas: Vec<T> = resposta.json().await?;
        linhas.pop().ok_or(AppError::NaoEncontrado)
    }

    // Atualizar registro existente
    pub async fn atualizar<T, B>(
        &self,
        colecao: &str,
        id: Uuid,
        mudancas: &B,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let resposta = self
            .http
            .patch(self.url(colecao))
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{id}")), ("select", "*".to_string())])
            .json(mudancas)
            .send()
            .await?;
        let resposta = Self::conferir(resposta).await?;

        let mut linhas: Vec<T> = resposta.json().await?;
        linhas.pop().ok_or(AppError::NaoEncontrado)
    }

    // Soft delete: marca `deleted_at` com o agora. Remover de novo (ou um id
    // inexistente) não é erro.
    pub async fn remover(&self, colecao: &str, id: Uuid) -> Result<(), AppError> {
        let marca = serde_json::json!({ "deleted_at": Utc::now() });
        let resposta = self
            .http
            .patch(self.url(colecao))
            .query(&[("id", format!("eq.{id}"))])
            .json(&marca)
            .send()
            .await?;
        Self::conferir(resposta).await?;
        Ok(())
    }

    // Chamar função RPC (ex.: converter_lead_em_obra)
    pub async fn rpc(&self, funcao: &str, parametros: &Value) -> Result<Value, AppError> {
        self.rpc_tipado(funcao, parametros).await
    }

    /// Mesmo que `rpc`, mas já desserializa no formato que o chamador conhece.
    pub async fn rpc_tipado<T: DeserializeOwned>(
        &self,
        funcao: &str,
        parametros: &Value,
    ) -> Result<T, AppError> {
        let resposta = self
            .http
            .post(format!("{}/rpc/{}", self.base, funcao))
            .json(parametros)
            .send()
            .await?;
        let resposta = Self::conferir(resposta).await?;
        Ok(resposta.json().await?)
    }

    // Primeira linha de uma view de KPIs, como mapa de campos.
    // View vazia devolve mapa vazio, não erro.
    pub async fn kpis(&self, visao: &str) -> Result<Map<String, Value>, AppError> {
        let resposta = self
            .http
            .get(self.url(visao))
            .query(&[("select", "*")])
            .send()
            .await?;
        let resposta = Self::conferir(resposta).await?;

        let linhas: Vec<Map<String, Value>> = resposta.json().await?;
        Ok(linhas.into_iter().next().unwrap_or_default())
    }

    // Contagem exata via header Content-Range, sem baixar as linhas
    pub async fn contar(
        &self,
        colecao: &str,
        filtros: &[(&str, Option<String>)],
    ) -> Result<u64, AppError> {
        let mut query = vec![
            ("select".to_string(), "*".to_string()),
            ("deleted_at".to_string(), "is.null".to_string()),
        ];
        for (campo, valor) in filtros {
            if filtro_aplicavel(valor) {
                let valor = valor.as_deref().unwrap_or_default();
                query.push(((*campo).to_string(), format!("eq.{valor}")));
            }
        }

        let resposta = self
            .http
            .head(self.url(colecao))
            .header("Prefer", "count=exact")
            .query(&query)
            .send()
            .await?;
        let resposta = Self::conferir(resposta).await?;

        let contagem = resposta
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(total_do_content_range)
            .unwrap_or(0);
        Ok(contagem)
    }

    // Inserir vários registros de uma vez (para migração)
    pub async fn criar_em_lote<T, B>(&self, colecao: &str, registros: &B) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let resposta = self
            .http
            .post(self.url(colecao))
            .header("Prefer", "return=representation")
            .query(&[("select", "*")])
            .json(registros)
            .send()
            .await?;
        let resposta = Self::conferir(resposta).await?;
        Ok(resposta.json().await?)
    }

    /// Teste rápido de conectividade usado na inicialização.
    pub async fn verificar_conexao(&self) -> Result<(), AppError> {
        self.contar("leads", &[]).await?;
        Ok(())
    }

    // Erros do PostgREST vêm com a mensagem num corpo JSON; repassamos ela
    // como veio. Corpo ilegível vira o texto bruto.
    async fn conferir(resposta: reqwest::Response) -> Result<reqwest::Response, AppError> {
        if resposta.status().is_success() {
            return Ok(resposta);
        }
        let texto = resposta.text().await.unwrap_or_default();
        let mensagem = serde_json::from_str::<Value>(&texto)
            .ok()
            .and_then(|corpo| {
                corpo
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or(texto);
        Err(AppError::Remoto(mensagem))
    }
}

// Content-Range chega como "0-24/3573" (ou "*/0" sem linhas)
fn total_do_content_range(valor: &str) -> Option<u64> {
    valor.rsplit('/').next()?.parse().ok()
}
