// src/config.rs

use std::env;
use std::sync::Arc;

use anyhow::Context;

use crate::{
    services::{
        indicadores::{resolver, FonteIndicadores},
        ConversaoService, CrmService, FinanceiroService, ObrasService,
    },
    store::Store,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_key: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let supabase_url =
            env::var("SUPABASE_URL").context("SUPABASE_URL deve ser definida")?;
        let supabase_key =
            env::var("SUPABASE_KEY").context("SUPABASE_KEY deve ser definida")?;

        Ok(Self {
            supabase_url,
            supabase_key,
        })
    }
}

// O estado que a camada de apresentação carrega: o cliente do armazenamento
// e os serviços já montados sobre ele.
#[derive(Clone)]
pub struct AppContext {
    pub store: Store,
    pub indicadores: Arc<dyn FonteIndicadores>,
    pub crm: CrmService,
    pub obras: ObrasService,
    pub financeiro: FinanceiroService,
    pub conversao: ConversaoService,
}

impl AppContext {
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;
        Self::com_config(&config).await
    }

    pub async fn com_config(config: &Config) -> anyhow::Result<Self> {
        let store = Store::new(&config.supabase_url, &config.supabase_key)?;
        store
            .verificar_conexao()
            .await
            .context("Falha ao conectar no Supabase")?;
        tracing::info!("✅ Conexão com o armazenamento estabelecida com sucesso!");

        // A fonte de indicadores é decidida uma vez, aqui
        let indicadores = resolver(&store).await;

        // --- Monta o gráfico de dependências ---
        let crm = CrmService::new(store.clone(), indicadores.clone());
        let obras = ObrasService::new(store.clone(), indicadores.clone());
        let financeiro = FinanceiroService::new(store.clone(), indicadores.clone());
        let conversao = ConversaoService::new(store.clone());

        Ok(Self {
            store,
            indicadores,
            crm,
            obras,
            financeiro,
            conversao,
        })
    }
}
