// src/store/params.rs

// Valor de filtro que a interface usa para "sem filtro".
pub const TODOS: &str = "todos";

/// Busca textual: um termo aplicado com OR sobre vários campos (ilike).
#[derive(Debug, Clone)]
pub struct Busca {
    pub termo: String,
    pub campos: Vec<&'static str>,
}

// Parâmetros de listagem no formato que o PostgREST entende.
// Filtros com `None`, string vazia ou "todos" são ignorados, igual as telas
// mandam quando o usuário não escolheu nada.
#[derive(Debug, Clone)]
pub struct ListaParams {
    pub ordenar_por: String,
    pub ascendente: bool,
    filtros: Vec<(String, Option<String>)>,
    busca: Option<Busca>,
}

impl Default for ListaParams {
    fn default() -> Self {
        Self {
            ordenar_por: "created_at".to_string(),
            ascendente: false,
            filtros: Vec::new(),
            busca: None,
        }
    }
}

impl ListaParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ordenar_por(mut self, campo: &str, ascendente: bool) -> Self {
        self.ordenar_por = campo.to_string();
        self.ascendente = ascendente;
        self
    }

    pub fn filtro(mut self, campo: &str, valor: Option<String>) -> Self {
        self.filtros.push((campo.to_string(), valor));
        self
    }

    pub fn buscar(mut self, termo: &str, campos: &[&'static str]) -> Self {
        self.busca = Some(Busca {
            termo: termo.to_string(),
            campos: campos.to_vec(),
        });
        self
    }

    /// Pares de query (ordem, filtros de igualdade, busca OR) para a URL.
    pub(crate) fn pares_query(&self) -> Vec<(String, String)> {
        let direcao = if self.ascendente { "asc" } else { "desc" };
        let mut pares = vec![(
            "order".to_string(),
            format!("{}.{}", self.ordenar_por, direcao),
        )];

        for (campo, valor) in &self.filtros {
            if filtro_aplicavel(valor) {
                let valor = valor.as_deref().unwrap_or_default();
                pares.push((campo.clone(), format!("eq.{valor}")));
            }
        }

        if let Some(busca) = &self.busca {
            if !busca.termo.is_empty() && !busca.campos.is_empty() {
                let clausulas: Vec<String> = busca
                    .campos
                    .iter()
                    .map(|campo| format!("{}.ilike.*{}*", campo, busca.termo))
                    .collect();
                pares.push(("or".to_string(), format!("({})", clausulas.join(","))));
            }
        }

        pares
    }
}

pub(crate) fn filtro_aplicavel(valor: &Option<String>) -> bool {
    match valor {
        None => false,
        Some(v) => !v.is_empty() && v != TODOS,
    }
}
