// src/models/consulta.rs

use serde::Serialize;

use crate::models::crm::EstagioLead;

pub const POR_PAGINA_PADRAO: usize = 10;

/// Uma página já fatiada de uma listagem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagina<T> {
    pub itens: Vec<T>,
    pub total: usize,
    pub total_paginas: usize,
    pub pagina: usize,
    pub por_pagina: usize,
}

/// Fatia `itens` na página pedida (1-based). Página além do fim é vazia.
pub fn paginar<T: Clone>(itens: &[T], pagina: usize, por_pagina: usize) -> Pagina<T> {
    let por_pagina = por_pagina.max(1);
    let inicio = pagina.saturating_sub(1) * por_pagina;

    Pagina {
        itens: itens.iter().skip(inicio).take(por_pagina).cloned().collect(),
        total: itens.len(),
        total_paginas: itens.len().div_ceil(por_pagina),
        pagina,
        por_pagina,
    }
}

// Colunas ordenáveis da tabela de leads. Enum em vez de nome solto de campo:
// coluna que não existe nem compila.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampoLead {
    Condominio,
    Cidade,
    NomeContato,
    ValorEstimado,
    Status,
    ProximaAcao,
    CriadoEm,
}

// Estado da tabela de leads: busca, filtro, ordenação e página.
// Quem guarda isso entre interações é a tela; aqui só viaja como parâmetro.
#[derive(Debug, Clone)]
pub struct ConsultaLeads {
    pub busca: String,
    pub status: Option<EstagioLead>, // None = "todos"
    pub ordenar_por: CampoLead,
    pub ascendente: bool,
    pub pagina: usize,
    pub por_pagina: usize,
}

impl Default for ConsultaLeads {
    fn default() -> Self {
        Self {
            busca: String::new(),
            status: None,
            ordenar_por: CampoLead::CriadoEm,
            ascendente: false,
            pagina: 1,
            por_pagina: POR_PAGINA_PADRAO,
        }
    }
}

impl ConsultaLeads {
    /// Clique no cabeçalho: mesma coluna inverte a direção, coluna nova
    /// começa ascendente.
    pub fn alternar_ordenacao(&mut self, campo: CampoLead) {
        if self.ordenar_por == campo {
            self.ascendente = !self.ascendente;
        } else {
            self.ordenar_por = campo;
            self.ascendente = true;
        }
    }
}
