// src/common/datas.rs

use chrono::{Datelike, Local, NaiveDate};

// --- Meses em português ---
pub const NOMES_MESES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Nome do mês (1 a 12). Fora da faixa retorna string vazia.
pub fn nome_do_mes(mes: u32) -> &'static str {
    if (1..=12).contains(&mes) {
        NOMES_MESES[(mes - 1) as usize]
    } else {
        ""
    }
}

// A competência (mês/ano) que a tela de financeiro está exibindo.
// Quem navega entre meses é o chamador; aqui só a aritmética.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Competencia {
    pub ano: i32,
    pub mes: u32,
}

impl Competencia {
    pub fn new(ano: i32, mes: u32) -> Self {
        debug_assert!((1..=12).contains(&mes));
        Self { ano, mes }
    }

    /// Competência do mês corrente (hora local).
    pub fn atual() -> Self {
        let hoje = Local::now().date_naive();
        Self::new(hoje.year(), hoje.month())
    }

    pub fn anterior(self) -> Self {
        if self.mes == 1 {
            Self::new(self.ano - 1, 12)
        } else {
            Self::new(self.ano, self.mes - 1)
        }
    }

    pub fn proximo(self) -> Self {
        if self.mes == 12 {
            Self::new(self.ano + 1, 1)
        } else {
            Self::new(self.ano, self.mes + 1)
        }
    }

    /// Volta `n` meses. `menos_meses(0)` é a própria competência.
    pub fn menos_meses(self, n: u32) -> Self {
        let mut atual = self;
        for _ in 0..n {
            atual = atual.anterior();
        }
        atual
    }

    pub fn contem(&self, data: NaiveDate) -> bool {
        data.year() == self.ano && data.month() == self.mes
    }

    /// Rótulo por extenso, ex. "Agosto 2026".
    pub fn rotulo(&self) -> String {
        format!("{} {}", nome_do_mes(self.mes), self.ano)
    }

    /// Rótulo curto do fluxo de caixa, ex. "Ago/26".
    pub fn rotulo_curto(&self) -> String {
        let abreviado: String = nome_do_mes(self.mes).chars().take(3).collect();
        format!("{}/{:02}", abreviado, self.ano.rem_euclid(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navegacao_cruza_virada_de_ano() {
        assert_eq!(Competencia::new(2026, 1).anterior(), Competencia::new(2025, 12));
        assert_eq!(Competencia::new(2025, 12).proximo(), Competencia::new(2026, 1));
        assert_eq!(Competencia::new(2026, 3).menos_meses(5), Competencia::new(2025, 10));
    }

    #[test]
    fn rotulos_em_portugues() {
        let ago = Competencia::new(2026, 8);
        assert_eq!(ago.rotulo(), "Agosto 2026");
        assert_eq!(ago.rotulo_curto(), "Ago/26");
        // "Março" tem cedilha; o corte é por caractere, não por byte
        assert_eq!(Competencia::new(2026, 3).rotulo_curto(), "Mar/26");
        assert_eq!(Competencia::new(2105, 4).rotulo_curto(), "Abr/05");
    }

    #[test]
    fn contem_compara_mes_e_ano() {
        let comp = Competencia::new(2026, 8);
        assert!(comp.contem(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()));
        assert!(!comp.contem(NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()));
        assert!(!comp.contem(NaiveDate::from_ymd_opt(2026, 7, 31).unwrap()));
    }
}
