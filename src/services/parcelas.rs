// src/services/parcelas.rs

use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

/// Uma parcela calculada, pronta para virar receita.
#[derive(Debug, Clone, PartialEq)]
pub struct Parcela {
    pub numero: u32, // 1-based
    pub valor: Decimal,
    pub data_prevista: NaiveDate,
}

/// Divide `total` em `quantidade` parcelas mensais a partir de `inicio`.
///
/// As primeiras N-1 parcelas valem `total/N` arredondado a 2 casas (metade
/// para cima); a última leva a diferença, então a soma sempre fecha com o
/// total. Datas avançam mês a mês no calendário (31/01 vira 28/02 ou 29/02).
pub fn gerar_parcelas(total: Decimal, quantidade: u32, inicio: NaiveDate) -> Vec<Parcela> {
    let quantidade = quantidade.max(1);
    let valor_parcela = (total / Decimal::from(quantidade))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    (0..quantidade)
        .map(|i| {
            let ultima = i == quantidade - 1;
            let valor = if ultima {
                (total - valor_parcela * Decimal::from(quantidade - 1))
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            } else {
                valor_parcela
            };
            Parcela {
                numero: i + 1,
                valor,
                data_prevista: inicio + Months::new(i),
            }
        })
        .collect()
}

/// Rótulo da parcela: "Parcela 2/4", ou "Pintura - Parcela 2/4" quando a
/// receita tem descrição própria.
pub fn rotulo_parcela(descricao: Option<&str>, numero: u32, total: u32) -> String {
    match descricao {
        Some(base) => format!("{base} - Parcela {numero}/{total}"),
        None => format!("Parcela {numero}/{total}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(texto: &str) -> Decimal {
        texto.parse().unwrap()
    }

    fn dia(ano: i32, mes: u32, dia: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(ano, mes, dia).unwrap()
    }

    #[test]
    fn cem_em_tres_fecha_a_conta() {
        let parcelas = gerar_parcelas(dec("100.00"), 3, dia(2026, 1, 10));

        let valores: Vec<Decimal> = parcelas.iter().map(|p| p.valor).collect();
        assert_eq!(valores, vec![dec("33.33"), dec("33.33"), dec("33.34")]);

        let soma: Decimal = valores.iter().sum();
        assert_eq!(soma, dec("100.00"));
    }

    #[test]
    fn nove_mil_em_quatro_meses() {
        let parcelas = gerar_parcelas(dec("9000"), 4, dia(2024, 1, 15));

        assert_eq!(parcelas.len(), 4);
        for parcela in &parcelas {
            assert_eq!(parcela.valor, dec("2250.00"));
        }
        let datas: Vec<NaiveDate> = parcelas.iter().map(|p| p.data_prevista).collect();
        assert_eq!(
            datas,
            vec![
                dia(2024, 1, 15),
                dia(2024, 2, 15),
                dia(2024, 3, 15),
                dia(2024, 4, 15)
            ]
        );
    }

    #[test]
    fn resto_sempre_na_ultima() {
        let parcelas = gerar_parcelas(dec("1000.01"), 3, dia(2026, 5, 1));

        assert_eq!(parcelas[0].valor, dec("333.34"));
        assert_eq!(parcelas[1].valor, dec("333.34"));
        assert_eq!(parcelas[2].valor, dec("333.33"));

        let soma: Decimal = parcelas.iter().map(|p| p.valor).sum();
        assert_eq!(soma, dec("1000.01"));
    }

    #[test]
    fn parcela_unica_e_o_total() {
        let parcelas = gerar_parcelas(dec("500.00"), 1, dia(2026, 3, 1));
        assert_eq!(parcelas.len(), 1);
        assert_eq!(parcelas[0].numero, 1);
        assert_eq!(parcelas[0].valor, dec("500.00"));
    }

    #[test]
    fn quantidade_zero_vira_uma_parcela() {
        let parcelas = gerar_parcelas(dec("500.00"), 0, dia(2026, 3, 1));
        assert_eq!(parcelas.len(), 1);
    }

    #[test]
    fn fim_de_mes_encolhe_quando_preciso() {
        let parcelas = gerar_parcelas(dec("300.00"), 3, dia(2024, 1, 31));

        let datas: Vec<NaiveDate> = parcelas.iter().map(|p| p.data_prevista).collect();
        // 2024 é bissexto
        assert_eq!(datas, vec![dia(2024, 1, 31), dia(2024, 2, 29), dia(2024, 3, 31)]);
    }

    #[test]
    fn rotulos_com_e_sem_descricao() {
        assert_eq!(rotulo_parcela(None, 1, 4), "Parcela 1/4");
        assert_eq!(
            rotulo_parcela(Some("Pintura externa"), 2, 4),
            "Pintura externa - Parcela 2/4"
        );
    }
}
