pub mod backtest;
pub mod bayes;
pub mod forecast;
pub mod frequency;
pub mod gaps;
pub mod pairs;
pub mod sampler;

use lebonheur_db::models::Draw;

/// Jeu de tirages synthétique pour les tests, du plus récent au plus
/// ancien : dates strictement décroissantes, numéros gagnants cyclés par
/// blocs de 5 sur 1-85. Les numéros 88-90 n'apparaissent jamais.
pub fn make_test_draws(n: usize) -> Vec<Draw> {
    (0..n)
        .map(|i| {
            let base = ((i % 17) * 5) as u8;
            let machine = if i % 3 == 0 {
                Vec::new()
            } else {
                vec![base + 6, base + 7]
            };
            Draw {
                category: "Étoile".to_string(),
                date: format!("2025-{:02}-{:02}", 12 - ((i / 28) % 12), 28 - (i % 28)),
                winning: [base + 1, base + 2, base + 3, base + 4, base + 5],
                machine,
            }
        })
        .collect()
}
