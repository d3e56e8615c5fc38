use anyhow::Result;
use rand::Rng;

use lebonheur_db::models::{Draw, Prediction, POOL_SIZE};

use crate::bayes::estimate_probabilities;
use crate::frequency::frequency_counts;
use crate::sampler::{generate_combination, POPULAR_DAMPING, POPULAR_NUMBERS};

/// Accès aux données historiques d'une catégorie de tirage. Implémenté
/// côté stockage ; le moteur ne touche jamais la base directement.
pub trait DrawStore {
    /// Tous les tirages enregistrés pour la catégorie, dans n'importe
    /// quel ordre.
    fn list_draws(&self, category: &str) -> Result<Vec<Draw>>;

    /// Tous les pronostics passés de la catégorie, résolus ou non.
    fn list_past_predictions(&self, category: &str) -> Result<Vec<Prediction>>;
}

/// Résultat d'une prévision : la carte de probabilités et une grille
/// suggérée. `no_history` signale le chemin dégradé d'une catégorie sans
/// tirage (carte nulle, grille de repli uniforme).
#[derive(Debug, Clone)]
pub struct Forecast {
    pub category: String,
    pub draw_count: usize,
    pub probabilities: Vec<f64>,
    pub combination: Vec<u8>,
    pub no_history: bool,
}

/// Enchaîne l'analyse complète d'une catégorie : fréquences, estimation
/// bayésienne corrigée par les pronostics résolus, puis tirage pondéré
/// d'une grille de `k` numéros.
///
/// Une catégorie sans aucun tirage n'est pas une erreur : le résultat
/// porte une carte de probabilités nulle et une grille de repli uniforme,
/// avec `no_history` levé.
pub fn generate_forecast(
    store: &dyn DrawStore,
    category: &str,
    k: usize,
    rng: &mut impl Rng,
) -> Result<Forecast> {
    let draws = store.list_draws(category)?;
    if draws.is_empty() {
        let probabilities = vec![0.0; POOL_SIZE as usize];
        let combination =
            generate_combination(&probabilities, k, &POPULAR_NUMBERS, POPULAR_DAMPING, rng)?;
        return Ok(Forecast {
            category: category.to_string(),
            draw_count: 0,
            probabilities,
            combination,
            no_history: true,
        });
    }

    let predictions = store.list_past_predictions(category)?;
    let freq = frequency_counts(&draws, POOL_SIZE);
    let probabilities = estimate_probabilities(&freq, &predictions, POOL_SIZE);
    let combination =
        generate_combination(&probabilities, k, &POPULAR_NUMBERS, POPULAR_DAMPING, rng)?;

    Ok(Forecast {
        category: category.to_string(),
        draw_count: draws.len(),
        probabilities,
        combination,
        no_history: false,
    })
}
