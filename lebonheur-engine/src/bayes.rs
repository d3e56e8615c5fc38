use lebonheur_db::models::Prediction;

/// Ajustement appliqué par pronostic résolu : malus de 0.05 pour un numéro
/// annoncé mais non sorti, bonus de 0.05 pour un numéro sorti mais non
/// annoncé.
pub const FEEDBACK_STEP: f64 = 0.05;

/// Force du lissage de Laplace (pseudo-comptage par numéro).
pub const SMOOTHING_ALPHA: f64 = 1.0;

/// Estime la probabilité de sortie de chaque numéro de `[1, pool_size]` à
/// partir des fréquences observées, corrigées par le retour des pronostics
/// résolus puis lissées.
///
/// L'ajustement multiplie le comptage brut (`freq * (1 + somme des
/// corrections)`, plancher à zéro) : un numéro jamais sorti reste insensible
/// au retour. Le nombre de tirages implicite vaut `max(1, somme / 5)`, ce
/// qui évite la division par zéro sans historique. Les pronostics non
/// résolus sont ignorés. Une table de fréquences trop courte est complétée
/// par des zéros.
pub fn estimate_probabilities(
    freq: &[u32],
    predictions: &[Prediction],
    pool_size: u8,
) -> Vec<f64> {
    let size = pool_size as usize;
    let total: u32 = freq.iter().take(size).sum();
    let implied_draws = (total as f64 / 5.0).max(1.0);
    let denom = implied_draws + size as f64 * SMOOTHING_ALPHA;

    let mut probs = Vec::with_capacity(size);
    for i in 0..size {
        let n = (i + 1) as u8;
        let raw = freq.get(i).copied().unwrap_or(0) as f64;

        let mut adjustment = 0.0;
        for pred in predictions {
            if let Some(actual) = pred.actual {
                let predicted = pred.predicted.contains(&n);
                let drawn = actual.contains(&n);
                if predicted && !drawn {
                    adjustment -= FEEDBACK_STEP;
                } else if drawn && !predicted {
                    adjustment += FEEDBACK_STEP;
                }
            }
        }

        let adjusted = (raw + raw * adjustment).max(0.0);
        let p = (adjusted + SMOOTHING_ALPHA) / denom;
        probs.push(p.max(0.0));
    }
    probs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::frequency_counts;
    use crate::make_test_draws;

    const EPS: f64 = 1e-12;

    fn prediction(predicted: [u8; 5], actual: Option<[u8; 5]>) -> Prediction {
        Prediction {
            id: 1,
            category: "Étoile".to_string(),
            date: "2026-01-12".to_string(),
            predicted,
            actual,
        }
    }

    #[test]
    fn test_uniform_without_history() {
        let probs = estimate_probabilities(&vec![0; 90], &[], 90);
        assert_eq!(probs.len(), 90);
        for &p in &probs {
            assert!((p - 1.0 / 91.0).abs() < EPS, "sans historique : 1/91 partout");
        }
    }

    #[test]
    fn test_exact_value_two_draws() {
        // Tirages [1,2,3,4,5] et [1,2,3,4,6] : total 10, soit 2 tirages
        // implicites et un dénominateur de 92.
        let mut freq = vec![0u32; 90];
        for i in 0..4 {
            freq[i] = 2;
        }
        freq[4] = 1;
        freq[5] = 1;
        let probs = estimate_probabilities(&freq, &[], 90);
        for i in 0..4 {
            assert!((probs[i] - 3.0 / 92.0).abs() < EPS);
        }
        assert!((probs[4] - 2.0 / 92.0).abs() < EPS);
        assert!((probs[5] - 2.0 / 92.0).abs() < EPS);
        assert!((probs[89] - 1.0 / 92.0).abs() < EPS);
    }

    #[test]
    fn test_more_frequent_scores_higher() {
        let mut freq = vec![0u32; 90];
        freq[0] = 10;
        freq[1] = 5;
        let probs = estimate_probabilities(&freq, &[], 90);
        assert!(probs[0] > probs[1], "10 sorties doivent dominer 5 sorties");
        assert!(probs[1] > probs[2]);
    }

    #[test]
    fn test_more_frequent_scores_higher_under_feedback() {
        // Retour fixe : un malus sur le numéro 1. La fréquence qui monte
        // doit quand même relever sa probabilité.
        let preds = vec![prediction([1, 50, 51, 52, 53], Some([60, 61, 62, 63, 64]))];
        let mut freq = vec![0u32; 90];
        freq[0] = 5;
        let low = estimate_probabilities(&freq, &preds, 90);
        freq[0] = 8;
        let high = estimate_probabilities(&freq, &preds, 90);
        assert!(
            high[0] > low[0],
            "à retour constant, plus de sorties = probabilité plus haute"
        );
    }

    #[test]
    fn test_penalty_lowers_probability() {
        let freq = frequency_counts(&make_test_draws(20), 90);
        let baseline = estimate_probabilities(&freq, &[], 90);
        // Le numéro 1 annoncé mais absent du résultat.
        let preds = vec![prediction([1, 20, 30, 40, 50], Some([60, 61, 62, 63, 64]))];
        let adjusted = estimate_probabilities(&freq, &preds, 90);
        assert!(adjusted[0] < baseline[0], "le malus doit abaisser le numéro 1");
    }

    #[test]
    fn test_bonus_raises_probability() {
        let freq = frequency_counts(&make_test_draws(20), 90);
        let baseline = estimate_probabilities(&freq, &[], 90);
        // Le numéro 2 sorti sans avoir été annoncé.
        let preds = vec![prediction([50, 51, 52, 53, 54], Some([2, 60, 61, 62, 63]))];
        let adjusted = estimate_probabilities(&freq, &preds, 90);
        assert!(adjusted[1] > baseline[1], "le bonus doit relever le numéro 2");
    }

    #[test]
    fn test_correct_hit_changes_nothing() {
        let freq = frequency_counts(&make_test_draws(20), 90);
        let baseline = estimate_probabilities(&freq, &[], 90);
        // Le numéro 3 annoncé et sorti : ni bonus ni malus.
        let preds = vec![prediction([3, 50, 51, 52, 53], Some([3, 60, 61, 62, 63]))];
        let adjusted = estimate_probabilities(&freq, &preds, 90);
        assert!((adjusted[2] - baseline[2]).abs() < EPS);
    }

    #[test]
    fn test_unresolved_predictions_ignored() {
        let freq = frequency_counts(&make_test_draws(20), 90);
        let baseline = estimate_probabilities(&freq, &[], 90);
        let preds = vec![prediction([1, 2, 3, 4, 5], None)];
        let adjusted = estimate_probabilities(&freq, &preds, 90);
        assert_eq!(adjusted, baseline, "un pronostic non résolu ne corrige rien");
    }

    #[test]
    fn test_zero_frequency_immune_to_feedback() {
        let freq = vec![0u32; 90];
        // Bonus sur le numéro 7, jamais sorti.
        let preds = vec![prediction([50, 51, 52, 53, 54], Some([7, 60, 61, 62, 63]))];
        let probs = estimate_probabilities(&freq, &preds, 90);
        assert!(
            (probs[6] - probs[8]).abs() < EPS,
            "un comptage nul reste nul quel que soit le retour"
        );
    }

    #[test]
    fn test_heavy_penalties_stay_non_negative() {
        let mut freq = vec![0u32; 90];
        freq[0] = 4;
        // Trente malus : ajustement de -1.5, comptage plancher à zéro.
        let preds: Vec<Prediction> = (0..30)
            .map(|_| prediction([1, 50, 51, 52, 53], Some([60, 61, 62, 63, 64])))
            .collect();
        let probs = estimate_probabilities(&freq, &preds, 90);
        assert!(probs.iter().all(|&p| p >= 0.0));
        assert!(probs[0] > 0.0, "le lissage maintient une probabilité non nulle");
    }

    #[test]
    fn test_short_frequency_table_padded() {
        let freq = vec![3u32; 10];
        let probs = estimate_probabilities(&freq, &[], 90);
        assert_eq!(probs.len(), 90);
        assert!(probs[9] > probs[10], "au-delà de la table : comptage nul");
    }
}
