use serde::{Deserialize, Serialize};

use lebonheur_db::models::{Draw, PICK_COUNT, POOL_SIZE};

use crate::bayes::estimate_probabilities;
use crate::frequency::frequency_counts;

/// Minimum de tirages d'entraînement pour retenir un point de test.
const MIN_TRAIN: usize = 3;

/// Nombre maximal de points de test par fenêtre.
const MAX_TESTS: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowResult {
    pub window: usize,
    pub log_likelihood: f64,
    pub n_tests: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub category: String,
    pub draw_count: usize,
    pub uniform_ll: f64,
    pub results: Vec<WindowResult>,
    pub best_window: usize,
    pub best_ll: f64,
}

/// Évaluation glissante : pour chaque tirage test t, l'estimateur est
/// entraîné sur draws[t+1 .. t+1+window] puis noté sur la
/// log-vraisemblance du tirage t sous la carte normalisée.
/// CRITIQUE : pas de fuite du futur, l'entraînement est strictement
/// postérieur au tirage test.
///
/// draws[0] = le plus récent, draws[N-1] = le plus ancien.
pub fn walk_forward_evaluate(draws: &[Draw], window: usize) -> WindowResult {
    let max_t = draws.len().saturating_sub(window + 1);
    if max_t == 0 {
        return WindowResult {
            window,
            log_likelihood: f64::NEG_INFINITY,
            n_tests: 0,
        };
    }

    // Au plus MAX_TESTS points de test, avec un pas pour les gros
    // historiques.
    let stride = (max_t / MAX_TESTS).max(1);

    let mut total_ll = 0.0f64;
    let mut n_tests = 0usize;

    for t in (0..max_t).step_by(stride) {
        let train_end = (t + 1 + window).min(draws.len());
        let train = &draws[t + 1..train_end];
        if train.len() < MIN_TRAIN {
            continue;
        }

        let freq = frequency_counts(train, POOL_SIZE);
        let probs = estimate_probabilities(&freq, &[], POOL_SIZE);
        let dist = normalize(&probs);

        let mut draw_ll = 0.0f64;
        for &n in &draws[t].winning {
            if n < 1 || n > POOL_SIZE {
                continue;
            }
            let p = dist[(n - 1) as usize].max(1e-15); // éviter log(0)
            draw_ll += p.ln();
        }

        total_ll += draw_ll;
        n_tests += 1;
    }

    let log_likelihood = if n_tests > 0 {
        total_ll / n_tests as f64
    } else {
        f64::NEG_INFINITY
    };

    WindowResult {
        window,
        log_likelihood,
        n_tests,
    }
}

/// Log-vraisemblance d'une grille sous la distribution uniforme,
/// point de comparaison de toutes les fenêtres.
pub fn uniform_log_likelihood() -> f64 {
    let p = 1.0 / POOL_SIZE as f64;
    PICK_COUNT as f64 * p.ln()
}

/// Assemble le rapport final à partir des résultats par fenêtre.
pub fn build_report(
    category: &str,
    draw_count: usize,
    results: Vec<WindowResult>,
) -> BacktestReport {
    let mut best_ll = f64::NEG_INFINITY;
    let mut best_window = results.first().map(|r| r.window).unwrap_or(0);

    for r in &results {
        if r.log_likelihood > best_ll {
            best_ll = r.log_likelihood;
            best_window = r.window;
        }
    }

    BacktestReport {
        category: category.to_string(),
        draw_count,
        uniform_ll: uniform_log_likelihood(),
        results,
        best_window,
        best_ll,
    }
}

pub fn save_report(report: &BacktestReport, path: &std::path::Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_report(path: &std::path::Path) -> anyhow::Result<BacktestReport> {
    let json = std::fs::read_to_string(path)?;
    let report: BacktestReport = serde_json::from_str(&json)?;
    Ok(report)
}

/// Normalise la carte de poids en distribution de probabilités.
fn normalize(weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        weights.iter().map(|w| w / total).collect()
    } else {
        vec![1.0 / weights.len() as f64; weights.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::make_test_draws;

    fn repeated_draws(n: usize) -> Vec<Draw> {
        (0..n)
            .map(|i| Draw {
                category: "Étoile".to_string(),
                date: format!("2026-01-{:02}", 30 - (i % 30)),
                winning: [1, 2, 3, 4, 5],
                machine: vec![],
            })
            .collect()
    }

    #[test]
    fn test_walk_forward_returns_finite() {
        let result = walk_forward_evaluate(&make_test_draws(50), 20);
        assert!(
            result.log_likelihood.is_finite(),
            "LL attendue finie, reçu {}",
            result.log_likelihood
        );
        assert!(result.n_tests > 0);
    }

    #[test]
    fn test_walk_forward_large_window() {
        // 50 tirages, fenêtre 45 : max_t = 4, tous exploitables.
        let result = walk_forward_evaluate(&make_test_draws(50), 45);
        assert!(result.log_likelihood.is_finite());
        assert_eq!(result.n_tests, 4);
    }

    #[test]
    fn test_walk_forward_too_few_draws() {
        let result = walk_forward_evaluate(&make_test_draws(5), 10);
        assert_eq!(result.log_likelihood, f64::NEG_INFINITY);
        assert_eq!(result.n_tests, 0);
    }

    #[test]
    fn test_window_below_min_train_skipped() {
        // Fenêtre de 2 : jamais assez de tirages d'entraînement.
        let result = walk_forward_evaluate(&make_test_draws(6), 2);
        assert_eq!(result.n_tests, 0);
        assert_eq!(result.log_likelihood, f64::NEG_INFINITY);
    }

    #[test]
    fn test_uniform_ll_value() {
        let ll = uniform_log_likelihood();
        // 5 * ln(1/90) ≈ -22.5
        assert!((ll - 5.0 * (1.0f64 / 90.0).ln()).abs() < 1e-12);
        assert!(ll < 0.0);
        assert!(ll > -30.0);
    }

    #[test]
    fn test_repetitive_history_beats_uniform() {
        // Les mêmes cinq numéros à chaque tirage : l'estimateur fréquentiel
        // doit largement battre la base uniforme.
        let result = walk_forward_evaluate(&repeated_draws(30), 10);
        assert!(
            result.log_likelihood > uniform_log_likelihood(),
            "LL {} devrait dépasser la base uniforme {}",
            result.log_likelihood,
            uniform_log_likelihood()
        );
    }

    #[test]
    fn test_build_report_picks_best_window() {
        let results = vec![
            WindowResult {
                window: 10,
                log_likelihood: -20.0,
                n_tests: 12,
            },
            WindowResult {
                window: 20,
                log_likelihood: -15.0,
                n_tests: 8,
            },
            WindowResult {
                window: 30,
                log_likelihood: -18.0,
                n_tests: 4,
            },
        ];
        let report = build_report("Étoile", 50, results);
        assert_eq!(report.best_window, 20);
        assert_eq!(report.best_ll, -15.0);
        assert_eq!(report.results.len(), 3);
        assert_eq!(report.draw_count, 50);
    }

    #[test]
    fn test_report_json_roundtrip() {
        let report = build_report(
            "Étoile",
            40,
            vec![WindowResult {
                window: 20,
                log_likelihood: -19.5,
                n_tests: 10,
            }],
        );
        let json = serde_json::to_string(&report).unwrap();
        let loaded: BacktestReport = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.category, "Étoile");
        assert_eq!(loaded.best_window, 20);
        assert_eq!(loaded.results[0].n_tests, 10);
    }

    #[test]
    fn test_normalize_sums_to_one() {
        let dist = normalize(&[1.0, 2.0, 3.0, 4.0]);
        let sum: f64 = dist.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!((dist[3] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_all_zero_uniform() {
        let dist = normalize(&[0.0; 10]);
        assert!(dist.iter().all(|&p| (p - 0.1).abs() < 1e-12));
    }
}
