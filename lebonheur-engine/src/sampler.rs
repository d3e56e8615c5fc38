use anyhow::{bail, Result};
use rand::Rng;

/// Numéros réputés surjoués : petites suites et valeurs calendaires
/// (jours du mois, dates fétiches).
pub const POPULAR_NUMBERS: [u8; 15] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 12, 13, 21, 25, 31];

/// Facteur d'amortissement appliqué au poids des numéros surjoués.
pub const POPULAR_DAMPING: f64 = 0.8;

/// Seuil sous lequel la masse de poids restante est considérée épuisée.
const WEIGHT_EPSILON: f64 = 1e-12;

/// Tire `k` numéros distincts de `[1, probs.len()]` par échantillonnage
/// pondéré sans remise, et les retourne triés.
///
/// Le poids de chaque numéro est sa probabilité, amortie par `damping`
/// pour les numéros de la liste `popular`. Deux replis documentés :
/// moins de `k` candidats à poids strictement positif déclenche un tirage
/// uniforme sur toute la plage ; une masse résiduelle sous epsilon en
/// cours de route complète uniformément dans le reliquat. Hors de ces
/// replis, un numéro à poids nul n'est jamais choisi.
pub fn generate_combination(
    probs: &[f64],
    k: usize,
    popular: &[u8],
    damping: f64,
    rng: &mut impl Rng,
) -> Result<Vec<u8>> {
    let size = probs.len();
    if k > size {
        bail!("impossible de choisir {k} numéros parmi {size} candidats");
    }

    let mut available: Vec<(u8, f64)> = probs
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let number = (i + 1) as u8;
            let weight = if popular.contains(&number) {
                p.max(0.0) * damping
            } else {
                p.max(0.0)
            };
            (number, weight)
        })
        .collect();

    // Pas assez de candidats pondérés : tirage uniforme sans remise sur
    // toute la plage.
    let positive = available.iter().filter(|(_, w)| *w > 0.0).count();
    if positive < k {
        let mut selected: Vec<u8> = Vec::with_capacity(k);
        for _ in 0..k {
            let idx = rng.random_range(0..available.len());
            let (number, _) = available.remove(idx);
            selected.push(number);
        }
        selected.sort();
        return Ok(selected);
    }

    let mut selected: Vec<u8> = Vec::with_capacity(k);
    while selected.len() < k {
        let total: f64 = available.iter().map(|(_, w)| *w).sum();
        if total <= WEIGHT_EPSILON {
            // Masse épuisée avant la fin : on complète uniformément dans
            // le reliquat.
            while selected.len() < k {
                let idx = rng.random_range(0..available.len());
                let (number, _) = available.remove(idx);
                selected.push(number);
            }
            break;
        }

        let threshold = rng.random_range(0.0..total);
        let mut acc = 0.0;
        let mut hit = None;
        let mut last_positive = 0;
        for (idx, &(_, w)) in available.iter().enumerate() {
            if w > 0.0 {
                last_positive = idx;
            }
            acc += w;
            // Comparaison stricte : un poids nul ne franchit jamais le seuil.
            if acc > threshold {
                hit = Some(idx);
                break;
            }
        }
        // L'accumulation flottante peut rester sous le seuil : on retombe
        // alors sur le dernier candidat pondéré.
        let idx = hit.unwrap_or(last_positive);
        let (number, _) = available.remove(idx);
        selected.push(number);
    }

    selected.sort();
    Ok(selected)
}
