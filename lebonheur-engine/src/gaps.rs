use lebonheur_db::models::Draw;

/// Écart courant d'un numéro : nombre de tirages écoulés depuis sa dernière
/// sortie (numéros gagnants ou machine) dans l'ensemble fourni.
#[derive(Debug, Clone, PartialEq)]
pub struct GapStats {
    pub number: u8,
    pub gap: u32,
    pub last_seen: Option<String>,
}

/// Calcule l'écart de chaque numéro de `[1, pool_size]`. Les tirages sont
/// triés en interne du plus récent au plus ancien (tri stable : à date
/// égale, l'ordre d'insertion départage). Un numéro jamais vu reçoit un
/// écart égal au nombre de tirages et pas de date de dernière sortie.
/// Sans aucun tirage, tous les écarts valent 0 : convention « pas de
/// données », à ne pas lire comme une sortie récente.
pub fn gap_stats(draws: &[Draw], pool_size: u8) -> Vec<GapStats> {
    let size = pool_size as usize;

    let mut ordered: Vec<&Draw> = draws.iter().collect();
    ordered.sort_by(|a, b| b.date.cmp(&a.date));

    let mut gaps = vec![draws.len() as u32; size];
    let mut last_seen: Vec<Option<String>> = vec![None; size];

    for (t, draw) in ordered.iter().enumerate() {
        for &n in draw.winning.iter().chain(draw.machine.iter()) {
            if n < 1 || n > pool_size {
                continue;
            }
            let idx = (n - 1) as usize;
            if last_seen[idx].is_none() {
                gaps[idx] = t as u32;
                last_seen[idx] = Some(draw.date.clone());
            }
        }
    }

    gaps.into_iter()
        .zip(last_seen)
        .enumerate()
        .map(|(i, (gap, last_seen))| GapStats {
            number: (i + 1) as u8,
            gap,
            last_seen,
        })
        .collect()
}
