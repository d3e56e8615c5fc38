use lebonheur_db::models::Draw;

/// Comptage brut des sorties de chaque numéro parmi les numéros gagnants.
/// Retourne un vecteur dense de taille `pool_size`, indexé par `numéro - 1` ;
/// un numéro jamais sorti garde un comptage de zéro. Les numéros machine ne
/// participent pas à cette statistique, et les numéros hors plage sont
/// ignorés, pas rejetés.
pub fn frequency_counts(draws: &[Draw], pool_size: u8) -> Vec<u32> {
    let mut counts = vec![0u32; pool_size as usize];

    for draw in draws {
        for &n in &draw.winning {
            if n < 1 || n > pool_size {
                continue;
            }
            counts[(n - 1) as usize] += 1;
        }
    }

    counts
}
