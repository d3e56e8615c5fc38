use lebonheur_db::models::Draw;

use crate::frequency::frequency_counts;

/// Nombre de numéros sujets restitués par défaut.
pub const TOP_SUBJECTS: usize = 15;

/// Nombre de partenaires conservés par sujet par défaut.
pub const TOP_PARTNERS: usize = 5;

/// Partenaire d'un numéro sujet : combien de fois les deux sont sortis
/// ensemble dans une même grille gagnante.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerStats {
    pub number: u8,
    pub count: u32,
}

/// Numéro sujet avec sa fréquence individuelle et ses partenaires les plus
/// fréquents, classés par nombre de co-occurrences.
#[derive(Debug, Clone, PartialEq)]
pub struct PairStats {
    pub number: u8,
    pub frequency: u32,
    pub partners: Vec<PartnerStats>,
}

/// Compte les co-occurrences par paires non ordonnées au sein des numéros
/// gagnants (10 paires par grille de 5), puis restitue les `subject_count`
/// numéros les plus fréquents avec leurs `partner_count` meilleurs
/// partenaires. Égalités départagées par numéro croissant. Un sujet sans
/// aucun partenaire est omis du résultat.
pub fn pair_stats(
    draws: &[Draw],
    pool_size: u8,
    subject_count: usize,
    partner_count: usize,
) -> Vec<PairStats> {
    let size = pool_size as usize;
    let freq = frequency_counts(draws, pool_size);
    let mut counts = vec![vec![0u32; size]; size];

    for draw in draws {
        let valid: Vec<usize> = draw
            .winning
            .iter()
            .filter(|&&n| n >= 1 && n <= pool_size)
            .map(|&n| (n - 1) as usize)
            .collect();
        for i in 0..valid.len() {
            for j in (i + 1)..valid.len() {
                counts[valid[i]][valid[j]] += 1;
                counts[valid[j]][valid[i]] += 1;
            }
        }
    }

    let mut subjects: Vec<usize> = (0..size).collect();
    subjects.sort_by(|&a, &b| freq[b].cmp(&freq[a]).then(a.cmp(&b)));
    subjects.truncate(subject_count);

    let mut out = Vec::new();
    for idx in subjects {
        let mut partners: Vec<PartnerStats> = counts[idx]
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(|(j, &c)| PartnerStats {
                number: (j + 1) as u8,
                count: c,
            })
            .collect();
        if partners.is_empty() {
            continue;
        }
        partners.sort_by(|a, b| b.count.cmp(&a.count).then(a.number.cmp(&b.number)));
        partners.truncate(partner_count);
        out.push(PairStats {
            number: (idx + 1) as u8,
            frequency: freq[idx],
            partners,
        });
    }
    out
}
