use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::import::ImportResult;
use lebonheur_db::models::{Draw, Prediction};
use lebonheur_db::schedule::SCHEDULE;
use lebonheur_engine::backtest::BacktestReport;
use lebonheur_engine::gaps::GapStats;
use lebonheur_engine::pairs::PairStats;

/// Écart relatif à la moyenne au-delà duquel un numéro est marqué HOT ou
/// COLD. Étiquette d'affichage, sans effet sur le tirage des grilles.
const TAG_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightTag {
    Hot,
    Cold,
    Normal,
}

impl std::fmt::Display for WeightTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeightTag::Hot => write!(f, "HOT"),
            WeightTag::Cold => write!(f, "COLD"),
            WeightTag::Normal => write!(f, "-"),
        }
    }
}

pub fn tag_weight(weight: f64, mean: f64) -> WeightTag {
    if mean <= 0.0 {
        return WeightTag::Normal;
    }
    let deviation = (weight - mean) / mean;
    if deviation > TAG_THRESHOLD {
        WeightTag::Hot
    } else if deviation < -TAG_THRESHOLD {
        WeightTag::Cold
    } else {
        WeightTag::Normal
    }
}

/// Score d'une grille : produit des poids rapportés au poids moyen.
/// 1.0 = grille neutre, au-dessus = numéros favorisés par l'estimation.
fn grid_score(grid: &[u8], probs: &[f64]) -> f64 {
    let mean = probs.iter().sum::<f64>() / probs.len().max(1) as f64;
    if mean <= 0.0 {
        return 0.0;
    }
    grid.iter()
        .filter_map(|&n| usize::from(n).checked_sub(1))
        .filter_map(|idx| probs.get(idx))
        .map(|&w| w / mean)
        .product()
}

fn format_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Date", "Catégorie", "Gagnants", "Machine"]);

    for draw in draws {
        let mut winning = draw.winning;
        winning.sort();
        let mut machine = draw.machine.clone();
        machine.sort();

        let machine_str = if machine.is_empty() {
            "—".to_string()
        } else {
            format_numbers(&machine)
        };

        table.add_row(vec![
            draw.date.clone(),
            draw.category.clone(),
            format_numbers(&winning),
            machine_str,
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

pub fn display_schedule() {
    println!("\n📅 Programme des tirages\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Jour", "Heure", "Tirage"]);

    for slot in SCHEDULE {
        table.add_row(vec![slot.day, slot.time, slot.name]);
    }

    println!("{table}");
}

pub fn display_categories(categories: &[(String, u32)]) {
    if categories.is_empty() {
        println!("Base vide. Lancez d'abord : lebonheur import");
        return;
    }

    println!("\nCatégories en base :\n");
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Catégorie", "Tirages"]);

    for (name, count) in categories {
        table.add_row(vec![name.clone(), count.to_string()]);
    }

    println!("{table}");
}

pub fn display_stats(freq: &[u32], gaps: &[GapStats], category: &str, window: u32) {
    println!(
        "\n📊 Statistiques {} sur les {} derniers tirages\n",
        category, window
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Numéro", "Fréquence", "Écart", "Dernière sortie"]);

    let mut rows: Vec<(u8, u32, u32, Option<&str>)> = gaps
        .iter()
        .map(|g| {
            let f = freq.get((g.number - 1) as usize).copied().unwrap_or(0);
            (g.number, f, g.gap, g.last_seen.as_deref())
        })
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));

    for (number, frequency, gap, last_seen) in &rows {
        table.add_row(vec![
            format!("{:2}", number),
            frequency.to_string(),
            gap.to_string(),
            last_seen.unwrap_or("jamais").to_string(),
        ]);
    }

    println!("{table}");
}

pub fn display_pairs(stats: &[PairStats], category: &str, window: u32) {
    println!(
        "\n🔗 Co-occurrences {} sur les {} derniers tirages\n",
        category, window
    );

    if stats.is_empty() {
        println!("Aucune paire observée.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Numéro", "Fréquence", "Partenaires (co-sorties)"]);

    for s in stats {
        let partners = s
            .partners
            .iter()
            .map(|p| format!("{} (×{})", p.number, p.count))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            format!("{:2}", s.number),
            s.frequency.to_string(),
            partners,
        ]);
    }

    println!("{table}");
}

pub fn display_weights(probs: &[f64], category: &str) {
    println!("\n🎯 Poids par numéro {} (top 15)\n", category);

    let mean = probs.iter().sum::<f64>() / probs.len().max(1) as f64;

    let mut indices: Vec<usize> = (0..probs.len()).collect();
    indices.sort_by(|&a, &b| {
        probs[b]
            .partial_cmp(&probs[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Numéro", "Poids", "Tag"]);

    for &idx in indices.iter().take(15) {
        let tag = tag_weight(probs[idx], mean);
        let color = match tag {
            WeightTag::Hot => Color::Green,
            WeightTag::Cold => Color::Red,
            WeightTag::Normal => Color::White,
        };
        table.add_row(vec![
            Cell::new(format!("{:2}", idx + 1)),
            Cell::new(format!("{:.4}", probs[idx])),
            Cell::new(tag.to_string()).fg(color),
        ]);
    }

    println!("{table}");
}

/// Affiche les grilles suggérées. La première est la grille principale de
/// la prévision, mise en avant en vert.
pub fn display_grids(grids: &[Vec<u8>], probs: &[f64]) {
    println!("\n🎲 Grilles suggérées\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Numéros", "Score"]);

    for (i, grid) in grids.iter().enumerate() {
        let score = grid_score(grid, probs);
        let cells = vec![
            Cell::new(format!("{}", i + 1)),
            Cell::new(format_numbers(grid)),
            Cell::new(format!("{:.4}", score)),
        ];
        if i == 0 {
            table.add_row(cells.into_iter().map(|c| c.fg(Color::Green)).collect::<Vec<_>>());
        } else {
            table.add_row(cells);
        }
    }

    println!("{table}");
}

pub fn display_history(predictions: &[Prediction]) {
    if predictions.is_empty() {
        println!("Aucune prédiction enregistrée.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Date", "Catégorie", "Grille", "Résultat", "Réussites"]);

    for p in predictions {
        let mut predicted = p.predicted;
        predicted.sort();

        let (result, hits_cell) = match p.actual {
            Some(actual) => {
                let mut actual = actual;
                actual.sort();
                let hits = p.hits().unwrap_or(0);
                let color = if hits >= 2 { Color::Green } else { Color::White };
                (
                    format_numbers(&actual),
                    Cell::new(format!("{}/5", hits)).fg(color),
                )
            }
            None => (
                "—".to_string(),
                Cell::new("en attente").fg(Color::Yellow),
            ),
        };

        table.add_row(vec![
            Cell::new(p.date.clone()),
            Cell::new(p.category.clone()),
            Cell::new(format_numbers(&predicted)),
            Cell::new(result),
            hits_cell,
        ]);
    }

    println!("{table}");
}

pub fn display_backtest(report: &BacktestReport) {
    println!(
        "\n== Évaluation glissante {} ({} tirages) ==\n",
        report.category, report.draw_count
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Fenêtre", "LL moyenne", "Points", "vs uniforme"]);

    for r in &report.results {
        let (ll, delta) = if r.log_likelihood.is_finite() {
            let d = r.log_likelihood - report.uniform_ll;
            let color = if d > 0.0 { Color::Green } else { Color::Red };
            (
                Cell::new(format!("{:.3}", r.log_likelihood)),
                Cell::new(format!("{:+.3}", d)).fg(color),
            )
        } else {
            (Cell::new("—"), Cell::new("—"))
        };
        table.add_row(vec![
            Cell::new(r.window.to_string()),
            ll,
            Cell::new(r.n_tests.to_string()),
            delta,
        ]);
    }

    println!("{table}");
    println!("Base uniforme : {:.3}", report.uniform_ll);
    if report.best_ll.is_finite() {
        println!(
            "Meilleure fenêtre : {} (LL {:.3})",
            report.best_window, report.best_ll
        );
    } else {
        println!("Pas assez d'historique pour évaluer ces fenêtres.");
    }
}
