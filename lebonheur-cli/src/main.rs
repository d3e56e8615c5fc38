mod display;
mod import;
mod store;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;

use lebonheur_db::db::{
    count_draws_for, db_path, fetch_predictions, insert_draw, insert_prediction, list_categories,
    migrate, open_db, resolve_pending,
};
use lebonheur_db::models::{
    validate_draw, validate_machine, validate_winning, Draw, PICK_COUNT, POOL_SIZE,
};
use lebonheur_db::schedule::is_scheduled;
use lebonheur_engine::backtest::{build_report, save_report, walk_forward_evaluate};
use lebonheur_engine::forecast::generate_forecast;
use lebonheur_engine::frequency::frequency_counts;
use lebonheur_engine::gaps::gap_stats;
use lebonheur_engine::pairs::{pair_stats, TOP_PARTNERS, TOP_SUBJECTS};
use lebonheur_engine::sampler::{generate_combination, POPULAR_DAMPING, POPULAR_NUMBERS};

use crate::display::{
    display_backtest, display_categories, display_draws, display_grids, display_history,
    display_import_summary, display_pairs, display_schedule, display_stats, display_weights,
};
use crate::store::{fetch_valid_draws, SqliteStore};

#[derive(Parser)]
#[command(name = "lebonheur", about = "Analyseur statistique des tirages Loto Bonheur 5/90")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer les tirages depuis un fichier CSV
    Import {
        /// Chemin vers le fichier CSV (categorie;date;g1..g5;m1..m5)
        #[arg(short, long, default_value = "assets/tirages.csv")]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Afficher le programme des tirages et les catégories en base
    Categories,

    /// Lister les derniers tirages d'une catégorie
    List {
        /// Catégorie de tirage
        #[arg(short, long, default_value = "Étoile")]
        category: String,

        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Ajouter un tirage manuellement
    Add,

    /// Afficher les statistiques (fréquences et écarts)
    Stats {
        /// Catégorie de tirage
        #[arg(short, long, default_value = "Étoile")]
        category: String,

        /// Fenêtre d'analyse (nombre de tirages)
        #[arg(short, long, default_value = "100")]
        window: u32,
    },

    /// Afficher les co-occurrences par paires
    Pairs {
        /// Catégorie de tirage
        #[arg(short, long, default_value = "Étoile")]
        category: String,

        /// Fenêtre d'analyse (nombre de tirages)
        #[arg(short, long, default_value = "100")]
        window: u32,
    },

    /// Estimer les probabilités et suggérer des grilles
    Predict {
        /// Catégorie de tirage
        #[arg(short, long, default_value = "Étoile")]
        category: String,

        /// Nombre de grilles à suggérer
        #[arg(short = 'n', long, default_value = "3")]
        count: usize,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,

        /// Enregistrer la première grille comme prédiction
        #[arg(long)]
        save: bool,

        /// Date du tirage visé (AAAA-MM-JJ), date du jour par défaut
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Lister les prédictions passées d'une catégorie
    History {
        /// Catégorie de tirage
        #[arg(short, long, default_value = "Étoile")]
        category: String,
    },

    /// Rapprocher les prédictions en attente des tirages en base
    Resolve,

    /// Évaluer l'estimateur par fenêtres glissantes
    Eval {
        /// Catégorie de tirage
        #[arg(short, long, default_value = "Étoile")]
        category: String,

        /// Fenêtres à évaluer, séparées par des virgules
        #[arg(short, long, default_value = "20,30,50,80,100")]
        windows: String,

        /// Fichier de sortie JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::Categories => cmd_categories(&conn),
        Command::List { category, last } => cmd_list(&conn, &category, last),
        Command::Add => cmd_add(&conn),
        Command::Stats { category, window } => cmd_stats(&conn, &category, window),
        Command::Pairs { category, window } => cmd_pairs(&conn, &category, window),
        Command::Predict {
            category,
            count,
            seed,
            save,
            date,
        } => cmd_predict(&conn, &category, count, seed, save, date.as_deref()),
        Command::History { category } => cmd_history(&conn, &category),
        Command::Resolve => cmd_resolve(&conn),
        Command::Eval {
            category,
            windows,
            output,
        } => cmd_eval(&conn, &category, &windows, output.as_deref()),
    }
}

/// Seed déterministe basé sur la date du jour (YYYYMMDD).
fn date_seed() -> u64 {
    let today = chrono::Local::now().date_naive();
    let y = today.year() as u64;
    let m = today.month() as u64;
    let d = today.day() as u64;
    y * 10_000 + m * 100 + d
}

fn today_iso() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn cmd_import(conn: &lebonheur_db::rusqlite::Connection, file: &PathBuf) -> Result<()> {
    let result = import::import_csv(conn, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_categories(conn: &lebonheur_db::rusqlite::Connection) -> Result<()> {
    display_schedule();
    let categories = list_categories(conn)?;
    display_categories(&categories);
    Ok(())
}

fn cmd_list(conn: &lebonheur_db::rusqlite::Connection, category: &str, last: u32) -> Result<()> {
    let n = count_draws_for(conn, category)?;
    if n == 0 {
        println!("Aucun tirage {} en base. Lancez d'abord : lebonheur import", category);
        return Ok(());
    }
    let draws = fetch_valid_draws(conn, category, Some(last))?;
    display_draws(&draws);
    Ok(())
}

fn cmd_stats(conn: &lebonheur_db::rusqlite::Connection, category: &str, window: u32) -> Result<()> {
    let n = count_draws_for(conn, category)?;
    if n == 0 {
        println!("Aucun tirage {} en base. Lancez d'abord : lebonheur import", category);
        return Ok(());
    }
    let effective_window = window.min(n);
    let draws = fetch_valid_draws(conn, category, Some(effective_window))?;

    let freq = frequency_counts(&draws, POOL_SIZE);
    let gaps = gap_stats(&draws, POOL_SIZE);
    display_stats(&freq, &gaps, category, effective_window);
    Ok(())
}

fn cmd_pairs(conn: &lebonheur_db::rusqlite::Connection, category: &str, window: u32) -> Result<()> {
    let n = count_draws_for(conn, category)?;
    if n == 0 {
        println!("Aucun tirage {} en base. Lancez d'abord : lebonheur import", category);
        return Ok(());
    }
    let effective_window = window.min(n);
    let draws = fetch_valid_draws(conn, category, Some(effective_window))?;

    let stats = pair_stats(&draws, POOL_SIZE, TOP_SUBJECTS, TOP_PARTNERS);
    display_pairs(&stats, category, effective_window);
    Ok(())
}

fn cmd_predict(
    conn: &lebonheur_db::rusqlite::Connection,
    category: &str,
    count: usize,
    seed: Option<u64>,
    save: bool,
    date: Option<&str>,
) -> Result<()> {
    let effective_seed = seed.unwrap_or_else(|| {
        let ds = date_seed();
        println!("(Seed du jour : {ds})");
        ds
    });
    let mut rng = StdRng::seed_from_u64(effective_seed);

    let store = SqliteStore::new(conn);
    let forecast = generate_forecast(&store, category, PICK_COUNT, &mut rng)?;

    if forecast.no_history {
        println!(
            "Aucun tirage {} en base : grilles de repli uniformes.",
            category
        );
    } else {
        println!("{} tirages {} analysés.", forecast.draw_count, category);
        display_weights(&forecast.probabilities, category);
    }

    let mut grids = vec![forecast.combination.clone()];
    while grids.len() < count {
        let grid = generate_combination(
            &forecast.probabilities,
            PICK_COUNT,
            &POPULAR_NUMBERS,
            POPULAR_DAMPING,
            &mut rng,
        )?;
        grids.push(grid);
    }
    display_grids(&grids, &forecast.probabilities);

    if save {
        let target_date = match date {
            Some(d) => d.to_string(),
            None => today_iso(),
        };
        let mut predicted = [0u8; 5];
        for (i, &n) in grids[0].iter().take(PICK_COUNT).enumerate() {
            predicted[i] = n;
        }
        let id = insert_prediction(conn, category, &target_date, &predicted)?;
        println!(
            "\nPrédiction n°{} enregistrée pour le tirage {} du {}.",
            id, category, target_date
        );
    }

    Ok(())
}

fn cmd_history(conn: &lebonheur_db::rusqlite::Connection, category: &str) -> Result<()> {
    let predictions = fetch_predictions(conn, category)?;
    display_history(&predictions);
    Ok(())
}

fn cmd_resolve(conn: &lebonheur_db::rusqlite::Connection) -> Result<()> {
    let resolved = resolve_pending(conn)?;
    if resolved == 0 {
        println!("Aucune prédiction à rapprocher.");
    } else {
        println!("{} prédiction(s) rapprochée(s) des tirages en base.", resolved);
    }
    Ok(())
}

fn cmd_eval(
    conn: &lebonheur_db::rusqlite::Connection,
    category: &str,
    windows: &str,
    output: Option<&Path>,
) -> Result<()> {
    let windows = parse_windows(windows)?;
    let draws = fetch_valid_draws(conn, category, None)?;
    if draws.is_empty() {
        println!("Aucun tirage {} en base. Lancez d'abord : lebonheur import", category);
        return Ok(());
    }

    let pb = ProgressBar::new(windows.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=> "),
    );

    let mut results = Vec::new();
    for &window in &windows {
        pb.set_message(format!("fenêtre {}", window));
        results.push(walk_forward_evaluate(&draws, window));
        pb.inc(1);
    }
    pb.finish_with_message("Évaluation terminée");

    let report = build_report(category, draws.len(), results);
    display_backtest(&report);

    if let Some(path) = output {
        save_report(&report, path)?;
        println!("\nRapport sauvegardé dans : {}", path.display());
    }

    Ok(())
}

fn parse_windows(raw: &str) -> Result<Vec<usize>> {
    let mut windows = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let w: usize = part
            .parse()
            .with_context(|| format!("Fenêtre invalide : '{}'", part))?;
        windows.push(w);
    }
    if windows.is_empty() {
        bail!("Aucune fenêtre valide dans '{}'", raw);
    }
    Ok(windows)
}

fn cmd_add(conn: &lebonheur_db::rusqlite::Connection) -> Result<()> {
    println!("Ajout d'un tirage manuellement\n");

    let category = prompt("Catégorie (ex: Étoile) : ")?;
    if category.is_empty() {
        bail!("Catégorie vide");
    }
    if !is_scheduled(&category) {
        println!("(Catégorie hors programme : acceptée comme nouvelle catégorie)");
    }

    let raw_date = prompt("Date (JJ/MM/AAAA) : ")?;
    let date_parts: Vec<&str> = raw_date.split('/').collect();
    if date_parts.len() != 3 {
        bail!("Format de date invalide");
    }
    let date = format!("{}-{}-{}", date_parts[2], date_parts[1], date_parts[0]);

    let winning = prompt_winning()?;
    let machine = prompt_machine()?;

    let draw = Draw {
        category,
        date,
        winning,
        machine,
    };
    validate_draw(&draw)?;

    println!("\nTirage à insérer :");
    display_draws(&[draw.clone()]);

    let confirm = prompt("\nConfirmer l'insertion ? (o/n) : ")?;
    if confirm.trim().to_lowercase() == "o" {
        let inserted = insert_draw(conn, &draw)?;
        if inserted {
            println!("Tirage inséré avec succès.");
        } else {
            println!("Ce tirage existe déjà (doublon ignoré).");
        }
    } else {
        println!("Insertion annulée.");
    }

    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    Ok(input.trim().to_string())
}

fn prompt_winning() -> Result<[u8; 5]> {
    loop {
        let input = prompt("5 numéros gagnants (séparés par des espaces, 1-90) : ")?;
        let nums: Result<Vec<u8>, _> = input.split_whitespace().map(|s| s.parse::<u8>()).collect();
        match nums {
            Ok(v) if v.len() == 5 => {
                let arr = [v[0], v[1], v[2], v[3], v[4]];
                if validate_winning(&arr).is_ok() {
                    return Ok(arr);
                }
                println!("Numéros invalides (1-90, pas de doublons). Réessayez.");
            }
            _ => println!("Entrez exactement 5 numéros. Réessayez."),
        }
    }
}

fn prompt_machine() -> Result<Vec<u8>> {
    loop {
        let input = prompt("Numéros machine (facultatif, vide pour aucun) : ")?;
        if input.is_empty() {
            return Ok(Vec::new());
        }
        let nums: Result<Vec<u8>, _> = input.split_whitespace().map(|s| s.parse::<u8>()).collect();
        match nums {
            Ok(v) => {
                if validate_machine(&v).is_ok() {
                    return Ok(v);
                }
                println!("Numéros machine invalides (au plus 5, 1-90, pas de doublons). Réessayez.");
            }
            _ => println!("Numéros illisibles. Réessayez."),
        }
    }
}
