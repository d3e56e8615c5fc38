use anyhow::{bail, Context, Result};
use std::path::Path;

use lebonheur_db::db::insert_draw;
use lebonheur_db::models::{validate_draw, Draw};
use lebonheur_db::rusqlite::Connection;

/// Convertit une date JJ/MM/AAAA en ISO AAAA-MM-JJ.
fn parse_date(raw: &str) -> Result<String> {
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 {
        bail!("Format de date invalide: '{}'", raw);
    }
    Ok(format!("{}-{}-{}", parts[2], parts[1], parts[0]))
}

/// Une ligne du fichier : `categorie;date;g1;g2;g3;g4;g5[;m1;m2;m3;m4;m5]`.
/// Les colonnes machine sont facultatives et peuvent rester vides.
fn parse_record(record: &csv::StringRecord) -> Result<Draw> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Impossible de parser '{}' (index {})", s, idx))
    };

    let category = get(0)?;
    if category.is_empty() {
        bail!("Catégorie vide");
    }

    let raw_date = get(1)?;
    let date = parse_date(&raw_date)?;

    let winning: [u8; 5] = [
        get_u8(2)?,
        get_u8(3)?,
        get_u8(4)?,
        get_u8(5)?,
        get_u8(6)?,
    ];

    let mut machine = Vec::new();
    for idx in 7..12 {
        if let Some(s) = record.get(idx) {
            let s = s.trim();
            if s.is_empty() {
                continue;
            }
            let n = s
                .parse::<u8>()
                .with_context(|| format!("Impossible de parser '{}' (index {})", s, idx))?;
            machine.push(n);
        }
    }

    let draw = Draw {
        category,
        date,
        winning,
        machine,
    };
    validate_draw(&draw)?;
    Ok(draw)
}

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let tx = conn
        .unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        errors: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        match record_result {
            Ok(record) => match parse_record(&record) {
                Ok(draw) => match insert_draw(&tx, &draw) {
                    Ok(true) => result.inserted += 1,
                    Ok(false) => result.skipped += 1,
                    Err(e) => {
                        eprintln!("Erreur insertion tirage {}: {}", result.total_records, e);
                        result.errors += 1;
                    }
                },
                Err(e) => {
                    eprintln!("Erreur parsing ligne {}: {}", result.total_records, e);
                    result.errors += 1;
                }
            },
            Err(e) => {
                eprintln!("Erreur lecture ligne {}: {}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Échec du commit")?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lebonheur_db::db::{count_draws, migrate};

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("17/02/2026").unwrap(), "2026-02-17");
        assert_eq!(parse_date("01/01/2020").unwrap(), "2020-01-01");
        assert!(parse_date("2026-02-17").is_err());
    }

    #[test]
    fn test_parse_record_with_machine() {
        let record = csv::StringRecord::from(vec![
            "Étoile", "05/01/2026", "3", "17", "42", "68", "90", "5", "12", "33", "47", "81",
        ]);
        let draw = parse_record(&record).unwrap();
        assert_eq!(draw.category, "Étoile");
        assert_eq!(draw.date, "2026-01-05");
        assert_eq!(draw.winning, [3, 17, 42, 68, 90]);
        assert_eq!(draw.machine, vec![5, 12, 33, 47, 81]);
    }

    #[test]
    fn test_parse_record_without_machine() {
        let record =
            csv::StringRecord::from(vec!["Étoile", "05/01/2026", "3", "17", "42", "68", "90"]);
        let draw = parse_record(&record).unwrap();
        assert!(draw.machine.is_empty());
    }

    #[test]
    fn test_parse_record_empty_machine_columns() {
        let record = csv::StringRecord::from(vec![
            "Étoile", "05/01/2026", "3", "17", "42", "68", "90", "", "", "", "", "",
        ]);
        let draw = parse_record(&record).unwrap();
        assert!(draw.machine.is_empty());
    }

    #[test]
    fn test_parse_record_rejects_invalid_draw() {
        let out_of_range = csv::StringRecord::from(vec![
            "Étoile", "05/01/2026", "3", "17", "42", "68", "91",
        ]);
        assert!(parse_record(&out_of_range).is_err());

        let duplicate = csv::StringRecord::from(vec![
            "Étoile", "05/01/2026", "3", "3", "42", "68", "90",
        ]);
        assert!(parse_record(&duplicate).is_err());
    }

    #[test]
    fn test_import_csv_end_to_end() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let path = std::env::temp_dir().join(format!(
            "lebonheur_import_test_{}.csv",
            std::process::id()
        ));
        let contents = "\
categorie;date;g1;g2;g3;g4;g5;m1;m2;m3;m4;m5
Étoile;05/01/2026;3;17;42;68;90;5;12;33;47;81
Étoile;12/01/2026;1;2;3;4;5;;;;;
Étoile;05/01/2026;3;17;42;68;90;5;12;33;47;81
Étoile;19/01/2026;7;7;9;10;11;;;;;
";
        std::fs::write(&path, contents).unwrap();

        let result = import_csv(&conn, &path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(result.total_records, 4);
        assert_eq!(result.inserted, 2, "deux tirages valides distincts");
        assert_eq!(result.skipped, 1, "le doublon du 5 janvier est ignoré");
        assert_eq!(result.errors, 1, "la ligne aux numéros en double échoue");
        assert_eq!(count_draws(&conn).unwrap(), 2);
    }
}
