use anyhow::Result;

use lebonheur_db::db::{fetch_draws, fetch_last_draws, fetch_predictions};
use lebonheur_db::models::{validate_draw, Draw, Prediction};
use lebonheur_db::rusqlite::Connection;
use lebonheur_engine::forecast::DrawStore;

/// Tirages d'une catégorie, du plus récent au plus ancien, débarrassés
/// des enregistrements invalides. `limit` borne la fenêtre si fourni.
pub fn fetch_valid_draws(
    conn: &Connection,
    category: &str,
    limit: Option<u32>,
) -> Result<Vec<Draw>> {
    let draws = match limit {
        Some(n) => fetch_last_draws(conn, category, n)?,
        None => fetch_draws(conn, category)?,
    };
    Ok(draws
        .into_iter()
        .filter(|d| validate_draw(d).is_ok())
        .collect())
}

/// Adaptateur SQLite du contrat `DrawStore` du moteur.
pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl DrawStore for SqliteStore<'_> {
    fn list_draws(&self, category: &str) -> Result<Vec<Draw>> {
        fetch_valid_draws(self.conn, category, None)
    }

    fn list_past_predictions(&self, category: &str) -> Result<Vec<Prediction>> {
        fetch_predictions(self.conn, category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lebonheur_db::db::{insert_draw, insert_prediction, migrate};

    fn open_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    fn draw(category: &str, date: &str, winning: [u8; 5]) -> Draw {
        Draw {
            category: category.to_string(),
            date: date.to_string(),
            winning,
            machine: vec![],
        }
    }

    #[test]
    fn test_store_filters_by_category() {
        let conn = open_test_db();
        insert_draw(&conn, &draw("Étoile", "2026-01-05", [1, 2, 3, 4, 5])).unwrap();
        insert_draw(&conn, &draw("Monni", "2026-01-05", [6, 7, 8, 9, 10])).unwrap();

        let store = SqliteStore::new(&conn);
        let draws = store.list_draws("Étoile").unwrap();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].winning, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_invalid_rows_dropped_at_read() {
        let conn = open_test_db();
        insert_draw(&conn, &draw("Étoile", "2026-01-05", [1, 2, 3, 4, 5])).unwrap();
        // Ligne corrompue insérée telle quelle : écartée à la lecture.
        insert_draw(&conn, &draw("Étoile", "2026-01-12", [0, 2, 3, 4, 91])).unwrap();

        let draws = fetch_valid_draws(&conn, "Étoile", None).unwrap();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].date, "2026-01-05");
    }

    #[test]
    fn test_limit_keeps_most_recent() {
        let conn = open_test_db();
        insert_draw(&conn, &draw("Étoile", "2026-01-05", [1, 2, 3, 4, 5])).unwrap();
        insert_draw(&conn, &draw("Étoile", "2026-01-12", [6, 7, 8, 9, 10])).unwrap();
        insert_draw(&conn, &draw("Étoile", "2026-01-19", [11, 12, 13, 14, 15])).unwrap();

        let draws = fetch_valid_draws(&conn, "Étoile", Some(2)).unwrap();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].date, "2026-01-19");
        assert_eq!(draws[1].date, "2026-01-12");
    }

    #[test]
    fn test_predictions_include_unresolved() {
        let conn = open_test_db();
        insert_prediction(&conn, "Étoile", "2026-01-05", &[1, 2, 3, 4, 5]).unwrap();

        let store = SqliteStore::new(&conn);
        let predictions = store.list_past_predictions("Étoile").unwrap();
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].actual, None);
    }
}
