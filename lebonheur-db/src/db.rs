use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use crate::models::{Draw, Prediction};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    category  TEXT NOT NULL,
    date      TEXT NOT NULL,
    win_1     INTEGER NOT NULL,
    win_2     INTEGER NOT NULL,
    win_3     INTEGER NOT NULL,
    win_4     INTEGER NOT NULL,
    win_5     INTEGER NOT NULL,
    mac_1     INTEGER,
    mac_2     INTEGER,
    mac_3     INTEGER,
    mac_4     INTEGER,
    mac_5     INTEGER,
    PRIMARY KEY (category, date)
);

CREATE TABLE IF NOT EXISTS predictions (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    category  TEXT NOT NULL,
    date      TEXT NOT NULL,
    pred_1    INTEGER NOT NULL,
    pred_2    INTEGER NOT NULL,
    pred_3    INTEGER NOT NULL,
    pred_4    INTEGER NOT NULL,
    pred_5    INTEGER NOT NULL,
    act_1     INTEGER,
    act_2     INTEGER,
    act_3     INTEGER,
    act_4     INTEGER,
    act_5     INTEGER
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("lebonheur.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

pub fn insert_draw(conn: &Connection, draw: &Draw) -> Result<bool> {
    let mac = |i: usize| draw.machine.get(i).copied();
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (category, date, win_1, win_2, win_3, win_4, win_5, mac_1, mac_2, mac_3, mac_4, mac_5)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        rusqlite::params![
            draw.category,
            draw.date,
            draw.winning[0],
            draw.winning[1],
            draw.winning[2],
            draw.winning[3],
            draw.winning[4],
            mac(0),
            mac(1),
            mac(2),
            mac(3),
            mac(4),
        ],
    ).context("Échec de l'insertion du tirage")?;
    Ok(changed > 0)
}

fn draw_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Draw> {
    let mut machine = Vec::new();
    for idx in 7..12 {
        if let Some(n) = row.get::<_, Option<u8>>(idx)? {
            machine.push(n);
        }
    }
    Ok(Draw {
        category: row.get(0)?,
        date: row.get(1)?,
        winning: [
            row.get::<_, u8>(2)?,
            row.get::<_, u8>(3)?,
            row.get::<_, u8>(4)?,
            row.get::<_, u8>(5)?,
            row.get::<_, u8>(6)?,
        ],
        machine,
    })
}

/// Tous les tirages d'une catégorie, du plus récent au plus ancien.
pub fn fetch_draws(conn: &Connection, category: &str) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(
        "SELECT category, date, win_1, win_2, win_3, win_4, win_5, mac_1, mac_2, mac_3, mac_4, mac_5
         FROM draws WHERE category = ?1 ORDER BY date DESC"
    )?;
    let draws = stmt
        .query_map([category], |row| draw_from_row(row))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn fetch_last_draws(conn: &Connection, category: &str, limit: u32) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(
        "SELECT category, date, win_1, win_2, win_3, win_4, win_5, mac_1, mac_2, mac_3, mac_4, mac_5
         FROM draws WHERE category = ?1 ORDER BY date DESC LIMIT ?2"
    )?;
    let draws = stmt
        .query_map(rusqlite::params![category, limit], |row| draw_from_row(row))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}

pub fn count_draws_for(conn: &Connection, category: &str) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM draws WHERE category = ?1",
        [category],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Catégories présentes en base avec leur nombre de tirages.
pub fn list_categories(conn: &Connection) -> Result<Vec<(String, u32)>> {
    let mut stmt = conn.prepare(
        "SELECT category, COUNT(*) FROM draws GROUP BY category ORDER BY category",
    )?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn insert_prediction(
    conn: &Connection,
    category: &str,
    date: &str,
    predicted: &[u8; 5],
) -> Result<i64> {
    conn.execute(
        "INSERT INTO predictions (category, date, pred_1, pred_2, pred_3, pred_4, pred_5)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            category,
            date,
            predicted[0],
            predicted[1],
            predicted[2],
            predicted[3],
            predicted[4],
        ],
    )
    .context("Échec de l'enregistrement de la prédiction")?;
    Ok(conn.last_insert_rowid())
}

fn prediction_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Prediction> {
    let actual = match (
        row.get::<_, Option<u8>>(8)?,
        row.get::<_, Option<u8>>(9)?,
        row.get::<_, Option<u8>>(10)?,
        row.get::<_, Option<u8>>(11)?,
        row.get::<_, Option<u8>>(12)?,
    ) {
        (Some(a), Some(b), Some(c), Some(d), Some(e)) => Some([a, b, c, d, e]),
        _ => None,
    };
    Ok(Prediction {
        id: row.get(0)?,
        category: row.get(1)?,
        date: row.get(2)?,
        predicted: [
            row.get::<_, u8>(3)?,
            row.get::<_, u8>(4)?,
            row.get::<_, u8>(5)?,
            row.get::<_, u8>(6)?,
            row.get::<_, u8>(7)?,
        ],
        actual,
    })
}

/// Toutes les prédictions d'une catégorie, résolues ou non, les plus
/// récentes d'abord.
pub fn fetch_predictions(conn: &Connection, category: &str) -> Result<Vec<Prediction>> {
    let mut stmt = conn.prepare(
        "SELECT id, category, date, pred_1, pred_2, pred_3, pred_4, pred_5,
                act_1, act_2, act_3, act_4, act_5
         FROM predictions WHERE category = ?1 ORDER BY date DESC, id DESC",
    )?;
    let predictions = stmt
        .query_map([category], |row| prediction_from_row(row))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(predictions)
}

/// Rapproche les prédictions en attente des tirages désormais en base :
/// pour chaque prédiction sans résultat dont le tirage (catégorie, date)
/// existe, recopie les numéros gagnants. Retourne le nombre de
/// prédictions résolues.
pub fn resolve_pending(conn: &Connection) -> Result<u32> {
    let mut stmt = conn.prepare(
        "SELECT p.id, d.win_1, d.win_2, d.win_3, d.win_4, d.win_5
         FROM predictions p
         JOIN draws d ON d.category = p.category AND d.date = p.date
         WHERE p.act_1 IS NULL",
    )?;
    let pending = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                [
                    row.get::<_, u8>(1)?,
                    row.get::<_, u8>(2)?,
                    row.get::<_, u8>(3)?,
                    row.get::<_, u8>(4)?,
                    row.get::<_, u8>(5)?,
                ],
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for (id, actual) in &pending {
        conn.execute(
            "UPDATE predictions SET act_1 = ?1, act_2 = ?2, act_3 = ?3, act_4 = ?4, act_5 = ?5
             WHERE id = ?6",
            rusqlite::params![actual[0], actual[1], actual[2], actual[3], actual[4], id],
        )?;
    }
    Ok(pending.len() as u32)
}
