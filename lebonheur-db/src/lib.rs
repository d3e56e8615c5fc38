pub mod db;
pub mod models;
pub mod schedule;

pub use rusqlite;
