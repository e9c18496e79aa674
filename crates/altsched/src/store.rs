//! User preference store: which group each user selected.
//!
//! Consumed by the conversational layer only; query operations never touch
//! it. One row per user, replaced on re-selection.

use rusqlite::{Connection, OptionalExtension, Result};
use std::sync::Mutex;
use tracing::info;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS users (
    user_id    INTEGER PRIMARY KEY,
    group_name TEXT NOT NULL,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
";

pub struct UserStore {
    db: Mutex<Connection>,
}

impl UserStore {
    /// Opens (or creates) the store at the given path and ensures the schema.
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        info!(db_path, "user store opened");
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// Saves the selected group for a user, replacing any previous choice.
    pub fn set_group(&self, user_id: i64, group: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO users (user_id, group_name) VALUES (?1, ?2)
             ON CONFLICT(user_id) DO UPDATE
             SET group_name = excluded.group_name, updated_at = CURRENT_TIMESTAMP",
            (user_id, group),
        )?;
        info!(user_id, group, "user group saved");
        Ok(())
    }

    /// The group a user selected, if any.
    pub fn get_group(&self, user_id: i64) -> Result<Option<String>> {
        let db = self.db.lock().unwrap();
        db.query_row(
            "SELECT group_name FROM users WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )
        .optional()
    }

    /// Removes a user's data. Returns true if a row was deleted.
    pub fn delete_user(&self, user_id: i64) -> Result<bool> {
        let db = self.db.lock().unwrap();
        let deleted = db.execute("DELETE FROM users WHERE user_id = ?1", [user_id])?;
        Ok(deleted > 0)
    }

    /// All known users with their selected groups.
    pub fn all_users(&self) -> Result<Vec<(i64, String)>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare("SELECT user_id, group_name FROM users ORDER BY user_id")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let store = UserStore::open_in_memory().unwrap();
        assert_eq!(store.get_group(42).unwrap(), None);

        store.set_group(42, "ИБ-41").unwrap();
        assert_eq!(store.get_group(42).unwrap().as_deref(), Some("ИБ-41"));
    }

    #[test]
    fn test_reselection_replaces_group() {
        let store = UserStore::open_in_memory().unwrap();
        store.set_group(42, "ИБ-41").unwrap();
        store.set_group(42, "ИБ-43").unwrap();
        assert_eq!(store.get_group(42).unwrap().as_deref(), Some("ИБ-43"));
        assert_eq!(store.all_users().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_user() {
        let store = UserStore::open_in_memory().unwrap();
        store.set_group(42, "ИБ-41").unwrap();
        assert!(store.delete_user(42).unwrap());
        assert!(!store.delete_user(42).unwrap());
        assert_eq!(store.get_group(42).unwrap(), None);
    }

    #[test]
    fn test_all_users_sorted() {
        let store = UserStore::open_in_memory().unwrap();
        store.set_group(7, "ИБ-42").unwrap();
        store.set_group(3, "ИБ-41").unwrap();
        let users = store.all_users().unwrap();
        assert_eq!(
            users,
            vec![(3, "ИБ-41".to_string()), (7, "ИБ-42".to_string())]
        );
    }
}
