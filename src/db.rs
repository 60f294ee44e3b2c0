use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use libsql::{Builder, Connection};

use crate::model::{Bookmark, NewBookmark};
use crate::store::BookmarkStore;

const SYSTEM_MIGRATIONS: &[(&str, &str)] =
    &[("system/000_migrations_table.sql", include_str!("migrations/system/000_migrations_table.sql"))];

const MIGRATIONS: &[(&str, &str)] = &[("001_bookmarks.sql", include_str!("migrations/001_bookmarks.sql"))];

pub struct Database {
    conn: Connection,
}

impl Database {
    pub async fn new(path: &Path) -> Result<Self> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        conn.query("SELECT 1", ()).await?;

        for (filename, sql) in SYSTEM_MIGRATIONS {
            Self::run_migration(&conn, filename, sql).await?;
        }

        for (filename, sql) in MIGRATIONS {
            Self::run_migration(&conn, filename, sql).await?;
        }

        Ok(Database { conn })
    }

    async fn is_migration_applied(conn: &Connection, name: &str) -> Result<bool> {
        let query = "SELECT 1 FROM _migrations WHERE name = ?";
        match conn.query(query, libsql::params![name]).await {
            Ok(mut rows) => Ok(rows.next().await?.is_some()),
            Err(e) => {
                if e.to_string().contains("no such table") {
                    Ok(false)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn record_migration(conn: &Connection, name: &str) -> Result<()> {
        let query = r#"
            INSERT INTO _migrations (name, applied_at)
            VALUES (?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        "#;
        match conn.execute(query, libsql::params![name]).await {
            Ok(_) => Ok(()),
            Err(e) => {
                if e.to_string().contains("no such table") {
                    Ok(())
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
        if Self::is_migration_applied(conn, name).await? {
            tracing::debug!("migration {} already applied, skipping", name);
            return Ok(());
        }

        tracing::info!("applying migration: {}", name);
        conn.execute_batch(sql)
            .await
            .map_err(|e| anyhow::anyhow!("failed to execute migration {name}: {e}"))?;

        Self::record_migration(conn, name).await?;
        Ok(())
    }

    fn row_to_bookmark(row: &libsql::Row) -> Result<Bookmark> {
        let id: i64 = row.get(0)?;
        let title: String = row.get(1)?;
        let url: String = row.get(2)?;
        let description: String = row.get::<Option<String>>(3)?.unwrap_or_default();
        let rating = rating_to_f64(row.get_value(4)?);

        Ok(Bookmark {
            id: id.to_string(),
            title,
            url,
            description,
            rating,
        })
    }
}

#[async_trait]
impl BookmarkStore for Database {
    async fn list(&self) -> Result<Vec<Bookmark>> {
        let query = "SELECT id, title, url, description, rating FROM bookmarks ORDER BY id";
        let mut rows = self.conn.query(query, ()).await?;
        let mut bookmarks: Vec<Bookmark> = vec![];

        while let Some(row) = rows.next().await? {
            bookmarks.push(Self::row_to_bookmark(&row)?);
        }

        Ok(bookmarks)
    }

    async fn get(&self, id: &str) -> Result<Option<Bookmark>> {
        let Some(row_id) = parse_row_id(id) else {
            return Ok(None);
        };

        let query = "SELECT id, title, url, description, rating FROM bookmarks WHERE id = ?";
        let mut rows = self.conn.query(query, libsql::params![row_id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_bookmark(&row)?))
        } else {
            Ok(None)
        }
    }

    async fn insert(&self, bookmark: NewBookmark) -> Result<Bookmark> {
        let query = r#"
            INSERT INTO bookmarks (title, url, description, rating)
            VALUES (?, ?, ?, ?)
            RETURNING id, title, url, description, rating
        "#;

        let mut rows = self
            .conn
            .query(
                query,
                libsql::params![bookmark.title, bookmark.url, bookmark.description, bookmark.rating],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Self::row_to_bookmark(&row)
        } else {
            anyhow::bail!("Failed to create bookmark")
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let Some(row_id) = parse_row_id(id) else {
            return Ok(false);
        };

        let affected = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?", libsql::params![row_id])
            .await?;
        Ok(affected > 0)
    }
}

// Ids are integer keys rendered as text at the API boundary. Anything that
// does not parse back cannot name a row.
fn parse_row_id(id: &str) -> Option<i64> {
    id.parse().ok()
}

/// The rating column is REAL, but rows written by older tooling may carry
/// integer or text cells. Reads coerce to a number either way.
fn rating_to_f64(value: libsql::Value) -> f64 {
    match value {
        libsql::Value::Integer(n) => n as f64,
        libsql::Value::Real(f) => f,
        libsql::Value::Text(s) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::BookmarkStore;

    async fn test_db() -> Database {
        Database::new(Path::new(":memory:")).await.unwrap()
    }

    fn new_bookmark(title: &str, rating: f64) -> NewBookmark {
        NewBookmark {
            title: title.to_string(),
            url: "https://www.testsiteone.com".to_string(),
            description: "Test site ONE".to_string(),
            rating,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let db = test_db().await;
        let inserted = db.insert(new_bookmark("First test site", 1.0)).await.unwrap();
        assert!(inserted.id.parse::<i64>().is_ok());

        let found = db.get(&inserted.id).await.unwrap();
        assert_eq!(found, Some(inserted));
    }

    #[tokio::test]
    async fn test_get_unknown_and_unparseable_ids() {
        let db = test_db().await;
        assert_eq!(db.get("12345").await.unwrap(), None);
        assert_eq!(db.get("not-a-row-id").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_orders_by_id() {
        let db = test_db().await;
        db.insert(new_bookmark("First test site", 1.0)).await.unwrap();
        db.insert(new_bookmark("Second test site", 2.0)).await.unwrap();
        db.insert(new_bookmark("Third test site", 3.0)).await.unwrap();

        let titles: Vec<String> = db.list().await.unwrap().into_iter().map(|b| b.title).collect();
        assert_eq!(titles, ["First test site", "Second test site", "Third test site"]);
    }

    #[tokio::test]
    async fn test_delete_reports_whether_removed() {
        let db = test_db().await;
        let inserted = db.insert(new_bookmark("First test site", 1.0)).await.unwrap();

        assert!(db.delete(&inserted.id).await.unwrap());
        assert!(!db.delete(&inserted.id).await.unwrap());
        assert!(!db.delete("not-a-row-id").await.unwrap());
        assert!(db.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rating_cells_coerce_to_number() {
        let db = test_db().await;
        db.conn
            .execute(
                "INSERT INTO bookmarks (title, url, description, rating) VALUES ('t', 'https://x.com', '', '4')",
                (),
            )
            .await
            .unwrap();

        let bookmarks = db.list().await.unwrap();
        assert_eq!(bookmarks[0].rating, 4.0);
    }

    #[test]
    fn test_rating_to_f64_coercions() {
        assert_eq!(rating_to_f64(libsql::Value::Integer(3)), 3.0);
        assert_eq!(rating_to_f64(libsql::Value::Real(4.5)), 4.5);
        assert_eq!(rating_to_f64(libsql::Value::Text("2".to_string())), 2.0);
        assert_eq!(rating_to_f64(libsql::Value::Null), 0.0);
    }

    #[tokio::test]
    async fn test_migrations_are_recorded() {
        let db = test_db().await;
        let mut rows = db.conn.query("SELECT COUNT(*) FROM _migrations", ()).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        let count: i64 = row.get(0).unwrap();
        assert_eq!(count, (SYSTEM_MIGRATIONS.len() + MIGRATIONS.len()) as i64);
    }
}
