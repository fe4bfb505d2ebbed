use crate::common::error::{FolioError, Result};
use libsql::{Builder, Connection, Database};
use tracing::info;

const UPSERT_DOCUMENT: &str = "INSERT INTO documents (id, kind, data, created_at, updated_at)
     VALUES (?1, ?2, ?3, datetime('now'), datetime('now'))
     ON CONFLICT(kind, id) DO UPDATE SET
       data = excluded.data,
       updated_at = excluded.updated_at";

pub struct DatabaseManager {
    _db: Database,
    conn: Connection,
}

impl DatabaseManager {
    /// Open the database at `url`.
    ///
    /// `libsql://`, `https://` and `http://` URLs connect to a remote Turso
    /// database with `auth_token`; anything else is a local file path
    /// (`:memory:` included).
    pub async fn connect(url: &str, auth_token: Option<&str>) -> Result<Self> {
        let is_remote = ["libsql://", "https://", "http://"]
            .iter()
            .any(|scheme| url.starts_with(scheme));

        let db = if is_remote {
            let token = auth_token.ok_or_else(|| {
                FolioError::database("An auth token is required for remote databases")
            })?;
            info!("Connecting to Turso database at {}", url);
            Builder::new_remote(url.to_string(), token.to_string())
                .build()
                .await
        } else {
            info!("Opening local database at {}", url);
            Builder::new_local(url).build().await
        }
        .map_err(|e| FolioError::database(format!("Failed to connect to database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| FolioError::database(format!("Failed to get database connection: {e}")))?;

        Ok(Self { _db: db, conn })
    }

    /// Get a connection to the database
    pub fn get_connection(&self) -> Connection {
        self.conn.clone()
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");

        let conn = self.get_connection();

        let migration_sql_001 = include_str!("../migrations/001_create_documents.sql");
        conn.execute_batch(migration_sql_001)
            .await
            .map_err(|e| FolioError::database(format!("Failed to run base migration: {e}")))?;

        let migration_sql_002 = include_str!("../migrations/002_indexes_and_pragmas.sql");
        conn.execute_batch(migration_sql_002)
            .await
            .map_err(|e| FolioError::database(format!("Failed to run index migration: {e}")))?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Create or update a document (upsert)
    pub async fn upsert_document(&self, kind: &str, id: &str, data: &str) -> Result<()> {
        self.conn
            .execute(UPSERT_DOCUMENT, libsql::params![id, kind, data])
            .await
            .map_err(|e| FolioError::database(format!("Failed to upsert {kind} document: {e}")))?;
        Ok(())
    }

    /// Upsert several documents in one transaction; nothing is written if any fails.
    pub async fn upsert_documents(&self, kind: &str, docs: &[(String, String)]) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .await
            .map_err(|e| FolioError::database(format!("Failed to begin transaction: {e}")))?;

        for (id, data) in docs {
            tx.execute(UPSERT_DOCUMENT, libsql::params![id.as_str(), kind, data.as_str()])
                .await
                .map_err(|e| {
                    FolioError::database(format!("Failed to upsert {kind} document {id}: {e}"))
                })?;
        }

        tx.commit()
            .await
            .map_err(|e| FolioError::database(format!("Failed to commit transaction: {e}")))?;
        Ok(())
    }

    /// Get a document body by kind and id
    pub async fn get_document(&self, kind: &str, id: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT data FROM documents WHERE kind = ?1 AND id = ?2",
                libsql::params![kind, id],
            )
            .await
            .map_err(|e| FolioError::database(format!("Failed to query document: {e}")))?;

        match rows
            .next()
            .await
            .map_err(|e| FolioError::database(format!("Failed to read row: {e}")))?
        {
            Some(row) => {
                let data: String = row
                    .get(0)
                    .map_err(|e| FolioError::database(format!("Failed to get data: {e}")))?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Get all document bodies of a kind, oldest first
    pub async fn get_documents_by_kind(&self, kind: &str) -> Result<Vec<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT data FROM documents WHERE kind = ?1 ORDER BY created_at, id",
                libsql::params![kind],
            )
            .await
            .map_err(|e| FolioError::database(format!("Failed to query documents: {e}")))?;

        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| FolioError::database(format!("Failed to read row: {e}")))?
        {
            let data: String = row
                .get(0)
                .map_err(|e| FolioError::database(format!("Failed to get data: {e}")))?;
            results.push(data);
        }

        Ok(results)
    }

    /// Delete a document; returns whether a row was removed
    pub async fn delete_document(&self, kind: &str, id: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM documents WHERE kind = ?1 AND id = ?2",
                libsql::params![kind, id],
            )
            .await
            .map_err(|e| FolioError::database(format!("Failed to delete {kind} {id}: {e}")))?;
        Ok(affected > 0)
    }
}
