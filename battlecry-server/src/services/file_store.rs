//! Virtual file tree storage
//!
//! Entries are keyed by absolute path. Directories are ordinary rows with
//! `type = 'directory'`; there is no parent/child linkage, listing is done
//! by path prefix.

use async_trait::async_trait;
use battlecry_common::types::{content_size, FileEntry, NewFileEntry, UpdateFileRequest};
use battlecry_common::{BattlecryError, Result};
use chrono::Utc;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Storage backend for the editor's file browser
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Every entry, ordered by path
    async fn all(&self) -> Result<Vec<FileEntry>>;

    async fn get(&self, path: &str) -> Result<Option<FileEntry>>;

    /// Insert a new entry; an existing path is a [`BattlecryError::Conflict`]
    async fn insert(&self, entry: NewFileEntry) -> Result<FileEntry>;

    /// Apply a partial update, returning None when the path is unknown
    async fn update(&self, path: &str, changes: UpdateFileRequest) -> Result<Option<FileEntry>>;

    /// Returns whether an entry was removed
    async fn delete(&self, path: &str) -> Result<bool>;

    fn backend(&self) -> &'static str;

    /// Entries exactly one level below `dir`
    async fn list_children(&self, dir: &str) -> Result<Vec<FileEntry>> {
        let entries = self.all().await?;
        Ok(entries
            .into_iter()
            .filter(|entry| is_direct_child(dir, &entry.path))
            .collect())
    }
}

/// Whether `path` sits directly inside `dir`
pub fn is_direct_child(dir: &str, path: &str) -> bool {
    if path == dir {
        return false;
    }

    let relative = if dir == "/" {
        path
    } else {
        match path.strip_prefix(dir).and_then(|rest| rest.strip_prefix('/')) {
            Some(rest) => rest,
            None => return false,
        }
    };

    relative.split('/').filter(|part| !part.is_empty()).count() == 1
}

fn already_exists() -> BattlecryError {
    BattlecryError::Conflict("File already exists".to_string())
}

/// Postgres-backed store
#[derive(Clone)]
pub struct PgFileStore {
    pool: PgPool,
}

impl PgFileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileStore for PgFileStore {
    async fn all(&self) -> Result<Vec<FileEntry>> {
        let entries = sqlx::query_as::<_, FileEntry>(
            "SELECT id, path, content, type, permissions, size, created_at, updated_at \
             FROM files ORDER BY path",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn get(&self, path: &str) -> Result<Option<FileEntry>> {
        let entry = sqlx::query_as::<_, FileEntry>(
            "SELECT id, path, content, type, permissions, size, created_at, updated_at \
             FROM files WHERE path = $1",
        )
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn insert(&self, entry: NewFileEntry) -> Result<FileEntry> {
        let inserted = sqlx::query_as::<_, FileEntry>(
            "INSERT INTO files (path, content, type, permissions, size) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, path, content, type, permissions, size, created_at, updated_at",
        )
        .bind(&entry.path)
        .bind(&entry.content)
        .bind(entry.kind.as_str())
        .bind(&entry.permissions)
        .bind(entry.size)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => already_exists(),
            other => BattlecryError::DatabaseError(other),
        })?;

        Ok(inserted)
    }

    async fn update(&self, path: &str, changes: UpdateFileRequest) -> Result<Option<FileEntry>> {
        let size = changes.content.as_deref().map(content_size);

        let updated = sqlx::query_as::<_, FileEntry>(
            "UPDATE files SET \
                 content = COALESCE($2, content), \
                 size = COALESCE($3, size), \
                 permissions = COALESCE($4, permissions), \
                 updated_at = NOW() \
             WHERE path = $1 \
             RETURNING id, path, content, type, permissions, size, created_at, updated_at",
        )
        .bind(path)
        .bind(changes.content)
        .bind(size)
        .bind(changes.permissions)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, path: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE path = $1")
            .bind(path)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[derive(Debug, Default)]
struct MemoryTable {
    last_id: i32,
    entries: BTreeMap<String, FileEntry>,
}

/// Process-local store used when no database is configured
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    table: RwLock<MemoryTable>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn all(&self) -> Result<Vec<FileEntry>> {
        let table = self.table.read().await;
        Ok(table.entries.values().cloned().collect())
    }

    async fn get(&self, path: &str) -> Result<Option<FileEntry>> {
        let table = self.table.read().await;
        Ok(table.entries.get(path).cloned())
    }

    async fn insert(&self, entry: NewFileEntry) -> Result<FileEntry> {
        let mut table = self.table.write().await;
        if table.entries.contains_key(&entry.path) {
            return Err(already_exists());
        }

        table.last_id += 1;
        let now = Utc::now();
        let stored = FileEntry {
            id: table.last_id,
            path: entry.path,
            content: entry.content,
            kind: entry.kind.as_str().to_string(),
            permissions: entry.permissions,
            size: entry.size,
            created_at: now,
            updated_at: now,
        };
        table.entries.insert(stored.path.clone(), stored.clone());

        Ok(stored)
    }

    async fn update(&self, path: &str, changes: UpdateFileRequest) -> Result<Option<FileEntry>> {
        let mut table = self.table.write().await;
        let Some(entry) = table.entries.get_mut(path) else {
            return Ok(None);
        };

        if let Some(content) = changes.content {
            entry.size = content_size(&content);
            entry.content = content;
        }
        if let Some(permissions) = changes.permissions {
            entry.permissions = permissions;
        }
        entry.updated_at = Utc::now();

        Ok(Some(entry.clone()))
    }

    async fn delete(&self, path: &str) -> Result<bool> {
        let mut table = self.table.write().await;
        Ok(table.entries.remove(path).is_some())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
