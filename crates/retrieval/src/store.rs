//! SQLite document loading.
//!
//! The collection is produced by a configured SQL query; columns are
//! mapped by name. `content` is required, `url` and `title` are optional
//! and picked up when the query selects them.

use rusqlite::Connection;
use sibyl_core::{AppError, AppResult};
use std::path::Path;

use crate::document::{Document, DocumentSet};

/// Load the document collection from a SQLite database.
pub fn load_documents(path: &Path, query: &str) -> AppResult<DocumentSet> {
    let conn = Connection::open(path).map_err(|e| {
        AppError::Retrieval(format!("Failed to open database {:?}: {}", path, e))
    })?;

    let docs = load_with_connection(&conn, query)?;
    tracing::info!("Loaded {} documents from {:?}", docs.len(), path);
    Ok(docs)
}

/// Run `query` on an open connection and map its rows into documents.
pub fn load_with_connection(conn: &Connection, query: &str) -> AppResult<DocumentSet> {
    let mut stmt = conn
        .prepare(query)
        .map_err(|e| AppError::Retrieval(format!("Failed to prepare document query: {}", e)))?;

    let names: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();

    let content_idx = names
        .iter()
        .position(|name| name == "content")
        .ok_or_else(|| AppError::InvalidColumn("content".to_string()))?;
    let url_idx = names.iter().position(|name| name == "url");
    let title_idx = names.iter().position(|name| name == "title");

    let mut rows = stmt
        .query([])
        .map_err(|e| AppError::Retrieval(format!("Failed to run document query: {}", e)))?;

    let mut docs = Vec::new();
    while let Some(row) = rows
        .next()
        .map_err(|e| AppError::Retrieval(format!("Failed to read document row: {}", e)))?
    {
        let content: String = row
            .get(content_idx)
            .map_err(|e| AppError::Retrieval(format!("Failed to read content column: {}", e)))?;

        let url = match url_idx {
            Some(idx) => row
                .get::<_, Option<String>>(idx)
                .map_err(|e| AppError::Retrieval(format!("Failed to read url column: {}", e)))?,
            None => None,
        };

        let title = match title_idx {
            Some(idx) => row
                .get::<_, Option<String>>(idx)
                .map_err(|e| AppError::Retrieval(format!("Failed to read title column: {}", e)))?,
            None => None,
        };

        docs.push(Document {
            content,
            url,
            title,
        });
    }

    Ok(DocumentSet::new(docs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE documents (content TEXT NOT NULL, url TEXT, title TEXT);
             INSERT INTO documents VALUES ('premier document', 'https://a.example', 'A');
             INSERT INTO documents VALUES ('second document', 'https://b.example', NULL);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_load_all_columns() {
        let conn = seeded_connection();
        let docs =
            load_with_connection(&conn, "SELECT content, url, title FROM documents").unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs.get(0).unwrap().content, "premier document");
        assert_eq!(docs.get(0).unwrap().url.as_deref(), Some("https://a.example"));
        assert_eq!(docs.get(1).unwrap().title, None);
    }

    #[test]
    fn test_load_content_only() {
        let conn = seeded_connection();
        let docs = load_with_connection(&conn, "SELECT content FROM documents").unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs.get(0).unwrap().url, None);
    }

    #[test]
    fn test_missing_content_column() {
        let conn = seeded_connection();
        let err =
            load_with_connection(&conn, "SELECT url, title FROM documents").unwrap_err();
        assert!(matches!(err, AppError::InvalidColumn(field) if field == "content"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.sqlite");

        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE documents (content TEXT NOT NULL);
             INSERT INTO documents VALUES ('un document');",
        )
        .unwrap();
        drop(conn);

        let docs = load_documents(&path, "SELECT content FROM documents").unwrap();
        assert_eq!(docs.len(), 1);
    }
}
