//! Filtered lookups against the manifest catalog.

use rusqlite::{params_from_iter, Connection, Row};
use tracing::debug;

use crate::error::{ExtractError, Result};
use crate::filters::FilterSpec;
use crate::models::FileRecord;
use crate::schema::files;

/// A query for the file records matching one filter
///
/// Matches `domain = ?` exactly, `relativePath LIKE <condition>`, and a
/// `relativePath` ending in `.<ext>` for any allowed extension. Both case
/// variants are bound so the result does not depend on
/// `PRAGMA case_sensitive_like`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    domain: String,
    condition: String,
    suffix_patterns: Vec<String>,
}

impl CatalogQuery {
    /// Build the query for `spec`
    #[must_use]
    pub fn for_spec(spec: &FilterSpec) -> Self {
        Self {
            domain: spec.origin_domain().to_string(),
            condition: spec.path_condition().to_string(),
            suffix_patterns: spec
                .allowed_extensions()
                .iter()
                .map(|ext| format!("%.{ext}"))
                .collect(),
        }
    }

    /// SQL text, or `None` when no extension is allowed
    #[must_use]
    pub fn sql(&self) -> Option<String> {
        if self.suffix_patterns.is_empty() {
            return None;
        }

        let suffixes = (0..self.suffix_patterns.len())
            .map(|i| format!("{} LIKE ?{}", files::RELATIVE_PATH, i + 3))
            .collect::<Vec<_>>()
            .join(" OR ");

        Some(format!(
            "SELECT {id}, {domain}, {path} FROM {table} \
             WHERE {domain} = ?1 AND {path} LIKE ?2 AND ({suffixes}) \
             ORDER BY {id}",
            id = files::FILE_ID,
            domain = files::DOMAIN,
            path = files::RELATIVE_PATH,
            table = files::TABLE,
        ))
    }

    /// Bound parameters, in placeholder order
    #[must_use]
    pub fn params(&self) -> Vec<&str> {
        let mut params = vec![self.domain.as_str(), self.condition.as_str()];
        params.extend(self.suffix_patterns.iter().map(String::as_str));
        params
    }

    /// Run the query against an open manifest
    pub fn execute(&self, conn: &Connection) -> Result<Vec<FileRecord>> {
        let Some(sql) = self.sql() else {
            debug!(domain = %self.domain, "Empty extension list; nothing to query");
            return Ok(Vec::new());
        };

        let unavailable = |e| ExtractError::catalog(format!("manifest ({})", self.domain), e);

        let mut stmt = conn.prepare(&sql).map_err(unavailable)?;
        let rows = stmt
            .query_map(params_from_iter(self.params()), map_file_record)
            .map_err(unavailable)?;

        let mut results = Vec::new();
        for record in rows {
            results.push(record.map_err(unavailable)?);
        }

        debug!(domain = %self.domain, count = results.len(), "Catalog query finished");
        Ok(results)
    }
}

/// Map a database row to a FileRecord
fn map_file_record(row: &Row) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        file_id: row.get(0)?,
        origin_domain: row.get(1)?,
        relative_path: row.get(2)?,
    })
}

/// Fetch the records matching `spec`
pub fn query_domain(conn: &Connection, spec: &FilterSpec) -> Result<Vec<FileRecord>> {
    CatalogQuery::for_spec(spec).execute(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE Files (fileID TEXT PRIMARY KEY, domain TEXT, relativePath TEXT, flags INTEGER, file BLOB);
             INSERT INTO Files VALUES ('aa01', 'CameraRollDomain', 'Media/DCIM/100APPLE/IMG_0001.JPG', 1, NULL);
             INSERT INTO Files VALUES ('bb02', 'CameraRollDomain', 'Media/DCIM/100APPLE/IMG_0002.mov', 1, NULL);
             INSERT INTO Files VALUES ('cc03', 'CameraRollDomain', 'Media/DCIM/100APPLE/IMG_0003.HEIC', 1, NULL);
             INSERT INTO Files VALUES ('dd04', 'CameraRollDomain', 'Media/PhotoData/thumb.jpg', 1, NULL);
             INSERT INTO Files VALUES ('ee05', 'MediaDomain', 'Media/DCIM/100APPLE/IMG_0004.jpg', 1, NULL);
             INSERT INTO Files VALUES ('ff06', 'CameraRollDomain', 'Media/DCIM/100APPLE/notajpg', 1, NULL);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_matches_domain_condition_and_extension() {
        let spec = FilterSpec::new("CameraRollDomain", "Media/DCIM%", "camera", ["jpg", "mov"]).unwrap();
        let records = query_domain(&manifest(), &spec).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.file_id.as_str()).collect();
        assert_eq!(ids, vec!["aa01", "bb02"]);
    }

    #[test]
    fn test_uppercase_extension_matches_under_case_sensitive_like() {
        let conn = manifest();
        conn.execute_batch("PRAGMA case_sensitive_like = ON;").unwrap();
        let spec = FilterSpec::new("CameraRollDomain", "Media/DCIM%", "camera", ["jpg"]).unwrap();
        let records = query_domain(&conn, &spec).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].relative_path, "Media/DCIM/100APPLE/IMG_0001.JPG");
    }

    #[test]
    fn test_empty_allow_list_yields_nothing() {
        let spec = FilterSpec::new("CameraRollDomain", "Media/DCIM%", "camera", Vec::<&str>::new()).unwrap();
        assert!(CatalogQuery::for_spec(&spec).sql().is_none());
        assert!(query_domain(&manifest(), &spec).unwrap().is_empty());
    }

    #[test]
    fn test_missing_table_is_catalog_unavailable() {
        let conn = Connection::open_in_memory().unwrap();
        let spec = FilterSpec::new("CameraRollDomain", "Media/DCIM%", "camera", ["jpg"]).unwrap();
        assert!(matches!(
            query_domain(&conn, &spec),
            Err(ExtractError::CatalogUnavailable { .. })
        ));
    }

    #[test]
    fn test_params_follow_placeholders() {
        let spec = FilterSpec::new("MediaDomain", "Library/SMS/Attachments%", "sms", ["gif"]).unwrap();
        let query = CatalogQuery::for_spec(&spec);
        assert_eq!(
            query.params(),
            vec!["MediaDomain", "Library/SMS/Attachments%", "%.GIF", "%.gif"]
        );
        assert!(query.sql().unwrap().contains("relativePath LIKE ?4"));
    }
}
