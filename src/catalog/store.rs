use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;

use super::error::CatalogError;
use super::{PackageDraft, PackageField, PackageRecord};

/// Sqlite-backed store for the package catalog. One connection, one table.
pub struct CatalogStore {
    conn: Connection,
}

const CURRENT_SCHEMA_VERSION: i32 = 1;

impl CatalogStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        // Initialize or update schema
        Self::init_schema(&conn)?;

        Ok(CatalogStore { conn })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        // Create schema version table if it doesn't exist
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER NOT NULL,
                updated TEXT NOT NULL,
                PRIMARY KEY (version)
            )",
            (),
        )?;

        // Get current schema version
        let version = match conn.query_row(
            "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
            [],
            |row| row.get(0),
        ) {
            Ok(v) => v,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                // No schema version found, initialize with version 0
                conn.execute(
                    "INSERT INTO schema_version (version, updated) VALUES (0, datetime('now'))",
                    [],
                )?;
                0
            }
            Err(e) => return Err(e.into()),
        };

        // Run migrations if needed
        if version < CURRENT_SCHEMA_VERSION {
            Self::migrate_schema(conn, version)?;
        }

        Ok(())
    }

    fn migrate_schema(conn: &Connection, from_version: i32) -> Result<()> {
        match from_version {
            0 => {
                // Initial schema creation
                conn.execute(
                    "CREATE TABLE IF NOT EXISTS packages (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        package_name TEXT NOT NULL,
                        package_desc TEXT NOT NULL,
                        slug TEXT NOT NULL,
                        command_debian TEXT NOT NULL,
                        command_fedora TEXT NOT NULL
                    )",
                    (),
                )?;

                // Update to version 1
                conn.execute(
                    "INSERT INTO schema_version (version, updated) VALUES (1, datetime('now'))",
                    [],
                )?;
            }
            // Future migrations can be added here
            _ => {}
        }
        Ok(())
    }

    /// All records in id order. An empty catalog yields an empty vec.
    pub fn list_all(&self) -> Result<Vec<PackageRecord>, CatalogError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, package_name, package_desc, slug, command_debian, command_fedora
             FROM packages ORDER BY id",
        )?;
        let rows = stmt.query_map([], Self::record_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Resolve a record by a fuzzy key: a key that parses as an integer is
    /// treated as an id, anything else matches `package_name` first and
    /// falls back to `slug`. If one record matches by name and another by
    /// slug, the name match wins.
    pub fn find(&self, key: &str) -> Result<PackageRecord, CatalogError> {
        if let Ok(id) = key.parse::<i64>() {
            return self
                .find_by_column("id", &id)?
                .ok_or_else(|| CatalogError::NotFound(key.to_string()));
        }

        if let Some(record) = self.find_by_column("package_name", &key)? {
            return Ok(record);
        }
        self.find_by_column("slug", &key)?
            .ok_or_else(|| CatalogError::NotFound(key.to_string()))
    }

    fn find_by_column<P: rusqlite::ToSql>(
        &self,
        column: &str,
        value: &P,
    ) -> Result<Option<PackageRecord>, CatalogError> {
        let sql = format!(
            "SELECT id, package_name, package_desc, slug, command_debian, command_fedora
             FROM packages WHERE {column} = ? LIMIT 1"
        );
        match self.conn.query_row(&sql, [value], Self::record_from_row) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert a new record; the store assigns the id.
    pub fn insert(&self, draft: &PackageDraft) -> Result<PackageRecord, CatalogError> {
        draft.validate()?;
        self.conn.execute(
            "INSERT INTO packages (package_name, package_desc, slug, command_debian, command_fedora)
             VALUES (?, ?, ?, ?, ?)",
            (
                &draft.package_name,
                &draft.package_desc,
                &draft.slug,
                &draft.command_debian,
                &draft.command_fedora,
            ),
        )?;
        Ok(PackageRecord {
            id: self.conn.last_insert_rowid(),
            package_name: draft.package_name.clone(),
            package_desc: draft.package_desc.clone(),
            slug: draft.slug.clone(),
            command_debian: draft.command_debian.clone(),
            command_fedora: draft.command_fedora.clone(),
        })
    }

    /// Overwrite every mutable field of an existing record.
    pub fn replace(
        &self,
        record: &PackageRecord,
        draft: &PackageDraft,
    ) -> Result<PackageRecord, CatalogError> {
        draft.validate()?;
        let changed = self.conn.execute(
            "UPDATE packages SET package_name = ?, package_desc = ?, slug = ?,
             command_debian = ?, command_fedora = ? WHERE id = ?",
            (
                &draft.package_name,
                &draft.package_desc,
                &draft.slug,
                &draft.command_debian,
                &draft.command_fedora,
                record.id,
            ),
        )?;
        if changed == 0 {
            return Err(CatalogError::NotFound(record.id.to_string()));
        }
        Ok(PackageRecord {
            id: record.id,
            package_name: draft.package_name.clone(),
            package_desc: draft.package_desc.clone(),
            slug: draft.slug.clone(),
            command_debian: draft.command_debian.clone(),
            command_fedora: draft.command_fedora.clone(),
        })
    }

    /// Change exactly one field of an existing record.
    pub fn update_field(
        &self,
        record: &PackageRecord,
        field: PackageField,
        value: &str,
    ) -> Result<PackageRecord, CatalogError> {
        field.check(value)?;
        let sql = format!("UPDATE packages SET {} = ? WHERE id = ?", field.column());
        let changed = self.conn.execute(&sql, (value, record.id))?;
        if changed == 0 {
            return Err(CatalogError::NotFound(record.id.to_string()));
        }

        let mut updated = record.clone();
        match field {
            PackageField::Name => updated.package_name = value.to_string(),
            PackageField::Desc => updated.package_desc = value.to_string(),
            PackageField::Slug => updated.slug = value.to_string(),
            PackageField::CommandDebian => updated.command_debian = value.to_string(),
            PackageField::CommandFedora => updated.command_fedora = value.to_string(),
        }
        Ok(updated)
    }

    /// Remove a record. Deleting a record that is already gone is an error.
    pub fn delete(&self, record: &PackageRecord) -> Result<(), CatalogError> {
        let changed = self
            .conn
            .execute("DELETE FROM packages WHERE id = ?", [record.id])?;
        if changed == 0 {
            return Err(CatalogError::NotFound(record.id.to_string()));
        }
        Ok(())
    }

    fn record_from_row(row: &rusqlite::Row) -> rusqlite::Result<PackageRecord> {
        Ok(PackageRecord {
            id: row.get(0)?,
            package_name: row.get(1)?,
            package_desc: row.get(2)?,
            slug: row.get(3)?,
            command_debian: row.get(4)?,
            command_fedora: row.get(5)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_store() -> (tempfile::TempDir, CatalogStore) {
        let dir = tempdir().unwrap();
        let store = CatalogStore::open(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    fn vlc_draft() -> PackageDraft {
        PackageDraft {
            package_name: "VLC".into(),
            package_desc: "media player".into(),
            slug: "vlc".into(),
            command_debian: "apt install vlc".into(),
            command_fedora: "dnf install vlc".into(),
        }
    }

    #[test]
    fn insert_then_find_round_trips() {
        let (_dir, store) = open_store();
        let record = store.insert(&vlc_draft()).unwrap();

        let found = store.find(&record.id.to_string()).unwrap();
        assert_eq!(found, record);
        assert_eq!(found.package_name, "VLC");
    }

    #[test]
    fn list_all_is_empty_for_a_fresh_store() {
        let (_dir, store) = open_store();
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn numeric_keys_only_ever_resolve_by_id() {
        let (_dir, store) = open_store();
        // A package whose name happens to be numeric must not be reachable
        // through the id path.
        let decoy = store
            .insert(&PackageDraft {
                package_name: "33".into(),
                package_desc: "decoy entry".into(),
                slug: "decoy".into(),
                command_debian: "apt install decoy".into(),
                command_fedora: "dnf install decoy".into(),
            })
            .unwrap();
        assert_ne!(decoy.id, 33);

        assert!(store.find("33").unwrap_err().is_not_found());
        assert_eq!(store.find(&decoy.id.to_string()).unwrap().id, decoy.id);
        assert_eq!(store.find("decoy").unwrap().id, decoy.id);
    }

    #[test]
    fn name_match_wins_over_slug_match() {
        let (_dir, store) = open_store();
        let by_slug = store.insert(&vlc_draft()).unwrap();
        let by_name = store
            .insert(&PackageDraft {
                package_name: "vlc".into(),
                package_desc: "lowercase name".into(),
                slug: "other-slug".into(),
                command_debian: "apt install vlc".into(),
                command_fedora: "dnf install vlc".into(),
            })
            .unwrap();

        let found = store.find("vlc").unwrap();
        assert_eq!(found.id, by_name.id);

        // The slug-only match is still reachable by its own keys.
        assert_eq!(store.find("VLC").unwrap().id, by_slug.id);
    }

    #[test]
    fn slug_is_the_fallback_lookup_key() {
        let (_dir, store) = open_store();
        let record = store.insert(&vlc_draft()).unwrap();
        assert_eq!(store.find("vlc").unwrap().id, record.id);
        assert!(store.find("mpv").unwrap_err().is_not_found());
    }

    #[test]
    fn update_field_touches_only_that_field() {
        let (_dir, store) = open_store();
        let before = store.insert(&vlc_draft()).unwrap();

        let after = store
            .update_field(&before, PackageField::Slug, "new-slug")
            .unwrap();
        assert_eq!(after.slug, "new-slug");

        let reread = store.find(&before.id.to_string()).unwrap();
        assert_eq!(reread.slug, "new-slug");
        assert_eq!(reread.package_name, before.package_name);
        assert_eq!(reread.package_desc, before.package_desc);
        assert_eq!(reread.command_debian, before.command_debian);
        assert_eq!(reread.command_fedora, before.command_fedora);
    }

    #[test]
    fn replace_overwrites_all_fields_and_keeps_the_id() {
        let (_dir, store) = open_store();
        let before = store.insert(&vlc_draft()).unwrap();

        let after = store
            .replace(
                &before,
                &PackageDraft {
                    package_name: "mpv".into(),
                    package_desc: "minimal media player".into(),
                    slug: "mpv".into(),
                    command_debian: "apt install mpv".into(),
                    command_fedora: "dnf install mpv".into(),
                },
            )
            .unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(store.find("mpv").unwrap().package_name, "mpv");
    }

    #[test]
    fn delete_then_find_reports_not_found() {
        let (_dir, store) = open_store();
        let record = store.insert(&vlc_draft()).unwrap();
        store.delete(&record).unwrap();

        assert!(store.find(&record.id.to_string()).unwrap_err().is_not_found());
        assert!(store.delete(&record).unwrap_err().is_not_found());
    }

    #[test]
    fn writes_enforce_length_bounds() {
        let (_dir, store) = open_store();
        let mut draft = vlc_draft();
        draft.package_name = "x".into();
        assert!(matches!(
            store.insert(&draft).unwrap_err(),
            CatalogError::Validation { .. }
        ));

        let record = store.insert(&vlc_draft()).unwrap();
        assert!(matches!(
            store
                .update_field(&record, PackageField::Slug, &"s".repeat(31))
                .unwrap_err(),
            CatalogError::Validation { .. }
        ));
    }
}
