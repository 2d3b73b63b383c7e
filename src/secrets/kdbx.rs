//! KeePass (KDBX) credential store.

use keepass::db::{Entry, Group, Node};
use keepass::{Database, DatabaseKey};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{SecretStore, SecureString};
use crate::error::SecretStoreError;

/// A KeePass database unlocked with a key file only.
#[derive(Debug, Clone)]
pub struct KeePassStore {
    db_path: PathBuf,
    key_path: PathBuf,
}

impl KeePassStore {
    pub fn new(db_path: impl Into<PathBuf>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            key_path: key_path.into(),
        }
    }

    fn open_database(&self) -> Result<Database, SecretStoreError> {
        let mut db_file = open_file(&self.db_path)?;
        let mut key_file = open_file(&self.key_path)?;

        let key = DatabaseKey::new()
            .with_keyfile(&mut key_file)
            .map_err(|e| SecretStoreError::Io {
                path: self.key_path.display().to_string(),
                source: e,
            })?;

        Database::open(&mut db_file, key).map_err(|e| SecretStoreError::Open(e.to_string()))
    }
}

impl SecretStore for KeePassStore {
    fn lookup(&self, entry_title: &str) -> Result<SecureString, SecretStoreError> {
        let db = self.open_database()?;
        debug!("Opened credential database {:?}", self.db_path);

        let entry = find_entry(&db.root, entry_title)
            .ok_or_else(|| SecretStoreError::NotFound(entry_title.to_string()))?;

        match entry.get_password() {
            Some(password) if !password.is_empty() => Ok(SecureString::from(password)),
            _ => Err(SecretStoreError::EmptyPassword(entry_title.to_string())),
        }
    }
}

/// First entry titled `title`, in document order (depth-first, pre-order).
fn find_entry<'a>(group: &'a Group, title: &str) -> Option<&'a Entry> {
    group.children.iter().find_map(|node| match node {
        Node::Entry(entry) if entry.get_title() == Some(title) => Some(entry),
        Node::Entry(_) => None,
        Node::Group(child) => find_entry(child, title),
    })
}

fn open_file(path: &Path) -> Result<File, SecretStoreError> {
    File::open(path).map_err(|e| SecretStoreError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepass::config::{DatabaseConfig, KdfConfig};
    use keepass::db::Value;
    use std::io::Write;

    const KEY_MATERIAL: &[u8] = b"msgraph-client test key file";

    fn entry(title: &str, password: &str) -> Entry {
        let mut entry = Entry::new();
        entry
            .fields
            .insert("Title".to_string(), Value::Unprotected(title.to_string()));
        entry.fields.insert(
            "Password".to_string(),
            Value::Protected(password.as_bytes().into()),
        );
        entry
    }

    /// Saves a small KDBX4 database locked with a key file.
    fn write_database(db: &Database) -> (tempfile::NamedTempFile, tempfile::NamedTempFile) {
        let key = garbage_file(KEY_MATERIAL);
        let mut file = tempfile::NamedTempFile::new().unwrap();

        let database_key = DatabaseKey::new()
            .with_keyfile(&mut &KEY_MATERIAL[..])
            .unwrap();
        db.save(file.as_file_mut(), database_key).unwrap();

        (file, key)
    }

    fn sample_database() -> Database {
        let config = DatabaseConfig {
            kdf_config: KdfConfig::Aes { rounds: 10 },
            ..Default::default()
        };
        let mut db = Database::new(config);

        db.root.add_child(entry("Unrelated", "other-secret"));
        db.root.add_child(entry("Empty", ""));

        let mut apps = Group::new("Applications");
        let mut azure = Group::new("Azure");
        azure.add_child(entry("GraphApiSecret", "nested-secret"));
        apps.add_child(azure);
        db.root.add_child(apps);

        db
    }

    fn garbage_file(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_lookup_in_saved_database() {
        let (db_file, key_file) = write_database(&sample_database());
        let store = KeePassStore::new(db_file.path(), key_file.path());

        let secret = store.lookup("GraphApiSecret").unwrap();
        assert_eq!(secret.as_str(), "nested-secret");

        assert!(matches!(
            store.lookup("Nope"),
            Err(SecretStoreError::NotFound(ref title)) if title == "Nope"
        ));
        assert!(matches!(
            store.lookup("Empty"),
            Err(SecretStoreError::EmptyPassword(ref title)) if title == "Empty"
        ));
    }

    #[test]
    fn test_first_matching_title_wins() {
        let mut db = sample_database();
        db.root.add_child(entry("GraphApiSecret", "later-secret"));
        let (db_file, key_file) = write_database(&db);
        let store = KeePassStore::new(db_file.path(), key_file.path());

        // The nested entry precedes the later root entry in document order
        let secret = store.lookup("GraphApiSecret").unwrap();
        assert_eq!(secret.as_str(), "nested-secret");
    }

    #[test]
    fn test_wrong_key_file() {
        let (db_file, _key_file) = write_database(&sample_database());
        let other_key = garbage_file(b"some other key");
        let store = KeePassStore::new(db_file.path(), other_key.path());

        assert!(matches!(
            store.lookup("GraphApiSecret"),
            Err(SecretStoreError::Open(_))
        ));
    }

    #[test]
    fn test_missing_database() {
        let key = garbage_file(b"key material");
        let store = KeePassStore::new("/nonexistent/secrets.kdbx", key.path());

        let result = store.lookup("GraphApiSecret");
        assert!(
            matches!(result, Err(SecretStoreError::Io { ref path, .. }) if path.ends_with("secrets.kdbx"))
        );
    }

    #[test]
    fn test_missing_key_file() {
        let db = garbage_file(b"not a database");
        let store = KeePassStore::new(db.path(), "/nonexistent/secrets.key");

        let result = store.lookup("GraphApiSecret");
        assert!(
            matches!(result, Err(SecretStoreError::Io { ref path, .. }) if path.ends_with("secrets.key"))
        );
    }

    #[test]
    fn test_corrupt_database() {
        let db = garbage_file(b"definitely not a kdbx file");
        let key = garbage_file(b"key material");
        let store = KeePassStore::new(db.path(), key.path());

        let result = store.lookup("GraphApiSecret");
        assert!(matches!(result, Err(SecretStoreError::Open(_))));
    }
}
