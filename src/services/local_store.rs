use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::PortalError;

pub fn get_app_data_dir() -> Result<PathBuf, PortalError> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| PortalError::Config("Could not find data directory".to_string()))?
        .join("UmsFeedback");

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)?;
    }

    Ok(data_dir)
}

/// JSON key/value storage, one `<key>.json` file per key.
///
/// Plays the part of the browser's `localStorage` for the things the portal
/// keeps on the client: admin reminders, the cached user and the config.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn open_default() -> Result<Self, PortalError> {
        Ok(Self { root: get_app_data_dir()? })
    }

    pub fn at(root: impl Into<PathBuf>) -> Result<Self, PortalError> {
        let root = root.into();
        if !root.exists() {
            fs::create_dir_all(&root)?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, PortalError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(PortalError::InvalidInput(format!("Invalid storage key: {}", key)));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }

    /// Raw stored text, `None` when the key was never written.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, PortalError> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PortalError> {
        match self.get_raw(key)? {
            Some(content) => Ok(Some(serde_json::from_str(&content)?)),
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), PortalError> {
        let path = self.key_path(key)?;
        let content = serde_json::to_string_pretty(value)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), PortalError> {
        let path = self.key_path(key)?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    pub fn exports_dir(&self) -> Result<PathBuf, PortalError> {
        let exports_dir = self.root.join("exports");
        if !exports_dir.exists() {
            fs::create_dir_all(&exports_dir)?;
        }
        Ok(exports_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        title: String,
    }

    #[test]
    fn set_get_remove() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::at(dir.path()).unwrap();

        assert_eq!(store.get::<Entry>("adminReminders").unwrap(), None);

        let entry = Entry { title: "Check dorm reports".to_string() };
        store.set("adminReminders", &entry).unwrap();
        assert_eq!(store.get::<Entry>("adminReminders").unwrap(), Some(entry));
        assert!(dir.path().join("adminReminders.json").exists());

        store.remove("adminReminders").unwrap();
        assert_eq!(store.get_raw("adminReminders").unwrap(), None);
    }

    #[test]
    fn rejects_keys_that_escape_the_root() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::at(dir.path()).unwrap();
        assert!(matches!(
            store.set("../outside", &1),
            Err(PortalError::InvalidInput(_))
        ));
    }

    #[test]
    fn corrupt_values_fail_to_parse() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::at(dir.path()).unwrap();
        fs::write(dir.path().join("ums_user.json"), "{not json").unwrap();
        assert!(matches!(store.get::<Entry>("ums_user"), Err(PortalError::Json(_))));
    }

    #[test]
    fn exports_dir_is_created() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::at(dir.path().join("nested")).unwrap();
        let exports = store.exports_dir().unwrap();
        assert!(exports.is_dir());
        assert!(exports.starts_with(store.root()));
    }
}
