//! Configuration Store
//!
//! The configuration scope persists across sessions through a pluggable
//! store. The store only decides where the bytes live; the JSON encoding of
//! the scope itself is owned by `Environment::load_from`/`write_to`. The
//! default store is the `.{prefix}_vars` dotfile; a missing or empty file is
//! not an error.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

/// Where configuration variables are loaded from and saved to.
pub trait ConfigStore {
    /// A reader over the stored bytes, or `None` when nothing is stored yet.
    fn open_load(&self) -> io::Result<Option<Box<dyn Read>>>;

    /// A writer that replaces the stored bytes.
    fn open_save(&self) -> io::Result<Box<dyn Write>>;
}

/// The dotfile-backed default.
pub struct FileVarsStore {
    path: PathBuf,
}

impl FileVarsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl ConfigStore for FileVarsStore {
    fn open_load(&self) -> io::Result<Option<Box<dyn Read>>> {
        match File::open(&self.path) {
            Ok(file) => Ok(Some(Box::new(file))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn open_save(&self) -> io::Result<Box<dyn Write>> {
        Ok(Box::new(File::create(&self.path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::environment::Environment;

    #[test]
    fn test_missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileVarsStore::new(dir.path().join(".app_vars"));
        assert!(store.open_load().unwrap().is_none());
    }

    #[test]
    fn test_round_trip_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileVarsStore::new(dir.path().join(".app_vars"));

        let mut env = Environment::new("app-env", "");
        env.bind("color", "green");
        let mut writer = store.open_save().unwrap();
        env.write_to(0, writer.as_mut()).unwrap();
        drop(writer);

        let mut fresh = Environment::new("app-env", "");
        let mut reader = store.open_load().unwrap().unwrap();
        fresh.load_from(0, reader.as_mut()).unwrap();
        assert_eq!(fresh.get("color"), "green");
    }

    #[test]
    fn test_empty_file_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".app_vars");
        std::fs::write(&path, "").unwrap();
        let store = FileVarsStore::new(path);

        let mut env = Environment::new("app-env", "");
        let mut reader = store.open_load().unwrap().unwrap();
        env.load_from(0, reader.as_mut()).unwrap();
    }
}
