use std::path::PathBuf;

use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub data_directory: PathBuf,
    pub restore: bool,
}

// Implements: https://rust-unofficial.github.io/patterns/patterns/creational/builder.html
impl DatabaseOptions {
    /// Location of the transaction log. Reads / writes to this directory
    pub fn set_data_directory(mut self, data_directory: PathBuf) -> Self {
        self.data_directory = data_directory;
        self
    }

    /// Defines whether we should attempt to restore the database from the
    /// transaction log on startup
    pub fn set_restore(mut self, restore: bool) -> Self {
        self.restore = restore;
        self
    }

    /// Fresh database in a throwaway directory, used by tests across crates
    pub fn new_test() -> Self {
        let database_dir: PathBuf = ["/", "tmp", "persondb", &Uuid::new_v4().to_string()]
            .iter()
            .collect();

        DatabaseOptions::default()
            .set_data_directory(database_dir)
            .set_restore(false)
    }
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        // Defaults to $CWD/data
        Self {
            data_directory: PathBuf::from("data"),
            restore: true,
        }
    }
}
