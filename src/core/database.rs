use std::path::PathBuf;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::model::Model;
use crate::migration::engine::{self as migration, TableChange};

/// Entry point owning the configuration: hands out model handles by
/// table name and forwards table-level migrations. There is no
/// connection pool and no cross-request cache; every handle reopens
/// its file.
#[derive(Debug, Clone)]
pub struct Database {
    config: Config,
}

impl Database {
    pub fn open(config: Config) -> Result<Self> {
        std::fs::create_dir_all(&config.base_dir)?;
        Ok(Database { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A plain model handle for `name`; casts and relations are layered
    /// on by the caller.
    pub fn model(&self, name: &str) -> Model {
        Model::new(name, self.table_path(name)).with_delimiter(self.config.delimiter)
    }

    pub fn create_table(&self, name: &str, columns: &[&str]) -> Result<()> {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        migration::create_table(&self.table_path(name), self.config.delimiter, &columns)
    }

    pub fn delete_table(&self, name: &str) -> Result<()> {
        migration::delete_table(&self.table_path(name))
    }

    /// Apply batched column operations to one table.
    pub fn change_table(
        &self,
        name: &str,
        f: impl FnOnce(TableChange) -> TableChange,
    ) -> Result<()> {
        let table = self.model(name).table()?;
        f(TableChange::new()).apply(&table)
    }

    fn table_path(&self, name: &str) -> PathBuf {
        self.config
            .base_dir
            .join(format!("{}.{}", name, self.config.extension))
    }
}
