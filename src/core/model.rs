use std::collections::HashMap;
use std::path::{Path, PathBuf};
use crate::core::error::Result;
use crate::core::types::{Record, Value};
use crate::mutation::engine;
use crate::query::builder::QueryBuilder;
use crate::relation::{resolver, Relation};
use crate::schema::casts::Cast;
use crate::table::handle::Table;

/// Declaration of one table-backed model: a named file handle plus the
/// cast directives and the explicit relation registry. Relations are
/// registered by name, never discovered by reflection.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    path: PathBuf,
    delimiter: char,
    casts: HashMap<String, Cast>,
    relations: HashMap<String, Relation>,
}

impl Model {
    pub fn new(name: &str, path: impl Into<PathBuf>) -> Self {
        Model {
            name: name.to_string(),
            path: path.into(),
            delimiter: ',',
            casts: HashMap::new(),
            relations: HashMap::new(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Declare an explicit cast for one column.
    pub fn cast(mut self, column: &str, cast: Cast) -> Self {
        self.casts.insert(column.to_string(), cast);
        self
    }

    /// Register a named relation.
    pub fn relate(mut self, name: &str, relation: Relation) -> Self {
        self.relations.insert(name.to_string(), relation);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn casts(&self) -> &HashMap<String, Cast> {
        &self.casts
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    pub fn table(&self) -> Result<Table> {
        Table::open(&self.path, self.delimiter)
    }

    pub fn primary_key(&self) -> Result<String> {
        self.table()?.primary_key()
    }

    /// Start a query chain. The file is reopened and the header reread
    /// for every chain; nothing is cached across chains.
    pub fn query(&self) -> Result<QueryBuilder> {
        Ok(QueryBuilder::new(self.clone(), self.table()?))
    }

    pub fn find(&self, id: impl Into<Value>) -> Result<Record> {
        self.query()?.find(id)
    }

    pub fn create(&self, values: HashMap<String, Value>) -> Result<Record> {
        engine::create(&self.table()?, &self.casts, &values)
    }

    /// Persist a record's in-memory attributes over the row with the
    /// same primary key.
    pub fn save(&self, record: &Record) -> Result<()> {
        engine::save(&self.table()?, record)
    }

    pub fn truncate(&self) -> Result<()> {
        engine::truncate(&self.table()?)
    }

    /// Lazy relation access: one filtered query per call.
    pub fn related(&self, record: &Record, name: &str) -> Result<Vec<Record>> {
        resolver::resolve(self, record, name)
    }

    /// Lazy has-one access: the first match, or an empty record.
    pub fn related_one(&self, record: &Record, name: &str) -> Result<Record> {
        Ok(resolver::resolve(self, record, name)?
            .into_iter()
            .next()
            .unwrap_or_default())
    }
}
