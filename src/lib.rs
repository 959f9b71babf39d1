pub mod core;
pub mod migration;
pub mod mutation;
pub mod query;
pub mod relation;
pub mod schema;
pub mod table;

pub use crate::core::config::Config;
pub use crate::core::database::Database;
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::model::Model;
pub use crate::core::types::{Record, Value};
pub use crate::query::ast::Operator;
pub use crate::query::builder::{QueryBuilder, SortOrder};
pub use crate::query::pagination::{Paginated, Pagination};
pub use crate::relation::Relation;
pub use crate::schema::casts::Cast;
