pub mod casts;
pub mod schema;
