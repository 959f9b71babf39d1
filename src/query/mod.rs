pub mod ast;
pub mod builder;
pub mod matcher;
pub mod pagination;
