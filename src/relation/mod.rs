pub mod resolver;

use serde::{Serialize, Deserialize};
use crate::core::model::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    HasOne,
    HasMany,
    HasManyThrough,
}

/// Declared link between two models, held in the owning model's
/// explicit registry. Key overrides are optional; defaults are
/// inferred at resolution time (local key = owner's primary key,
/// foreign key = `<snake_case owner name>_<primary key name>`).
#[derive(Debug, Clone)]
pub struct Relation {
    pub kind: RelationKind,
    pub target: Model,
    pub through: Option<Model>,
    pub foreign_key: Option<String>,
    pub local_key: Option<String>,
    pub second_foreign_key: Option<String>,
    pub second_local_key: Option<String>,
}

impl Relation {
    pub fn has_one(target: Model) -> Self {
        Relation::new(RelationKind::HasOne, target, None)
    }

    pub fn has_many(target: Model) -> Self {
        Relation::new(RelationKind::HasMany, target, None)
    }

    pub fn has_many_through(target: Model, through: Model) -> Self {
        Relation::new(RelationKind::HasManyThrough, target, Some(through))
    }

    fn new(kind: RelationKind, target: Model, through: Option<Model>) -> Self {
        Relation {
            kind,
            target,
            through,
            foreign_key: None,
            local_key: None,
            second_foreign_key: None,
            second_local_key: None,
        }
    }

    pub fn with_foreign_key(mut self, key: &str) -> Self {
        self.foreign_key = Some(key.to_string());
        self
    }

    pub fn with_local_key(mut self, key: &str) -> Self {
        self.local_key = Some(key.to_string());
        self
    }

    /// Foreign key on the final target of a through-relation.
    pub fn with_second_foreign_key(mut self, key: &str) -> Self {
        self.second_foreign_key = Some(key.to_string());
        self
    }

    /// Key on the through table whose values select the final target.
    pub fn with_second_local_key(mut self, key: &str) -> Self {
        self.second_local_key = Some(key.to_string());
        self
    }
}

/// `UserProfile` -> `user_profile`, `users` -> `users`.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_names() {
        assert_eq!(snake_case("User"), "user");
        assert_eq!(snake_case("UserProfile"), "user_profile");
        assert_eq!(snake_case("users"), "users");
    }
}
