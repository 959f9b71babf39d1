use std::cmp::Ordering;
use crate::core::error::Result;
use crate::query::ast::{CondValue, Condition, ConditionGroup, Leaf, LogicalOp, Operator};
use crate::schema::schema::Schema;

/// Evaluates a raw row against a condition tree. Pure: no side effects,
/// deterministic left-to-right child order. An unknown column is an
/// error, not a non-match.
pub struct RowMatcher<'a> {
    schema: &'a Schema,
}

impl<'a> RowMatcher<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        RowMatcher { schema }
    }

    pub fn matches(&self, row: &[String], group: &ConditionGroup) -> Result<bool> {
        let mut acc = true;
        for (i, (logic, cond)) in group.children.iter().enumerate() {
            // Every child is evaluated so a bad column reference always
            // surfaces, regardless of where it sits in the chain.
            let hit = self.eval(row, cond)?;
            if i == 0 {
                acc = hit;
            } else {
                match logic {
                    LogicalOp::And => acc = acc && hit,
                    LogicalOp::Or => acc = acc || hit,
                }
            }
        }
        Ok(acc)
    }

    fn eval(&self, row: &[String], cond: &Condition) -> Result<bool> {
        match cond {
            Condition::Group(group) => self.matches(row, group),
            Condition::Leaf(leaf) => self.eval_leaf(row, leaf),
        }
    }

    fn eval_leaf(&self, row: &[String], leaf: &Leaf) -> Result<bool> {
        let pos = self.schema.require(&leaf.field)?;
        let cell = row.get(pos).map(String::as_str).unwrap_or("");

        let hit = match (&leaf.op, &leaf.value) {
            (Operator::Eq, CondValue::One(v)) => cell == v,
            (Operator::Ne, CondValue::One(v)) => cell != v,
            (Operator::Lax, CondValue::One(v)) => {
                cell.to_lowercase() == v.to_lowercase()
            }
            (Operator::Gt, CondValue::One(v)) => {
                compare_raw(cell, v) == Ordering::Greater
            }
            (Operator::Ge, CondValue::One(v)) => {
                compare_raw(cell, v) != Ordering::Less
            }
            (Operator::Lt, CondValue::One(v)) => {
                compare_raw(cell, v) == Ordering::Less
            }
            (Operator::Le, CondValue::One(v)) => {
                compare_raw(cell, v) != Ordering::Greater
            }
            (Operator::In, CondValue::Many(set)) => set.contains(cell),
            (Operator::NotIn, CondValue::Many(set)) => !set.contains(cell),
            (Operator::Like, CondValue::One(pattern)) => like_match(cell, pattern),
            (Operator::NotLike, CondValue::One(pattern)) => !like_match(cell, pattern),
            // In/NotIn built through the public constructors always
            // carry a set; a single value degrades to membership of one.
            (Operator::In, CondValue::One(v)) => cell == v,
            (Operator::NotIn, CondValue::One(v)) => cell != v,
            (_, CondValue::Many(set)) => set.contains(cell),
        };
        Ok(hit)
    }
}

/// Raw cell ordering: numeric when both sides parse as numbers,
/// lexicographic otherwise. Shared by range operators and the sort stage.
pub fn compare_raw(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

/// SQL-style LIKE reduced to its three shapes: `%x%` substring, `x%`
/// prefix, `%x` suffix. A bare term behaves as `%term%`. Matching is
/// case-insensitive; the empty pattern never matches.
pub fn like_match(cell: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }
    let cell = cell.to_lowercase();
    let pattern = pattern.to_lowercase();

    let mut core = pattern.as_str();
    let leading = core.starts_with('%');
    if leading {
        core = &core[1..];
    }
    let trailing = core.ends_with('%');
    if trailing {
        core = &core[..core.len() - 1];
    }

    match (leading, trailing) {
        (true, false) => cell.ends_with(core),
        (false, true) => cell.starts_with(core),
        // Bare term and %term% both mean substring
        _ => cell.contains(core),
    }
}
