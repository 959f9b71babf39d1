use std::collections::HashSet;
use serde::{Serialize, Deserialize};
use crate::core::types::Value;

/// Leaf comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    In,
    NotIn,
    Like,
    NotLike,
    Lax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

/// Right-hand side of a leaf, pre-encoded to the raw cell form.
/// `Many` is a flipped set so membership checks are O(1) per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CondValue {
    One(String),
    Many(HashSet<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    pub field: String,
    pub op: Operator,
    pub value: CondValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    Leaf(Leaf),
    Group(ConditionGroup),
}

impl Condition {
    pub fn leaf(field: &str, op: Operator, value: Value) -> Self {
        Condition::Leaf(Leaf {
            field: field.to_string(),
            op,
            value: CondValue::One(value.to_raw()),
        })
    }

    pub fn set(field: &str, op: Operator, values: Vec<Value>) -> Self {
        Condition::Leaf(Leaf {
            field: field.to_string(),
            op,
            value: CondValue::Many(values.iter().map(Value::to_raw).collect()),
        })
    }
}

/// One nesting level of a WHERE tree. Children carry the logical
/// operator that attaches them to the running result, so evaluation
/// folds left-to-right like the fluent chain reads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConditionGroup {
    pub children: Vec<(LogicalOp, Condition)>,
}

impl ConditionGroup {
    pub fn push(&mut self, logic: LogicalOp, cond: Condition) {
        self.children.push((logic, cond));
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Builder for a nested sub-tree, handed to `group`/`or_group`
/// closures on the query builder.
#[derive(Debug, Default)]
pub struct ConditionBuilder {
    group: ConditionGroup,
}

impl ConditionBuilder {
    pub fn new() -> Self {
        ConditionBuilder::default()
    }

    pub fn filter(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.group.push(LogicalOp::And, Condition::leaf(field, Operator::Eq, value.into()));
        self
    }

    pub fn filter_op(mut self, field: &str, op: Operator, value: impl Into<Value>) -> Self {
        self.group.push(LogicalOp::And, Condition::leaf(field, op, value.into()));
        self
    }

    pub fn or(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.group.push(LogicalOp::Or, Condition::leaf(field, Operator::Eq, value.into()));
        self
    }

    pub fn or_op(mut self, field: &str, op: Operator, value: impl Into<Value>) -> Self {
        self.group.push(LogicalOp::Or, Condition::leaf(field, op, value.into()));
        self
    }

    pub fn filter_in(mut self, field: &str, values: Vec<Value>) -> Self {
        self.group.push(LogicalOp::And, Condition::set(field, Operator::In, values));
        self
    }

    pub fn filter_not_in(mut self, field: &str, values: Vec<Value>) -> Self {
        self.group.push(LogicalOp::And, Condition::set(field, Operator::NotIn, values));
        self
    }

    pub fn group(mut self, f: impl FnOnce(ConditionBuilder) -> ConditionBuilder) -> Self {
        let nested = f(ConditionBuilder::new()).build();
        self.group.push(LogicalOp::And, Condition::Group(nested));
        self
    }

    pub fn or_group(mut self, f: impl FnOnce(ConditionBuilder) -> ConditionBuilder) -> Self {
        let nested = f(ConditionBuilder::new()).build();
        self.group.push(LogicalOp::Or, Condition::Group(nested));
        self
    }

    pub fn build(self) -> ConditionGroup {
        self.group
    }
}
