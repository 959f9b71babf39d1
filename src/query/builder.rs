use std::collections::{HashMap, HashSet};
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::model::Model;
use crate::core::types::{Record, Value};
use crate::mutation::engine;
use crate::query::ast::{Condition, ConditionBuilder, ConditionGroup, LogicalOp, Operator};
use crate::query::matcher::{compare_raw, RowMatcher};
use crate::query::pagination::{Paginated, Pagination};
use crate::schema::casts;
use crate::schema::schema::Schema;
use crate::table::handle::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Fluent query chain over one table. Stages always run in the same
/// order no matter how the chain was written: filter, stable multi-key
/// sort, offset/limit window, cast to records, eager relation load.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    model: Model,
    table: Table,
    conditions: ConditionGroup,
    orders: Vec<(String, SortOrder)>,
    limit: i64,
    offset: i64,
    eager: Vec<String>,
}

impl QueryBuilder {
    pub(crate) fn new(model: Model, table: Table) -> Self {
        QueryBuilder {
            model,
            table,
            conditions: ConditionGroup::default(),
            orders: Vec::new(),
            limit: -1,
            offset: 0,
            eager: Vec::new(),
        }
    }

    pub fn filter(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(LogicalOp::And, Condition::leaf(field, Operator::Eq, value.into()));
        self
    }

    pub fn filter_op(mut self, field: &str, op: Operator, value: impl Into<Value>) -> Self {
        self.conditions.push(LogicalOp::And, Condition::leaf(field, op, value.into()));
        self
    }

    pub fn or(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(LogicalOp::Or, Condition::leaf(field, Operator::Eq, value.into()));
        self
    }

    pub fn or_op(mut self, field: &str, op: Operator, value: impl Into<Value>) -> Self {
        self.conditions.push(LogicalOp::Or, Condition::leaf(field, op, value.into()));
        self
    }

    pub fn filter_in(mut self, field: &str, values: Vec<Value>) -> Self {
        self.conditions.push(LogicalOp::And, Condition::set(field, Operator::In, values));
        self
    }

    pub fn filter_not_in(mut self, field: &str, values: Vec<Value>) -> Self {
        self.conditions.push(LogicalOp::And, Condition::set(field, Operator::NotIn, values));
        self
    }

    /// Nested sub-tree, attached with AND at the current level.
    pub fn group(mut self, f: impl FnOnce(ConditionBuilder) -> ConditionBuilder) -> Self {
        let nested = f(ConditionBuilder::new()).build();
        self.conditions.push(LogicalOp::And, Condition::Group(nested));
        self
    }

    /// Nested sub-tree, attached with OR at the current level.
    pub fn or_group(mut self, f: impl FnOnce(ConditionBuilder) -> ConditionBuilder) -> Self {
        let nested = f(ConditionBuilder::new()).build();
        self.conditions.push(LogicalOp::Or, Condition::Group(nested));
        self
    }

    pub fn order_by(mut self, field: &str) -> Self {
        self.orders.push((field.to_string(), SortOrder::Asc));
        self
    }

    pub fn order_by_desc(mut self, field: &str) -> Self {
        self.orders.push((field.to_string(), SortOrder::Desc));
        self
    }

    /// -1 means unbounded. Validated when the chain executes.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Request eager loading for registered relations before the result
    /// set materializes.
    pub fn with(mut self, relations: &[&str]) -> Self {
        self.eager.extend(relations.iter().map(|s| s.to_string()));
        self
    }

    pub fn get(self) -> Result<Vec<Record>> {
        self.run()
    }

    pub fn first(mut self) -> Result<Record> {
        self.limit = 1;
        self.run()?.into_iter().next().ok_or_else(|| {
            Error::new(ErrorKind::NotFound, "no record matched the query".to_string())
        })
    }

    pub fn find(self, id: impl Into<Value>) -> Result<Record> {
        let pk = self.table.primary_key()?;
        self.filter(&pk, id.into()).first()
    }

    /// Cardinality of the filter stage alone; sort and window are skipped.
    pub fn count(self) -> Result<u64> {
        self.validate_window()?;
        Ok(self.filtered()?.1.len() as u64)
    }

    pub fn exists(self) -> Result<bool> {
        Ok(self.count()? > 0)
    }

    /// Project a single column out of the full pipeline's results. The
    /// column is checked against the table header up front.
    pub fn pluck(self, column: &str) -> Result<Vec<Value>> {
        self.table.schema()?.require(column)?;
        let records = self.run()?;
        Ok(records
            .iter()
            .map(|r| r.get(column).cloned().unwrap_or(Value::Null))
            .collect())
    }

    /// Cut one page out of the filtered set. The page number is an
    /// explicit argument; the total is recomputed on every call.
    pub fn paginate(mut self, page: u64, per_page: i64) -> Result<Paginated> {
        if per_page < 1 {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("per_page must be at least 1, got {}", per_page),
            ));
        }
        let total = self.filtered()?.1.len() as u64;
        let state = Pagination::new(page, per_page as u64, total);
        self.offset = state.offset as i64;
        self.limit = per_page;
        let items = self.run()?;
        Ok(Paginated { items, state })
    }

    /// Merge `values` into every row of the result set. Returns the
    /// affected row count.
    pub fn update(self, values: HashMap<String, Value>) -> Result<usize> {
        let ids = self.result_ids()?;
        engine::update(&self.table, &ids, &values)
    }

    /// Drop every row of the result set. Returns the affected row count.
    pub fn delete(self) -> Result<usize> {
        let ids = self.result_ids()?;
        engine::delete(&self.table, &ids)
    }

    fn run(&self) -> Result<Vec<Record>> {
        let (schema, rows) = self.windowed()?;
        let mut records = rows
            .iter()
            .map(|row| casts::to_record(&schema, self.model.casts(), row))
            .collect::<Result<Vec<Record>>>()?;
        if !self.eager.is_empty() {
            crate::relation::resolver::eager_load(&self.model, &self.eager, &mut records)?;
        }
        Ok(records)
    }

    /// Primary-key set of the windowed result, fed to the mutation engine.
    fn result_ids(&self) -> Result<HashSet<String>> {
        let (_, rows) = self.windowed()?;
        Ok(rows.into_iter().map(|mut row| row.remove(0)).collect())
    }

    fn windowed(&self) -> Result<(Schema, Vec<Vec<String>>)> {
        self.validate_window()?;
        let (schema, mut rows) = self.filtered()?;
        self.sort_rows(&schema, &mut rows)?;

        let offset = self.offset as usize;
        let rows: Vec<Vec<String>> = if self.limit >= 0 {
            rows.into_iter().skip(offset).take(self.limit as usize).collect()
        } else {
            rows.into_iter().skip(offset).collect()
        };
        Ok((schema, rows))
    }

    fn filtered(&self) -> Result<(Schema, Vec<Vec<String>>)> {
        let (schema, rows) = self.table.load()?;
        let matcher = RowMatcher::new(&schema);
        let mut kept = Vec::new();
        for row in rows {
            if matcher.matches(&row, &self.conditions)? {
                kept.push(row);
            }
        }
        Ok((schema, kept))
    }

    /// Stable multi-key sort over the raw cell values: the first key
    /// decides, later keys break remaining ties.
    fn sort_rows(&self, schema: &Schema, rows: &mut [Vec<String>]) -> Result<()> {
        if self.orders.is_empty() {
            return Ok(());
        }
        let mut keys = Vec::with_capacity(self.orders.len());
        for (field, order) in &self.orders {
            keys.push((schema.require(field)?, *order));
        }
        rows.sort_by(|a, b| {
            for (pos, order) in &keys {
                let cmp = compare_raw(&a[*pos], &b[*pos]);
                let cmp = match order {
                    SortOrder::Asc => cmp,
                    SortOrder::Desc => cmp.reverse(),
                };
                if cmp != std::cmp::Ordering::Equal {
                    return cmp;
                }
            }
            std::cmp::Ordering::Equal
        });
        Ok(())
    }

    fn validate_window(&self) -> Result<()> {
        if self.limit < -1 {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("limit must be -1 or greater, got {}", self.limit),
            ));
        }
        if self.offset < 0 {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("offset must not be negative, got {}", self.offset),
            ));
        }
        Ok(())
    }
}
