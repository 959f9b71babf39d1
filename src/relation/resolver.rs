use std::collections::HashMap;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::model::Model;
use crate::core::types::{Record, Value};
use crate::relation::{snake_case, Relation, RelationKind};

/// Resolve a relation for a single record: one independent filtered
/// query per call. Batched resolution for whole result sets lives in
/// `eager_load`.
pub fn resolve(owner: &Model, record: &Record, name: &str) -> Result<Vec<Record>> {
    let rel = require_relation(owner, name)?;
    let local = local_key(owner, rel)?;
    let value = match record.get(&local) {
        Some(v) if !v.is_null() => v.clone(),
        _ => return Ok(Vec::new()),
    };

    match rel.kind {
        RelationKind::HasOne => {
            let fk = foreign_key(owner, rel)?;
            rel.target.query()?.filter(&fk, value).limit(1).get()
        }
        RelationKind::HasMany => {
            let fk = foreign_key(owner, rel)?;
            rel.target.query()?.filter(&fk, value).get()
        }
        RelationKind::HasManyThrough => {
            let through = require_through(rel)?;
            let fk = foreign_key(owner, rel)?;
            let second_local = second_local_key(rel, through)?;
            let second_foreign = second_foreign_key(rel, through)?;

            let links = through.query()?.filter(&fk, value).get()?;
            let keys: Vec<Value> = links
                .iter()
                .filter_map(|link| link.get(&second_local))
                .filter(|v| !v.is_null())
                .cloned()
                .collect();
            if keys.is_empty() {
                return Ok(Vec::new());
            }
            rel.target.query()?.filter_in(&second_foreign, keys).get()
        }
    }
}

/// Batched resolution for an already-materialized result set: for each
/// requested relation, one `filter_in` query over the distinct local
/// keys, then distribution back per row. Query count is bounded by the
/// number of relations, not the number of rows.
pub fn eager_load(owner: &Model, names: &[String], records: &mut [Record]) -> Result<()> {
    for name in names {
        let rel = require_relation(owner, name)?;
        match rel.kind {
            RelationKind::HasOne | RelationKind::HasMany => {
                eager_direct(owner, name, rel, records)?;
            }
            RelationKind::HasManyThrough => {
                eager_through(owner, name, rel, records)?;
            }
        }
    }
    Ok(())
}

fn eager_direct(owner: &Model, name: &str, rel: &Relation, records: &mut [Record]) -> Result<()> {
    let local = local_key(owner, rel)?;
    let fk = foreign_key(owner, rel)?;

    let locals = distinct_values(records, &local);
    let related = if locals.is_empty() {
        Vec::new()
    } else {
        rel.target.query()?.filter_in(&fk, locals).get()?
    };

    // Bucket related rows by their foreign-key cell
    let mut buckets: HashMap<String, Vec<Record>> = HashMap::new();
    for rec in related {
        let key = raw_attr(&rec, &fk);
        buckets.entry(key).or_default().push(rec);
    }

    for record in records.iter_mut() {
        let key = raw_attr(record, &local);
        let mut matched = buckets.get(&key).cloned().unwrap_or_default();
        if rel.kind == RelationKind::HasOne {
            matched.truncate(1);
        }
        record.set_related(name, matched);
    }
    Ok(())
}

fn eager_through(owner: &Model, name: &str, rel: &Relation, records: &mut [Record]) -> Result<()> {
    let through = require_through(rel)?;
    let local = local_key(owner, rel)?;
    let fk = foreign_key(owner, rel)?;
    let second_local = second_local_key(rel, through)?;
    let second_foreign = second_foreign_key(rel, through)?;

    let locals = distinct_values(records, &local);
    let links = if locals.is_empty() {
        Vec::new()
    } else {
        through.query()?.filter_in(&fk, locals).get()?
    };

    // local key -> the through rows' second keys. Duplicate links from
    // one parent to the same second key count once, matching the set
    // semantics of the lazy path's filter_in.
    let mut link_map: HashMap<String, Vec<String>> = HashMap::new();
    let mut second_keys: Vec<Value> = Vec::new();
    for link in &links {
        let second = raw_attr(link, &second_local);
        if second.is_empty() {
            continue;
        }
        let seconds = link_map.entry(raw_attr(link, &fk)).or_default();
        if !seconds.contains(&second) {
            seconds.push(second.clone());
            second_keys.push(Value::Text(second));
        }
    }

    let targets = if second_keys.is_empty() {
        Vec::new()
    } else {
        rel.target.query()?.filter_in(&second_foreign, second_keys).get()?
    };

    let mut buckets: HashMap<String, Vec<Record>> = HashMap::new();
    for rec in targets {
        buckets.entry(raw_attr(&rec, &second_foreign)).or_default().push(rec);
    }

    for record in records.iter_mut() {
        let key = raw_attr(record, &local);
        let mut matched = Vec::new();
        if let Some(seconds) = link_map.get(&key) {
            for second in seconds {
                if let Some(found) = buckets.get(second) {
                    matched.extend(found.iter().cloned());
                }
            }
        }
        record.set_related(name, matched);
    }
    Ok(())
}

fn require_relation<'a>(owner: &'a Model, name: &str) -> Result<&'a Relation> {
    owner.relation(name).ok_or_else(|| {
        Error::new(
            ErrorKind::NotFound,
            format!("relation '{}' is not registered on model '{}'", name, owner.name()),
        )
    })
}

fn require_through(rel: &Relation) -> Result<&Model> {
    rel.through.as_ref().ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidArgument,
            "through-relation declared without a through model".to_string(),
        )
    })
}

fn local_key(owner: &Model, rel: &Relation) -> Result<String> {
    match &rel.local_key {
        Some(key) => Ok(key.clone()),
        None => owner.primary_key(),
    }
}

fn foreign_key(owner: &Model, rel: &Relation) -> Result<String> {
    match &rel.foreign_key {
        Some(key) => Ok(key.clone()),
        None => Ok(format!("{}_{}", snake_case(owner.name()), owner.primary_key()?)),
    }
}

fn second_local_key(rel: &Relation, through: &Model) -> Result<String> {
    match &rel.second_local_key {
        Some(key) => Ok(key.clone()),
        None => through.primary_key(),
    }
}

fn second_foreign_key(rel: &Relation, through: &Model) -> Result<String> {
    match &rel.second_foreign_key {
        Some(key) => Ok(key.clone()),
        None => Ok(format!("{}_{}", snake_case(through.name()), through.primary_key()?)),
    }
}

fn raw_attr(record: &Record, column: &str) -> String {
    record.get(column).map(Value::to_raw).unwrap_or_default()
}

/// Distinct non-null local-key cells across the result set, raw-encoded.
fn distinct_values(records: &[Record], column: &str) -> Vec<Value> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for record in records {
        let raw = raw_attr(record, column);
        if !raw.is_empty() && seen.insert(raw.clone()) {
            out.push(Value::Text(raw));
        }
    }
    out
}
