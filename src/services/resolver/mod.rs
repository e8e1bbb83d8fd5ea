//! Reference resolution: turns a keyed archive's object table into a single
//! owned tree with every UID replaced by the object it points at.

mod document;

pub use document::Document;

use crate::services::keyed_archive::bplist::{node_budget, MAX_NESTING};
use crate::services::keyed_archive::{KeyedArchive, ObjectTable, Value};
use crate::types::errors::ResolveError;
use std::collections::{BTreeMap, HashSet};

/// Resolve the object at `index` and everything it references.
///
/// A reference that re-enters an index already on the current path fails
/// with [`ResolveError::Cycle`]. Objects shared by several parents are
/// resolved once per use, up to a node budget sized from the table
/// ([`ResolveError::TooManyNodes`]).
pub fn resolve(table: &ObjectTable, index: usize) -> Result<Document, ResolveError> {
    Resolver::new(table).resolve_index(index, 0)
}

/// Resolve an archive from its `$top.root` object.
pub fn resolve_archive(archive: &KeyedArchive) -> Result<Document, ResolveError> {
    resolve(&archive.objects, archive.root)
}

struct Resolver<'a> {
    table: &'a ObjectTable,
    active: HashSet<usize>,
    resolved: usize,
    budget: usize,
}

impl<'a> Resolver<'a> {
    fn new(table: &'a ObjectTable) -> Self {
        let table_nodes: usize = table.iter().map(Value::node_count).sum();
        Self {
            table,
            active: HashSet::new(),
            resolved: 0,
            budget: node_budget(table_nodes),
        }
    }

    fn resolve_index(&mut self, index: usize, depth: usize) -> Result<Document, ResolveError> {
        let table = self.table;
        let value = table.get(index).ok_or(ResolveError::OutOfRange {
            index,
            len: table.len(),
        })?;

        if !self.active.insert(index) {
            return Err(ResolveError::Cycle { index });
        }
        let result = self.resolve_value(value, depth);
        self.active.remove(&index);
        result
    }

    fn resolve_value(&mut self, value: &Value, depth: usize) -> Result<Document, ResolveError> {
        if depth > MAX_NESTING {
            return Err(ResolveError::NestingTooDeep(MAX_NESTING));
        }
        self.resolved += 1;
        if self.resolved > self.budget {
            return Err(ResolveError::TooManyNodes(self.budget));
        }

        match value {
            Value::Reference(index) => self.resolve_index(*index, depth + 1),
            Value::Mapping(entries) => {
                // Resolve first; BTreeMap then orders the keys for output.
                let mut resolved = BTreeMap::new();
                for (key, child) in entries {
                    let child = self.resolve_value(child, depth + 1)?;
                    resolved.insert(key.clone(), child);
                }
                Ok(Document::Mapping(resolved))
            }
            Value::Sequence(items) => {
                let mut resolved = Vec::with_capacity(items.len());
                for item in items {
                    resolved.push(self.resolve_value(item, depth + 1)?);
                }
                Ok(Document::Sequence(resolved))
            }
            Value::ByteString(bytes) => Ok(Document::String(hex::encode(bytes))),
            Value::Null => Ok(Document::Null),
            Value::Bool(b) => Ok(Document::Bool(*b)),
            Value::Number(n) => Ok(Document::Number(*n)),
            Value::String(s) => Ok(Document::String(s.clone())),
        }
    }
}

#[cfg(test)]
#[path = "tests/resolver_tests.rs"]
mod tests;
