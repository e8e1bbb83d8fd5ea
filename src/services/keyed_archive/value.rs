use serde::Serialize;

/// Numeric payload of a decoded plist integer or real.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    /// Only for integers above `i64::MAX`.
    UInt(u64),
    Real(f64),
}

/// One decoded plist value. `Reference` is an index into the [`ObjectTable`]
/// that produced it, never an owning pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    ByteString(Vec<u8>),
    Reference(usize),
    /// Entries in archive order.
    Mapping(Vec<(String, Value)>),
    Sequence(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up a key in a `Mapping`; the last entry wins on duplicates.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Mapping(entries) => entries
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Number of values in this tree, itself included.
    pub(crate) fn node_count(&self) -> usize {
        match self {
            Value::Mapping(entries) => {
                1 + entries.iter().map(|(_, v)| v.node_count()).sum::<usize>()
            }
            Value::Sequence(items) => 1 + items.iter().map(Value::node_count).sum::<usize>(),
            _ => 1,
        }
    }

    /// Calls `f` on every `Reference` index reachable inline from this value.
    pub(crate) fn for_each_reference(&self, f: &mut impl FnMut(usize)) {
        match self {
            Value::Reference(index) => f(*index),
            Value::Mapping(entries) => {
                for (_, v) in entries {
                    v.for_each_reference(f);
                }
            }
            Value::Sequence(items) => {
                for v in items {
                    v.for_each_reference(f);
                }
            }
            Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::String(_)
            | Value::ByteString(_) => {}
        }
    }
}

/// The flat `$objects` table of a keyed archive. Owns every value by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectTable {
    objects: Vec<Value>,
}

impl ObjectTable {
    pub fn new(objects: Vec<Value>) -> Self {
        Self { objects }
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.objects.get(index)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.objects.iter()
    }
}

impl From<Vec<Value>> for ObjectTable {
    fn from(objects: Vec<Value>) -> Self {
        Self::new(objects)
    }
}

/// A decoded keyed archive: object table plus the index of the graph root.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedArchive {
    pub objects: ObjectTable,
    pub root: usize,
}
