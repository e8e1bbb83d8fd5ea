//! Keyed-archive decoding.
//!
//! A keyed archive is a binary plist whose top level holds a flat object
//! table (`$objects`) and a `$top` dictionary pointing at the graph root.
//! Composite objects refer to each other by UID, i.e. by index into the
//! object table.

pub mod bplist;
mod value;

pub use value::{KeyedArchive, Number, ObjectTable, Value};

use crate::types::errors::DecodeError;

const OBJECTS_KEY: &str = "$objects";
const TOP_KEY: &str = "$top";
const ROOT_KEY: &str = "root";

/// Decode the raw bytes of one `.archive` member.
pub fn decode(data: &[u8]) -> Result<KeyedArchive, DecodeError> {
    let top = bplist::parse(data)?;
    unpack(top)
}

/// Split an already-parsed plist into object table and root index.
///
/// Every UID in the table, and the root itself, must index into the table.
pub fn unpack(top: Value) -> Result<KeyedArchive, DecodeError> {
    let Value::Mapping(entries) = top else {
        return Err(DecodeError::NotKeyedArchive(
            "top level is not a dictionary".into(),
        ));
    };

    let mut objects = None;
    let mut top_dict = None;
    for (key, value) in entries {
        match key.as_str() {
            OBJECTS_KEY => objects = Some(value),
            TOP_KEY => top_dict = Some(value),
            _ => {}
        }
    }

    let objects = match objects {
        Some(Value::Sequence(items)) => ObjectTable::new(items),
        Some(_) => {
            return Err(DecodeError::NotKeyedArchive(format!(
                "{OBJECTS_KEY} is not an array"
            )))
        }
        None => return Err(DecodeError::NotKeyedArchive(format!("missing {OBJECTS_KEY}"))),
    };

    let root = match top_dict.as_ref().and_then(|t| t.get(ROOT_KEY)) {
        Some(Value::Reference(index)) => *index,
        Some(_) => {
            return Err(DecodeError::NotKeyedArchive(format!(
                "{TOP_KEY}.{ROOT_KEY} is not a UID"
            )))
        }
        None => {
            return Err(DecodeError::NotKeyedArchive(format!(
                "missing {TOP_KEY}.{ROOT_KEY}"
            )))
        }
    };

    check_references(&objects, root)?;
    Ok(KeyedArchive { objects, root })
}

fn check_references(objects: &ObjectTable, root: usize) -> Result<(), DecodeError> {
    let len = objects.len();
    let mut dangling = None;

    if root >= len {
        dangling = Some(root);
    }
    for value in objects.iter() {
        if dangling.is_some() {
            break;
        }
        value.for_each_reference(&mut |index| {
            if index >= len && dangling.is_none() {
                dangling = Some(index);
            }
        });
    }

    match dangling {
        Some(index) => Err(DecodeError::DanglingReference { index, len }),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "tests/bplist_tests.rs"]
mod bplist_tests;

#[cfg(test)]
#[path = "tests/archive_tests.rs"]
mod archive_tests;
