//! Detect unresolved [`Required`](crate::Required) placeholders anywhere in a
//! configuration tree.
//!
//! The walk dispatches on the shape of each node:
//!
//! - a `Required` marker is found immediately;
//! - a `(key, value)` pair recurses into the value and, on a hit, records the
//!   key;
//! - a mapping is walked as its ordered `(key, value)` pairs;
//! - a string is never required;
//! - a sequence is walked element by element and stops at the first hit;
//! - a registry is walked through its flattened snapshot;
//! - every other scalar is not required.
//!
//! Keys are recorded innermost first as the recursion unwinds, so the dotted
//! location is the path reversed: `["host", "net"]` reads `net.host`.

use crate::config::Config;
use crate::error::SectionalError;
use crate::section::Section;
use crate::value::{Map, Value};

/// A node that can be searched for required placeholders.
pub trait Inspect {
    /// Return `true` on the first placeholder found, pushing the keys that
    /// lead to it onto `path`, innermost first.
    fn find_required(&self, path: &mut Vec<String>) -> bool;
}

impl<T: Inspect + ?Sized> Inspect for &T {
    fn find_required(&self, path: &mut Vec<String>) -> bool {
        (**self).find_required(path)
    }
}

impl Inspect for Value {
    fn find_required(&self, path: &mut Vec<String>) -> bool {
        match self {
            Value::Required => true,
            Value::Mapping(map) => map.find_required(path),
            Value::String(_) => false,
            Value::Sequence(items) => items.find_required(path),
            Value::Null | Value::Bool(_) | Value::Integer(_) | Value::Float(_) => false,
        }
    }
}

impl<K: AsRef<str>, V: Inspect> Inspect for (K, V) {
    fn find_required(&self, path: &mut Vec<String>) -> bool {
        let found = self.1.find_required(path);
        if found {
            path.push(self.0.as_ref().to_string());
        }
        found
    }
}

impl Inspect for Map {
    fn find_required(&self, path: &mut Vec<String>) -> bool {
        self.iter().any(|pair| pair.find_required(path))
    }
}

impl<T: Inspect> Inspect for [T] {
    fn find_required(&self, path: &mut Vec<String>) -> bool {
        self.iter().any(|item| item.find_required(path))
    }
}

impl<T: Inspect> Inspect for Vec<T> {
    fn find_required(&self, path: &mut Vec<String>) -> bool {
        self.as_slice().find_required(path)
    }
}

impl Inspect for str {
    fn find_required(&self, _path: &mut Vec<String>) -> bool {
        false
    }
}

impl Inspect for String {
    fn find_required(&self, _path: &mut Vec<String>) -> bool {
        false
    }
}

impl Inspect for Section {
    fn find_required(&self, path: &mut Vec<String>) -> bool {
        self.defaults().find_required(path)
    }
}

impl Inspect for Config {
    fn find_required(&self, path: &mut Vec<String>) -> bool {
        self.flatten().find_required(path)
    }
}

/// Outcome of [`check_required`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detection {
    pub required: bool,
    /// Keys leading to the first placeholder, innermost first.
    pub path: Vec<String>,
}

impl Detection {
    /// The dotted location, outermost first (`net.host`).
    pub fn location(&self) -> String {
        let segments: Vec<&str> = self.path.iter().rev().map(String::as_str).collect();
        segments.join(".")
    }
}

/// Search `tree` for a required placeholder.
///
/// With `raise_on_detect`, a hit becomes [`SectionalError::Required`]
/// carrying the dotted location. Without it, the [`Detection`] is returned
/// either way. Only the first placeholder, depth first in declaration order,
/// is reported.
pub fn check_required<T: Inspect + ?Sized>(
    tree: &T,
    raise_on_detect: bool,
) -> Result<Detection, SectionalError> {
    let mut path = Vec::new();
    let required = tree.find_required(&mut path);
    let detection = Detection { required, path };
    if detection.required && raise_on_detect {
        return Err(SectionalError::Required {
            path: detection.location(),
        });
    }
    Ok(detection)
}
