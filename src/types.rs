//! Declared field types and the introspection that turns them into flag shapes.
//!
//! A field's type is an explicit descriptor: a [`Primitive`] leaf, possibly
//! wrapped in `Optional` and `Sequence` layers. [`FieldType::unwrap_leaf`]
//! peels the wrappers off and reports them outermost first, which is all the
//! CLI synthesizer needs to decide between a toggle, a single-value flag, and
//! a multi-value flag.

use crate::value::Value;

/// The innermost concrete type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Bool,
    Integer,
    Float,
    String,
}

impl Primitive {
    /// Coerce a single command-line token into a value of this type.
    pub fn parse(self, raw: &str) -> Result<Value, String> {
        match self {
            Primitive::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
                _ => Err(format!("invalid boolean '{raw}'")),
            },
            Primitive::Integer => raw
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|e| format!("invalid integer '{raw}': {e}")),
            Primitive::Float => raw
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| format!("invalid float '{raw}': {e}")),
            Primitive::String => Ok(Value::String(raw.to_string())),
        }
    }
}

/// A wrapper layer around a field's leaf type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrapper {
    Optional,
    Sequence,
}

/// Author-supplied type of a section field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Leaf(Primitive),
    Optional(Box<FieldType>),
    Sequence(Box<FieldType>),
}

impl FieldType {
    pub fn bool() -> Self {
        FieldType::Leaf(Primitive::Bool)
    }

    pub fn integer() -> Self {
        FieldType::Leaf(Primitive::Integer)
    }

    pub fn float() -> Self {
        FieldType::Leaf(Primitive::Float)
    }

    pub fn string() -> Self {
        FieldType::Leaf(Primitive::String)
    }

    pub fn optional(inner: FieldType) -> Self {
        FieldType::Optional(Box::new(inner))
    }

    pub fn sequence(inner: FieldType) -> Self {
        FieldType::Sequence(Box::new(inner))
    }

    /// Peel every wrapper layer, returning the leaf and the wrappers seen on
    /// the way down (outermost first).
    pub fn unwrap_leaf(&self) -> Unwrapped {
        let mut origins = Vec::new();
        let mut current = self;
        loop {
            match current {
                FieldType::Leaf(leaf) => {
                    return Unwrapped {
                        leaf: *leaf,
                        origins,
                    };
                }
                FieldType::Optional(inner) => {
                    origins.push(Wrapper::Optional);
                    current = inner;
                }
                FieldType::Sequence(inner) => {
                    origins.push(Wrapper::Sequence);
                    current = inner;
                }
            }
        }
    }
}

impl From<Primitive> for FieldType {
    fn from(leaf: Primitive) -> Self {
        FieldType::Leaf(leaf)
    }
}

/// Result of [`FieldType::unwrap_leaf`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unwrapped {
    pub leaf: Primitive,
    pub origins: Vec<Wrapper>,
}

impl Unwrapped {
    /// Whether the innermost wrapper directly around the leaf is a sequence.
    ///
    /// True for both `Sequence<T>` and `Optional<Sequence<T>>`; false for
    /// `Sequence<Optional<T>>`.
    pub fn is_sequence(&self) -> bool {
        self.origins.last() == Some(&Wrapper::Sequence)
    }
}
