//! Section schemas: an ordered set of uniquely named fields.
//!
//! Field order is declaration order. Declaring a name a second time, within
//! one schema or through [`Section::merge`], replaces that field's type and
//! default but keeps the position of its first declaration.

use indexmap::IndexMap;

use crate::field::{Field, FieldSpec};
use crate::types::FieldType;
use crate::value::{Map, Value};

/// Schema of one configuration section.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    name: String,
    fields: IndexMap<String, Field>,
}

impl Section {
    /// Start an empty schema. `name` labels the schema itself (e.g. `"Net"`);
    /// the key it is stored under is chosen at registration.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: IndexMap::new(),
        }
    }

    /// Declare a field. A repeated name replaces the earlier declaration in place.
    pub fn field(self, name: &str, ty: FieldType, spec: impl Into<FieldSpec>) -> Self {
        self.with_field(Field::new(name, ty, spec))
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.insert(field);
        self
    }

    fn insert(&mut self, field: Field) {
        // IndexMap::insert keeps the original slot for an existing key.
        self.fields.insert(field.name.clone(), field);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, field: &str) -> Option<&Field> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    /// Fields exposed on the command line, in declaration order.
    pub fn cli_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values().filter(|f| f.is_cli())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Merge `later` into this schema.
    ///
    /// Fields from `self` come first, then new fields from `later`. A name
    /// present in both takes `later`'s type and default at `self`'s position.
    /// The merged schema carries `later`'s name.
    pub fn merge(&self, later: &Section) -> Section {
        let mut merged = Section {
            name: later.name.clone(),
            fields: self.fields.clone(),
        };
        for field in later.fields.values() {
            merged.insert(field.clone());
        }
        merged
    }

    /// Instantiate the schema: every field at its default value.
    pub fn defaults(&self) -> Map {
        self.fields
            .values()
            .map(|f| (f.name.clone(), f.spec.default_value().clone()))
            .collect()
    }

    pub fn to_value(&self) -> Value {
        Value::Mapping(self.defaults())
    }
}
