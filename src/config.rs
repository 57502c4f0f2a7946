//! The schema registry: named sections in registration order.
//!
//! A registry starts out holding declared [`Section`] schemas. Parsing the
//! command line produces a *new* registry whose entries are plain resolved
//! mappings; the original is left untouched.
//!
//! Entries are reference-counted. Cloning a `Config` copies the section map
//! and shares the sections themselves, and since stored sections are never
//! mutated, re-registering a name in one copy does not affect another.

use std::collections::HashMap;
use std::ffi::OsString;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::cli;
use crate::error::SectionalError;
use crate::required::{self, Detection};
use crate::section::Section;
use crate::value::{Map, Value};

/// One registered section.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// A declared schema, still carrying its field metadata.
    Declared(Arc<Section>),
    /// Plain field values, as produced by a command-line parse.
    Resolved(Arc<Map>),
}

impl Entry {
    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Entry::Declared(section) => Some(section),
            Entry::Resolved(_) => None,
        }
    }

    /// The entry's fields as a plain mapping.
    pub fn to_map(&self) -> Map {
        match self {
            Entry::Declared(section) => section.defaults(),
            Entry::Resolved(map) => Map::clone(map),
        }
    }
}

/// Aggregate configuration: an ordered mapping of section name to section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    sections: IndexMap<String, Entry>,
    command_name: Option<String>,
    about: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Program name shown in usage output (default: the file stem of argv[0]).
    pub fn command_name(mut self, name: &str) -> Self {
        self.command_name = Some(name.to_string());
        self
    }

    /// Description shown at the top of `--help`.
    pub fn about(mut self, about: &str) -> Self {
        self.about = Some(about.to_string());
        self
    }

    pub(crate) fn command_info(&self) -> (Option<&str>, Option<&str>) {
        (self.command_name.as_deref(), self.about.as_deref())
    }

    /// Build a registry of resolved sections from a snapshot.
    ///
    /// Every top-level value must be a mapping of field name to value.
    pub fn from_snapshot(snapshot: Map) -> Result<Self, SectionalError> {
        let mut sections = IndexMap::with_capacity(snapshot.len());
        for (name, value) in snapshot {
            match value {
                Value::Mapping(fields) => {
                    sections.insert(name, Entry::Resolved(Arc::new(fields)));
                }
                other => {
                    return Err(SectionalError::InvalidValue {
                        key: name,
                        reason: format!("a section must be a mapping, got {other}"),
                    });
                }
            }
        }
        Ok(Self {
            sections,
            command_name: None,
            about: None,
        })
    }

    /// Replace every entry with a resolved one taken from `snapshot`,
    /// keeping this registry's command settings.
    pub(crate) fn with_snapshot(&self, snapshot: Map) -> Result<Self, SectionalError> {
        let mut resolved = Self::from_snapshot(snapshot)?;
        resolved.command_name = self.command_name.clone();
        resolved.about = self.about.clone();
        Ok(resolved)
    }

    /// Register `section` under `name`, merging with an existing declaration.
    ///
    /// When `name` is new the schema is stored as given. When `name` already
    /// holds a declared schema, the two are merged field by field (see
    /// [`Section::merge`]). A resolved entry under `name` is replaced.
    ///
    /// Returns the schema now stored under `name`. Fails with
    /// [`SectionalError::DuplicateFlag`] if any spelling of a command-line
    /// field in the result (`--name` or an extra flag) is already taken by
    /// another section, by another field of this one, or by `--help`/`-h`,
    /// and with [`SectionalError::InvalidAlias`] on a malformed extra flag.
    pub fn register(&mut self, name: &str, section: Section) -> Result<Arc<Section>, SectionalError> {
        let stored = match self.sections.get(name) {
            Some(Entry::Declared(existing)) => {
                debug!(section = name, fields = section.len(), "merging section declaration");
                existing.merge(&section)
            }
            Some(Entry::Resolved(_)) => {
                debug!(section = name, "replacing resolved section with a declaration");
                section
            }
            None => {
                debug!(section = name, fields = section.len(), "registering section");
                section
            }
        };

        self.check_flag_owners(name, &stored)?;

        let handle = Arc::new(stored);
        self.sections
            .insert(name.to_string(), Entry::Declared(Arc::clone(&handle)));
        Ok(handle)
    }

    fn check_flag_owners(&self, name: &str, section: &Section) -> Result<(), SectionalError> {
        let mut claimed: HashMap<String, String> = cli::RESERVED_FLAGS
            .iter()
            .map(|flag| (flag.to_string(), "help".to_string()))
            .collect();
        for (other, entry) in &self.sections {
            if other == name {
                continue;
            }
            let Some(schema) = entry.as_section() else {
                continue;
            };
            for field in schema.fields() {
                if let Some(arg) = field.spec.as_argument() {
                    for flag in cli::flag_spellings(field, arg)? {
                        claimed.insert(flag, other.clone());
                    }
                }
            }
        }

        for field in section.fields() {
            let Some(arg) = field.spec.as_argument() else {
                continue;
            };
            for flag in cli::flag_spellings(field, arg)? {
                if let Some(owner) = claimed.insert(flag.clone(), name.to_string()) {
                    return Err(SectionalError::DuplicateFlag {
                        flag,
                        field: format!("{name}.{}", field.name),
                        owner,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.sections.get(name)
    }

    /// The declared schema under `name`, if it has not been resolved yet.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.get(name)?.as_section()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.sections.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Plain nested snapshot: section name → field name → value.
    ///
    /// Declared sections contribute their defaults, so a field still holding
    /// [`Required`](crate::Required) appears as [`Value::Required`].
    pub fn flatten(&self) -> Map {
        self.sections
            .iter()
            .map(|(name, entry)| (name.clone(), Value::Mapping(entry.to_map())))
            .collect()
    }

    pub fn to_value(&self) -> Value {
        Value::Mapping(self.flatten())
    }

    /// Look up a value by dotted path, e.g. `"net.port"` or `"net"`.
    pub fn lookup(&self, dotted_key: &str) -> Option<Value> {
        let (name, rest) = match dotted_key.split_once('.') {
            Some((name, rest)) => (name, Some(rest)),
            None => (dotted_key, None),
        };
        let root = Value::Mapping(self.sections.get(name)?.to_map());
        let Some(path) = rest else {
            return Some(root);
        };
        let mut current = &root;
        for segment in path.split('.') {
            current = current.get(segment)?;
        }
        Some(current.clone())
    }

    /// Every leaf as a dotted `(key, display value)` pair, in registration
    /// and declaration order. Nested mappings are expanded; sequences are
    /// shown whole.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for (name, entry) in &self.sections {
            collect_entries(name, &Value::Mapping(entry.to_map()), &mut out);
        }
        out
    }

    /// Render the snapshot as TOML. Fails if a required value is unresolved.
    pub fn to_toml_string(&self) -> Result<String, SectionalError> {
        toml::to_string(&self.to_value()).map_err(|e| SectionalError::InvalidValue {
            key: "<snapshot>".into(),
            reason: e.to_string(),
        })
    }

    /// Render the snapshot as JSON. Fails if a required value is unresolved.
    pub fn to_json(&self) -> Result<serde_json::Value, SectionalError> {
        serde_json::to_value(self.to_value()).map_err(|e| SectionalError::InvalidValue {
            key: "<snapshot>".into(),
            reason: e.to_string(),
        })
    }

    /// Run the required-value check over this registry.
    ///
    /// See [`check_required`](crate::check_required).
    pub fn check_required(&self, raise_on_detect: bool) -> Result<Detection, SectionalError> {
        required::check_required(self, raise_on_detect)
    }

    /// The `clap` command synthesized from the declared sections.
    pub fn cli_command(&self) -> Result<clap::Command, SectionalError> {
        Ok(cli::synthesize(self, None)?.command)
    }

    /// Parse `args` against the synthesized flags and return the resolved
    /// registry. Parser failures come back as [`SectionalError::Cli`].
    ///
    /// The first item is the program name, as with `std::env::args_os()`.
    /// Unrecognized flags and stray values are ignored.
    pub fn try_parse_args_from<I, T>(&self, args: I) -> Result<Config, SectionalError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        cli::synthesize_and_parse(self, args.into_iter().map(Into::into).collect())
    }

    /// Like [`try_parse_args_from`](Self::try_parse_args_from), but a parser
    /// failure prints usage to stderr and exits the process (`--help` exits 0).
    pub fn parse_args_from<I, T>(&self, args: I) -> Result<Config, SectionalError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        match self.try_parse_args_from(args) {
            Err(SectionalError::Cli(err)) => err.exit(),
            other => other,
        }
    }

    /// Parse the process command line. See [`parse_args_from`](Self::parse_args_from).
    pub fn parse_args(&self) -> Result<Config, SectionalError> {
        self.parse_args_from(std::env::args_os())
    }
}

impl TryFrom<Map> for Config {
    type Error = SectionalError;

    fn try_from(snapshot: Map) -> Result<Self, Self::Error> {
        Config::from_snapshot(snapshot)
    }
}

fn collect_entries(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Mapping(map) => {
            for (key, item) in map {
                collect_entries(&format!("{prefix}.{key}"), item, out);
            }
        }
        other => out.push((prefix.to_string(), other.to_string())),
    }
}
