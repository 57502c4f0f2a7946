//! Sectioned configuration for Rust programs, with command-line flags
//! synthesized from the same declarations.
//!
//! A program declares its configuration as independent named *sections*.
//! Each field has a type and a default. When the default is an [`Argument`]
//! instead of a plain value, the field also becomes a command-line flag.
//! Parsing the command line yields a new, resolved registry, and
//! [`check_required`] verifies that nothing is still waiting for a value
//! before startup continues.
//!
//! ```
//! use sectional::{Argument, Config, FieldType, Required, Section, Value};
//!
//! let mut config = Config::new();
//! config.register(
//!     "net",
//!     Section::new("Net")
//!         .field("host", FieldType::string(), Argument::new(Required).help("Host to bind"))
//!         .field("port", FieldType::integer(), Argument::new(8080)),
//! )?;
//!
//! let resolved = config.try_parse_args_from(["myapp", "--host", "example.com"])?;
//! resolved.check_required(true)?;
//! assert_eq!(resolved.lookup("net.port"), Some(Value::Integer(8080)));
//! # Ok::<(), sectional::SectionalError>(())
//! ```
//!
//! # Sections
//!
//! [`Config::register`] stores a [`Section`] under a name. Registering the
//! same name again merges the two declarations field by field:
//!
//! - fields keep the position of their **first** declaration;
//! - a field declared twice takes the **later** type and default;
//! - the merged field count is the number of distinct names.
//!
//! This lets a library declare a base section and the application extend it
//! without restating the base fields.
//!
//! # Field metadata
//!
//! An [`Argument`] carries everything the flag needs:
//!
//! | Metadata        | Flag behavior                                          |
//! |-----------------|--------------------------------------------------------|
//! | default         | used when the flag is absent; [`Required`] makes the flag mandatory |
//! | `flag("-p")`    | extra spellings alongside `--<field>`                  |
//! | `help(..)`      | help text in `--help` output                           |
//! | `choices(..)`   | reject values outside a closed set                     |
//! | `display_name`  | value placeholder in usage output                      |
//! | `parse_with(..)`| custom coercion from the raw token                     |
//!
//! A [`Choice`] converts into an `Argument` with `choices` and a default.
//!
//! # Types and flag shapes
//!
//! Field types are explicit descriptors ([`FieldType`]): a [`Primitive`]
//! leaf wrapped in any number of `Optional` and `Sequence` layers.
//! [`FieldType::unwrap_leaf`] peels the wrappers, and the result decides the
//! flag's shape:
//!
//! - **boolean leaf**: a toggle that takes no value and flips the default.
//!   Without the flag the default is kept as is. A boolean cannot default to
//!   `Required` ([`SectionalError::InvalidBooleanDefault`]) and takes no
//!   choices, display name or parse action
//!   ([`SectionalError::InvalidToggleOption`]).
//! - **sequence directly around the leaf**: one or more values, as in
//!   `--tags a b c`. `Optional<Sequence<T>>` counts; `Sequence<Optional<T>>`
//!   does not.
//! - **otherwise**: exactly one value, coerced to the leaf type.
//!
//! # Parsing
//!
//! [`Config::try_parse_args_from`] synthesizes a `clap` command, parses, and
//! returns a fresh registry whose sections are plain resolved mappings. The
//! original registry is unchanged, and parsing the resolved registry again
//! is a no-op. Tokens that match no synthesized flag are ignored, so a
//! program can share argv with another parser.
//!
//! [`Config::parse_args`] reads the process arguments and, on a parse
//! failure, lets `clap` print usage to stderr and exit non-zero.
//!
//! Flag values are routed to their section by bare field name, so no two
//! command-line fields may share a spelling, whether a field name or an
//! extra flag: the registration that introduces the clash fails with
//! [`SectionalError::DuplicateFlag`].
//!
//! # Required values
//!
//! [`check_required`] walks any configuration tree (a [`Value`], a
//! [`Map`], a registry, key/value pairs) and stops at the first
//! [`Required`] placeholder, reporting its dotted location. With
//! `raise_on_detect` it fails with [`SectionalError::Required`]; without,
//! it hands back a [`Detection`] for pre-flight checks.
//!
//! # Snapshots and typed access
//!
//! [`Config::flatten`] produces the plain nested snapshot. From there,
//! [`Config::lookup`] and [`Config::entries`] read values by dotted key,
//! [`Config::to_toml_string`] and [`Config::to_json`] render it, and
//! [`Config::extract`] hands it to a [confique](https://docs.rs/confique)
//! struct with one `#[config(nested)]` field per section.
//!
//! # Logging
//!
//! Registration, merging, flag synthesis and ignored tokens are reported
//! through [`tracing`](https://docs.rs/tracing) at debug and trace level.
//! Install a subscriber to see them.

pub mod error;
pub mod types;

mod cli;
mod config;
mod extract;
mod field;
mod required;
mod section;
mod value;

#[cfg(test)]
mod fixtures;

pub use config::{Config, Entry};
pub use error::SectionalError;
pub use field::{Argument, Choice, Field, FieldSpec, ParseAction};
pub use required::{Detection, Inspect, check_required};
pub use section::Section;
pub use types::{FieldType, Primitive, Unwrapped, Wrapper};
pub use value::{Map, Required, Value};
