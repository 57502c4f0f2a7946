//! Hand a finalized registry to a typed `confique` struct.
//!
//! Steps:
//!
//! 1. Refuse a registry that still holds a required placeholder
//! 2. Convert the snapshot to a `toml::Table` (sections become tables)
//! 3. Deserialize the table into `C::Layer`
//! 4. `C::builder().preloaded(layer).load()`: confique fills defaults for
//!    anything the registry does not carry and validates the rest

use confique::Config as Typed;
use serde::Deserialize;

use crate::config::Config;
use crate::error::SectionalError;
use crate::required::check_required;

impl Config {
    /// Extract the registry into a typed configuration struct.
    ///
    /// Each section maps onto a `#[config(nested)]` field of the same name.
    /// Null values are omitted, so optional fields come out as `None`.
    pub fn extract<C: Typed>(&self) -> Result<C, SectionalError>
    where
        C::Layer: for<'de> Deserialize<'de>,
    {
        check_required(self, true)?;

        let table = toml::Value::try_from(self.to_value()).map_err(|e| SectionalError::InvalidValue {
            key: "<snapshot>".into(),
            reason: e.to_string(),
        })?;

        let layer: C::Layer = table
            .try_into()
            .map_err(|e: toml::de::Error| SectionalError::InvalidValue {
                key: "<snapshot>".into(),
                reason: e.to_string(),
            })?;

        C::builder()
            .preloaded(layer)
            .load()
            .map_err(SectionalError::from)
    }
}
