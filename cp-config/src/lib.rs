//! # cp-config
//!
//! OCPP 1.6 charge point configuration subsystem.
//!
//! A charge point carries a JSON configuration document partitioned into
//! feature profile sections (`Internal`, `Core`, `Security`, ...). This
//! crate owns that document and exposes the OCPP-facing semantics over it:
//!
//! - [`ConfigurationStore`] answers GetConfiguration and ChangeConfiguration
//!   with profile visibility, read-only enforcement and per-key validation
//! - accepted writes persist across restarts through a JSON overlay file
//!   written atomically ([`overlay::UserConfigOverlay`])
//! - the static key registry ([`registry`]) describes every standard key;
//!   Custom-profile keys are described by a schema instead ([`schema`])
//!
//! Typed getters expose the connection parameters (`CentralSystemURI`,
//! `SecurityProfile`, cipher lists, ping and reconnect intervals) consumed
//! by the connectivity layer.

pub mod overlay;
pub mod registry;
pub mod schema;
pub mod store;
pub mod types;
pub mod validators;

pub use overlay::{OverlayError, UserConfigOverlay};
pub use schema::{ProfileSchemas, SchemaError};
pub use store::{ConfigError, ConfigurationStore};
pub use types::{
    ConfigurationStatus, FeatureProfile, KeyValue, Measurand, MeasurandWithPhase, Phase,
    MAX_KEY_LENGTH, MAX_VALUE_LENGTH,
};
