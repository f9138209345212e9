//! # cp-link
//!
//! OCPP 1.6 charge point connectivity.
//!
//! A charge point keeps one logical WebSocket connection to its central
//! system (CSMS), negotiated with the `ocpp1.6` subprotocol over either
//! plain TCP or TLS. This crate provides:
//!
//! - [`ConnectionEndpoint`]: a single connection with registered
//!   connected / disconnected / message callbacks, automatic
//!   fixed-interval reconnect, and permanent shutdown semantics
//! - [`tls::TlsPolicy`]: TLS 1.2+ with real peer verification and an
//!   explicit wildcard policy for the certificate name check
//! - [`ConnectivityManager`]: wires connection parameters out of a
//!   [`cp_config::ConfigurationStore`] and classifies configuration
//!   changes by their effect on the running connection
//!
//! The transport stack is `tokio` + `tokio-tungstenite`; callbacks fire
//! from the connection task.

pub mod endpoint;
pub mod manager;
pub mod tls;

pub use endpoint::{
    ConnectionEndpoint, ConnectionSettings, EndpointError, EndpointState, OCPP_SUBPROTOCOL,
};
pub use manager::{ChangeEffect, ConnectivityManager, EndpointSettings};
pub use tls::TlsPolicy;
