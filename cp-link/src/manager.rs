//! Connectivity manager
//!
//! Bridges the configuration store and the connection endpoint: reads the
//! connection parameters out of the store, builds endpoints from them, and
//! classifies configuration changes by the action they require on the
//! running connection.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use cp_config::{ConfigurationStatus, ConfigurationStore};

use crate::endpoint::{ConnectionEndpoint, ConnectionSettings};
use crate::tls::TlsPolicy;

/// Connection parameters snapshotted from the configuration store.
#[derive(Debug, Clone)]
pub struct EndpointSettings {
    pub uri: String,
    pub charge_point_id: String,
    pub security_profile: i64,
    pub authorization_key: Option<String>,
    pub ping_interval: Duration,
    pub reconnect_interval: Duration,
    pub tls: TlsPolicy,
}

impl EndpointSettings {
    pub fn from_store(store: &ConfigurationStore) -> Self {
        Self {
            uri: store.central_system_uri(),
            charge_point_id: store.charge_point_id(),
            security_profile: store.security_profile(),
            authorization_key: store.authorization_key(),
            ping_interval: Duration::from_secs(store.websocket_ping_interval()),
            reconnect_interval: Duration::from_secs(store.websocket_reconnect_interval()),
            tls: TlsPolicy {
                ciphers12: store.supported_ciphers12(),
                ciphers13: store.supported_ciphers13(),
                use_default_verify_paths: store.use_ssl_default_verify_paths(),
                verify_common_name: store.verify_csms_common_name(),
                allow_wildcards: store.verify_csms_allow_wildcards(),
            },
        }
    }

    fn into_connection_settings(self) -> ConnectionSettings {
        ConnectionSettings {
            uri: self.uri,
            charge_point_id: self.charge_point_id,
            authorization_key: self.authorization_key,
            ping_interval: self.ping_interval,
            reconnect_interval: self.reconnect_interval,
            tls: self.tls,
        }
    }
}

/// What a configuration change means for the running connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEffect {
    None,
    /// The endpoint must be torn down and rebuilt with fresh settings.
    ReconnectRequired,
    /// The whole charge point must restart before the change applies.
    RebootRequired,
}

/// Wires [`ConfigurationStore`] values into [`ConnectionEndpoint`]s.
pub struct ConnectivityManager {
    store: Arc<ConfigurationStore>,
}

impl ConnectivityManager {
    pub fn new(store: Arc<ConfigurationStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ConfigurationStore {
        &self.store
    }

    pub fn settings(&self) -> EndpointSettings {
        EndpointSettings::from_store(&self.store)
    }

    /// Build a fresh endpoint from the current configuration. Endpoints are
    /// not reusable after disconnect, so every (re)connection cycle starts
    /// here.
    pub fn build_endpoint(&self) -> ConnectionEndpoint {
        ConnectionEndpoint::new(self.settings().into_connection_settings())
    }

    /// What applying a change to `key` requires of the connection.
    pub fn change_effect(key: &str) -> ChangeEffect {
        match key {
            "CentralSystemURI" => ChangeEffect::RebootRequired,
            "SecurityProfile"
            | "AuthorizationKey"
            | "WebSocketPingInterval"
            | "VerifyCsmsAllowWildcards" => ChangeEffect::ReconnectRequired,
            _ => ChangeEffect::None,
        }
    }

    /// Apply a ChangeConfiguration request through the store and report the
    /// connection-level effect for accepted writes.
    pub fn change_configuration(
        &self,
        key: &str,
        value: &str,
    ) -> Option<(ConfigurationStatus, ChangeEffect)> {
        let status = self.store.set(key, value)?;
        let effect = match status {
            ConfigurationStatus::Accepted => Self::change_effect(key),
            ConfigurationStatus::RebootRequired => ChangeEffect::RebootRequired,
            _ => ChangeEffect::None,
        };
        if effect != ChangeEffect::None {
            info!("configuration change to {} requires {:?}", key, effect);
        }
        Some((status, effect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cp_config::{ProfileSchemas, UserConfigOverlay};
    use serde_json::json;

    fn test_store() -> (Arc<ConfigurationStore>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_config.json");
        std::fs::write(&path, "{}").unwrap();
        let overlay = UserConfigOverlay::open(path).unwrap();
        let document = json!({
            "Internal": {
                "ChargePointId": "cp001",
                "CentralSystemURI": "wss://csms.example/ocpp/cp001",
                "SupportedCiphers12": ["ECDHE-ECDSA-AES128-GCM-SHA256"],
                "SupportedCiphers13": ["TLS_AES_256_GCM_SHA384"],
                "UseSslDefaultVerifyPaths": true,
                "VerifyCsmsCommonName": true,
                "VerifyCsmsAllowWildcards": false,
                "WebsocketReconnectInterval": 15
            },
            "Core": {
                "SupportedFeatureProfiles": "Core",
                "HeartbeatInterval": 86400,
                "WebSocketPingInterval": 20,
                "NumberOfConnectors": 1
            },
            "Security": {
                "SecurityProfile": 2,
                "AuthorizationKey": "0123456789abcdef"
            }
        });
        let store =
            ConfigurationStore::new(document, ProfileSchemas::default(), overlay).unwrap();
        (Arc::new(store), dir)
    }

    #[test]
    fn test_settings_from_store() {
        let (store, _dir) = test_store();
        let settings = EndpointSettings::from_store(&store);
        assert_eq!(settings.uri, "wss://csms.example/ocpp/cp001");
        assert_eq!(settings.charge_point_id, "cp001");
        assert_eq!(settings.security_profile, 2);
        assert_eq!(settings.authorization_key.as_deref(), Some("0123456789abcdef"));
        assert_eq!(settings.ping_interval, Duration::from_secs(20));
        assert_eq!(settings.reconnect_interval, Duration::from_secs(15));
        assert!(settings.tls.verify_common_name);
        assert!(!settings.tls.allow_wildcards);
        assert_eq!(
            settings.tls.ciphers12.as_deref(),
            Some("ECDHE-ECDSA-AES128-GCM-SHA256")
        );
    }

    #[test]
    fn test_change_effect_classification() {
        assert_eq!(
            ConnectivityManager::change_effect("CentralSystemURI"),
            ChangeEffect::RebootRequired
        );
        assert_eq!(
            ConnectivityManager::change_effect("AuthorizationKey"),
            ChangeEffect::ReconnectRequired
        );
        assert_eq!(
            ConnectivityManager::change_effect("WebSocketPingInterval"),
            ChangeEffect::ReconnectRequired
        );
        assert_eq!(
            ConnectivityManager::change_effect("HeartbeatInterval"),
            ChangeEffect::None
        );
    }

    #[test]
    fn test_change_configuration_reports_effect() {
        let (store, _dir) = test_store();
        let manager = ConnectivityManager::new(store);

        let (status, effect) = manager
            .change_configuration("WebSocketPingInterval", "45")
            .unwrap();
        assert_eq!(status, ConfigurationStatus::Accepted);
        assert_eq!(effect, ChangeEffect::ReconnectRequired);
        assert_eq!(manager.settings().ping_interval, Duration::from_secs(45));

        let (status, effect) = manager
            .change_configuration("CentralSystemURI", "wss://other.example/ocpp")
            .unwrap();
        assert_eq!(status, ConfigurationStatus::RebootRequired);
        assert_eq!(effect, ChangeEffect::RebootRequired);
        // endpoints built after the reboot pick up the new URI
        assert_eq!(manager.settings().uri, "wss://other.example/ocpp");

        let (status, effect) = manager
            .change_configuration("WebSocketPingInterval", "soon")
            .unwrap();
        assert_eq!(status, ConfigurationStatus::Rejected);
        assert_eq!(effect, ChangeEffect::None);

        assert!(manager.change_configuration("NoSuchKey", "1").is_none());
    }

    #[tokio::test]
    async fn test_build_endpoint_uses_store_settings() {
        let (store, _dir) = test_store();
        let manager = ConnectivityManager::new(store);
        let endpoint = manager.build_endpoint();
        // fresh endpoint: no callbacks yet, so it refuses to connect
        assert!(!endpoint.initialized());
        assert!(!endpoint.connect());
    }
}
