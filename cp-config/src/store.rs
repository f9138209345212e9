//! The configuration store
//!
//! Owns the merged configuration document (base config + user overlay +
//! schema defaults) and implements the GetConfiguration /
//! ChangeConfiguration semantics on top of the key registry: profile
//! visibility, read-only enforcement, value validation, and persistence of
//! accepted writes through the overlay.
//!
//! Validation failures are ordinary `Rejected` results; only construction
//! can fail, and every construction failure is fatal for the charge point.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use parking_lot::Mutex;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::overlay::{OverlayError, UserConfigOverlay};
use crate::registry::{self, KeyDescriptor, Special, ValueKind, ValueRule};
use crate::schema::{ProfileSchemas, SchemaError};
use crate::types::{
    ConfigurationStatus, FeatureProfile, KeyValue, Measurand, MeasurandWithPhase, Phase,
    MAX_KEY_LENGTH, MAX_VALUE_LENGTH,
};
use crate::validators::{self, IntParse};

/// Fatal configuration errors. Any of these at construction time means the
/// charge point must not start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Overlay(#[from] OverlayError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("SupportedFeatureProfiles is missing from the Core section")]
    MissingSupportedFeatureProfiles,
    #[error("unknown feature profile in SupportedFeatureProfiles: {0}")]
    UnknownFeatureProfile(String),
    #[error("Core is not listed in SupportedFeatureProfiles")]
    CoreProfileMissing,
    #[error("{key} contains measurands this charge point does not support")]
    UnsupportedMeasurands { key: String },
}

/// Core keys holding measurand CSVs that are cross-checked against the
/// supported measurand set at construction time.
const MEASURAND_LIST_KEYS: [&str; 4] = [
    "MeterValuesAlignedData",
    "MeterValuesSampledData",
    "StopTxnAlignedData",
    "StopTxnSampledData",
];

/// Phases each measurand is reported on. Energy, power, voltage and
/// frequency readings come per line, currents additionally on neutral,
/// the rest are not phase-resolved.
fn measurand_phases(measurand: Measurand) -> Vec<Phase> {
    use Phase::*;
    match measurand {
        Measurand::EnergyActiveImportRegister
        | Measurand::EnergyActiveExportRegister
        | Measurand::EnergyReactiveImportRegister
        | Measurand::EnergyReactiveExportRegister
        | Measurand::EnergyActiveImportInterval
        | Measurand::EnergyActiveExportInterval
        | Measurand::PowerActiveImport
        | Measurand::PowerActiveExport
        | Measurand::PowerReactiveImport
        | Measurand::PowerReactiveExport
        | Measurand::Voltage
        | Measurand::Frequency => vec![L1, L2, L3],
        Measurand::CurrentImport | Measurand::CurrentExport => vec![L1, L2, L3, N],
        Measurand::PowerOffered
        | Measurand::PowerFactor
        | Measurand::CurrentOffered
        | Measurand::Temperature
        | Measurand::SoC
        | Measurand::RPM => vec![],
    }
}

struct Inner {
    document: Value,
    overlay: UserConfigOverlay,
}

/// Thread-safe store over the charge point configuration document.
pub struct ConfigurationStore {
    inner: Mutex<Inner>,
    schemas: ProfileSchemas,
    supported_profiles: HashSet<FeatureProfile>,
    supported_measurands: HashMap<Measurand, Vec<Phase>>,
}

impl ConfigurationStore {
    /// Build a store from an already parsed document. The overlay is merged
    /// over the document, schema defaults fill remaining gaps, then feature
    /// profiles and measurand lists are validated.
    pub fn new(
        mut document: Value,
        schemas: ProfileSchemas,
        overlay: UserConfigOverlay,
    ) -> Result<Self, ConfigError> {
        let user = overlay.read()?;
        merge_overlay(&mut document, &user);
        schemas.apply_defaults(&mut document);

        let profiles_csv = document["Core"]["SupportedFeatureProfiles"]
            .as_str()
            .ok_or(ConfigError::MissingSupportedFeatureProfiles)?
            .to_string();
        let mut supported_profiles = HashSet::new();
        for name in validators::split_csv(&profiles_csv) {
            let profile = FeatureProfile::from_str(name)
                .map_err(|_| ConfigError::UnknownFeatureProfile(name.to_string()))?;
            supported_profiles.insert(profile);
        }
        if !supported_profiles.contains(&FeatureProfile::Core) {
            return Err(ConfigError::CoreProfileMissing);
        }
        // implicit profiles: Internal and Security always, the vendor
        // sections whenever the document carries them
        supported_profiles.insert(FeatureProfile::Internal);
        supported_profiles.insert(FeatureProfile::Security);
        for (section, profile) in [
            ("PnC", FeatureProfile::PnC),
            ("CostAndPrice", FeatureProfile::CostAndPrice),
            ("Custom", FeatureProfile::Custom),
        ] {
            if document.get(section).is_some_and(Value::is_object) {
                supported_profiles.insert(profile);
            }
        }

        // any recognized measurand name is acceptable here; only a name
        // that is no measurand at all is a broken document
        let mut supported_measurands = HashMap::new();
        if let Some(csv) = document["Internal"]["SupportedMeasurands"].as_str() {
            for element in validators::split_csv(csv) {
                match Measurand::from_str(element) {
                    Ok(m) => {
                        supported_measurands.insert(m, measurand_phases(m));
                    }
                    Err(_) => {
                        return Err(ConfigError::UnsupportedMeasurands {
                            key: "SupportedMeasurands".to_string(),
                        })
                    }
                }
            }
        }
        for key in MEASURAND_LIST_KEYS {
            if let Some(csv) = document["Core"][key].as_str() {
                if !validators::validate_measurand_csv(csv, &supported_measurands) {
                    return Err(ConfigError::UnsupportedMeasurands {
                        key: key.to_string(),
                    });
                }
            }
        }

        info!(
            "configuration loaded, supported profiles: {}",
            profiles_csv
        );

        Ok(Self {
            inner: Mutex::new(Inner { document, overlay }),
            schemas,
            supported_profiles,
            supported_measurands,
        })
    }

    /// Load the store from files: the base configuration document, a schema
    /// directory, and the user overlay.
    pub fn open(
        config_path: &Path,
        schema_dir: &Path,
        user_config_path: &Path,
    ) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(config_path).map_err(|source| ConfigError::Io {
            path: config_path.to_path_buf(),
            source,
        })?;
        let document: Value = serde_json::from_str(&raw)?;
        let schemas = ProfileSchemas::load_dir(schema_dir)?;
        let overlay = UserConfigOverlay::open(user_config_path)?;
        Self::new(document, schemas, overlay)
    }

    pub fn supported_profiles(&self) -> &HashSet<FeatureProfile> {
        &self.supported_profiles
    }

    pub fn supported_measurands(&self) -> &HashMap<Measurand, Vec<Phase>> {
        &self.supported_measurands
    }

    fn profile_supported(&self, profile: FeatureProfile) -> bool {
        self.supported_profiles.contains(&profile)
    }

    // ------------------------------------------------------------------
    // GetConfiguration
    // ------------------------------------------------------------------

    /// Read a single key. `None` means the key is unknown, belongs to an
    /// unsupported profile, is write-only, or is simply not configured.
    pub fn get(&self, key: &str) -> Option<KeyValue> {
        if key.len() > MAX_KEY_LENGTH {
            return None;
        }
        if let Some(connector) = parse_meter_public_key_index(key) {
            return self.meter_public_key_value(connector);
        }
        if let Some(language) = parse_default_price_text_language(key) {
            return self.default_price_text_value(language);
        }
        if let Some(d) = registry::descriptor(key) {
            if !self.profile_supported(d.profile) {
                return None;
            }
            if matches!(d.special, Some(Special::WriteOnly)) {
                return None;
            }
            let inner = self.inner.lock();
            let value = inner
                .document
                .get(d.profile.as_str())
                .and_then(|s| s.get(d.name))?;
            return Some(KeyValue {
                key: d.name.to_string(),
                readonly: d.read_only,
                value: Some(stringify(value)),
            });
        }
        self.custom_key_value(key)
    }

    /// All readable keys of all supported profiles, including the computed
    /// `MeterPublicKey[n]` and `DefaultPriceText,<lang>` families.
    pub fn get_all(&self) -> Vec<KeyValue> {
        let mut out = Vec::new();
        for d in registry::descriptors() {
            if !self.profile_supported(d.profile) {
                continue;
            }
            if matches!(d.special, Some(Special::WriteOnly)) {
                continue;
            }
            if let Some(kv) = self.get(d.name) {
                out.push(kv);
            }
        }
        if self.profile_supported(FeatureProfile::Custom) {
            let keys: Vec<String> = self
                .schemas
                .section_keys("Custom")
                .into_iter()
                .map(str::to_string)
                .collect();
            for key in keys {
                if let Some(kv) = self.custom_key_value(&key) {
                    out.push(kv);
                }
            }
        }
        out.extend(self.all_meter_public_keys());
        if self.multi_language_enabled() {
            for language in self.supported_languages() {
                if let Some(kv) = self.default_price_text_value(&language) {
                    out.push(kv);
                }
            }
        }
        out
    }

    fn custom_key_value(&self, key: &str) -> Option<KeyValue> {
        if !self.profile_supported(FeatureProfile::Custom) || !self.schemas.knows("Custom", key) {
            return None;
        }
        let readonly = self.schemas.read_only("Custom", key).unwrap_or(true);
        let inner = self.inner.lock();
        let value = inner.document.get("Custom").and_then(|s| s.get(key))?;
        Some(KeyValue {
            key: key.to_string(),
            readonly,
            value: Some(stringify(value)),
        })
    }

    // ------------------------------------------------------------------
    // ChangeConfiguration
    // ------------------------------------------------------------------

    /// Write a single key. `None` means the key is unknown or invisible;
    /// otherwise the returned status is the ChangeConfiguration answer.
    pub fn set(&self, key: &str, value: &str) -> Option<ConfigurationStatus> {
        self.write(key, value, false)
    }

    /// Like [`set`](Self::set) but allowed to overwrite read-only Custom
    /// keys. Reserved for local administrative writes.
    pub fn set_forced(&self, key: &str, value: &str) -> Option<ConfigurationStatus> {
        self.write(key, value, true)
    }

    fn write(&self, key: &str, value: &str, force: bool) -> Option<ConfigurationStatus> {
        if key.len() > MAX_KEY_LENGTH {
            return None;
        }
        if parse_meter_public_key_index(key).is_some() {
            return Some(ConfigurationStatus::Rejected);
        }
        if let Some(language) = parse_default_price_text_language(key) {
            if !self.multi_language_enabled() {
                return None;
            }
            if value.len() > MAX_VALUE_LENGTH {
                warn!("rejected write to {}: value exceeds {} characters", key, MAX_VALUE_LENGTH);
                return Some(ConfigurationStatus::Rejected);
            }
            return self.set_default_price_text(language, value);
        }

        let Some(d) = registry::descriptor(key) else {
            return self.write_custom(key, value, force);
        };
        if !self.profile_supported(d.profile) {
            return None;
        }
        // an over-long value only gets a Rejected answer for a key that
        // resolved; unknown keys stay unanswered
        if value.len() > MAX_VALUE_LENGTH {
            warn!("rejected write to {}: value exceeds {} characters", key, MAX_VALUE_LENGTH);
            return Some(ConfigurationStatus::Rejected);
        }
        match d.special {
            Some(Special::WriteOnly) => {
                if let Some(converted) = self.validate_and_convert(d, value) {
                    self.put_value(d.profile.as_str(), d.name, converted);
                    return Some(ConfigurationStatus::Accepted);
                }
                warn!("rejected write to {}: value failed validation", key);
                return Some(ConfigurationStatus::Rejected);
            }
            // recognized and acknowledged, the stored value is managed
            // elsewhere
            Some(Special::AcceptNoop) => return Some(ConfigurationStatus::Accepted),
            None => {}
        }
        if d.read_only {
            warn!("rejected write to read-only key {}", key);
            return Some(ConfigurationStatus::Rejected);
        }
        let configured = {
            let inner = self.inner.lock();
            inner
                .document
                .get(d.profile.as_str())
                .and_then(|s| s.get(d.name))
                .is_some()
        };
        if !configured {
            debug!("write to {}: key is not configured on this charge point", key);
            return Some(ConfigurationStatus::NotSupported);
        }
        let Some(converted) = self.validate_and_convert(d, value) else {
            warn!("rejected write to {}: value {:?} failed validation", key, value);
            return Some(ConfigurationStatus::Rejected);
        };
        self.put_value(d.profile.as_str(), d.name, converted);
        Some(if d.reboot_required {
            ConfigurationStatus::RebootRequired
        } else {
            ConfigurationStatus::Accepted
        })
    }

    fn write_custom(&self, key: &str, value: &str, force: bool) -> Option<ConfigurationStatus> {
        if !self.profile_supported(FeatureProfile::Custom) || !self.schemas.knows("Custom", key) {
            return None;
        }
        if value.len() > MAX_VALUE_LENGTH {
            warn!("rejected write to {}: value exceeds {} characters", key, MAX_VALUE_LENGTH);
            return Some(ConfigurationStatus::Rejected);
        }
        let readonly = self.schemas.read_only("Custom", key).unwrap_or(true);
        if readonly && !force {
            warn!("rejected write to read-only custom key {}", key);
            return Some(ConfigurationStatus::Rejected);
        }
        let Some(converted) = self.schemas.coerce("Custom", key, value) else {
            warn!("rejected write to custom key {}: value does not fit its schema type", key);
            return Some(ConfigurationStatus::Rejected);
        };
        self.put_value("Custom", key, converted);
        Some(ConfigurationStatus::Accepted)
    }

    fn validate_and_convert(&self, d: &KeyDescriptor, value: &str) -> Option<Value> {
        let converted = match d.kind {
            ValueKind::Boolean => Value::Bool(validators::parse_bool(value)?),
            ValueKind::PositiveInteger => match validators::parse_positive_integer(value) {
                IntParse::Ok(n) => Value::from(n),
                IntParse::Negative => {
                    warn!("{}: negative value not allowed", d.name);
                    return None;
                }
                IntParse::NotNumeric => {
                    warn!("{}: value is not an integer", d.name);
                    return None;
                }
                IntParse::OutOfRange => {
                    warn!("{}: value out of range", d.name);
                    return None;
                }
            },
            ValueKind::Text | ValueKind::CsvList => Value::String(value.to_string()),
            ValueKind::Json => serde_json::from_str(value).ok()?,
        };

        if let Some(rule) = d.rule {
            let ok = match rule {
                ValueRule::MeasurandCsv => {
                    validators::validate_measurand_csv(value, &self.supported_measurands)
                }
                ValueRule::PhaseRotation => validators::validate_connector_phase_rotation(
                    value,
                    self.number_of_connectors(),
                ),
                ValueRule::EvseIdList => validators::validate_evse_ids(value),
                ValueRule::MinLength(n) => value.len() >= n,
                ValueRule::Minimum(min) => converted.as_i64().is_some_and(|n| n >= min),
                ValueRule::Maximum(max) => converted.as_i64().is_some_and(|n| n <= max),
                ValueRule::LeafSubjectCommonName => {
                    validators::validate_leaf_subject_common_name(value)
                }
                ValueRule::LeafSubjectCountry => validators::validate_leaf_subject_country(value),
                ValueRule::LeafSubjectOrganization => {
                    validators::validate_leaf_subject_organization(value)
                }
                ValueRule::SupportedLanguage => self
                    .supported_languages()
                    .iter()
                    .any(|l| l == value.trim()),
            };
            if !ok {
                return None;
            }
        }
        Some(converted)
    }

    /// Mutate the document and persist through the overlay. A failed
    /// overlay write keeps the in-memory value and is only logged.
    fn put_value(&self, section: &str, key: &str, value: Value) {
        let mut inner = self.inner.lock();
        inner.document[section][key] = value.clone();
        if let Err(e) = inner.overlay.record(section, key, &value) {
            warn!("could not persist {}.{} to user configuration: {}", section, key, e);
        }
    }

    // ------------------------------------------------------------------
    // MeterPublicKey[n]
    // ------------------------------------------------------------------

    fn meter_public_key_value(&self, connector_id: u32) -> Option<KeyValue> {
        let inner = self.inner.lock();
        let keys = inner.document["Internal"]["MeterPublicKeys"].as_array()?;
        if connector_id < 1 || keys.len() < connector_id as usize {
            return None;
        }
        Some(KeyValue {
            key: format!("MeterPublicKey[{connector_id}]"),
            readonly: true,
            value: Some(stringify(&keys[connector_id as usize - 1])),
        })
    }

    fn all_meter_public_keys(&self) -> Vec<KeyValue> {
        let inner = self.inner.lock();
        let Some(keys) = inner.document["Internal"]["MeterPublicKeys"].as_array() else {
            return Vec::new();
        };
        keys.iter()
            .enumerate()
            .map(|(i, key)| KeyValue {
                key: format!("MeterPublicKey[{}]", i + 1),
                readonly: true,
                value: Some(stringify(key)),
            })
            .collect()
    }

    /// Install a meter public key for a connector, growing the key array to
    /// the connector count on first use.
    pub fn set_meter_public_key(&self, connector_id: u32, public_key_pem: &str) -> bool {
        let connectors = self.number_of_connectors();
        if connector_id < 1 || connector_id > connectors {
            warn!(
                "cannot set MeterPublicKey for connector {}: no such connector",
                connector_id
            );
            return false;
        }
        let mut inner = self.inner.lock();
        let slot = &mut inner.document["Internal"]["MeterPublicKeys"];
        if !slot.is_array() || slot.as_array().is_some_and(Vec::is_empty) {
            *slot = Value::Array(vec![Value::String(String::new()); connectors as usize]);
        }
        let Some(keys) = slot.as_array_mut() else {
            return false;
        };
        if keys.len() < connector_id as usize {
            warn!(
                "cannot set MeterPublicKey for connector {}: key array too short",
                connector_id
            );
            return false;
        }
        keys[connector_id as usize - 1] = Value::String(public_key_pem.to_string());
        let updated = inner.document["Internal"]["MeterPublicKeys"].clone();
        if let Err(e) = inner.overlay.record("Internal", "MeterPublicKeys", &updated) {
            warn!("could not persist MeterPublicKeys to user configuration: {}", e);
        }
        true
    }

    // ------------------------------------------------------------------
    // DefaultPriceText,<lang>
    // ------------------------------------------------------------------

    fn multi_language_enabled(&self) -> bool {
        self.profile_supported(FeatureProfile::CostAndPrice)
            && self
                .bool_value("CostAndPrice", "CustomMultiLanguageMessages")
                .unwrap_or(false)
    }

    fn supported_languages(&self) -> Vec<String> {
        self.string_value("CostAndPrice", "SupportedLanguages")
            .map(|csv| {
                validators::split_csv(&csv)
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The per-language price text entry. An empty value means the language
    /// has no text yet; writes for that language are still possible.
    fn default_price_text_value(&self, language: &str) -> Option<KeyValue> {
        if !self.multi_language_enabled() {
            return None;
        }
        let language = language.trim();
        let mut value = String::new();
        let inner = self.inner.lock();
        if let Some(texts) =
            inner.document["CostAndPrice"]["DefaultPriceText"]["priceTexts"].as_array()
        {
            for entry in texts {
                if entry["language"].as_str() == Some(language) {
                    let mut projected = serde_json::Map::new();
                    projected.insert("priceText".to_string(), entry["priceText"].clone());
                    if !entry["priceTextOffline"].is_null() {
                        projected.insert(
                            "priceTextOffline".to_string(),
                            entry["priceTextOffline"].clone(),
                        );
                    }
                    value = Value::Object(projected).to_string();
                }
            }
        }
        Some(KeyValue {
            key: format!("DefaultPriceText,{language}"),
            readonly: false,
            value: Some(value),
        })
    }

    fn set_default_price_text(&self, language: &str, value: &str) -> Option<ConfigurationStatus> {
        if !self.multi_language_enabled() {
            return None;
        }
        let language = language.trim();
        if !self.supported_languages().iter().any(|l| l == language) {
            warn!("rejected DefaultPriceText write: language {} is not supported", language);
            return Some(ConfigurationStatus::Rejected);
        }
        let Ok(mut entry) = serde_json::from_str::<Value>(value) else {
            return Some(ConfigurationStatus::Rejected);
        };
        if !entry.is_object() || entry.get("priceText").is_none() {
            warn!("rejected DefaultPriceText write: no priceText in value");
            return Some(ConfigurationStatus::Rejected);
        }
        entry["language"] = json!(language);

        let mut inner = self.inner.lock();
        let texts = &mut inner.document["CostAndPrice"]["DefaultPriceText"]["priceTexts"];
        if !texts.is_array() {
            *texts = Value::Array(Vec::new());
        }
        if let Some(list) = texts.as_array_mut() {
            if let Some(existing) = list
                .iter_mut()
                .find(|e| e["language"].as_str() == Some(language))
            {
                *existing = entry;
            } else {
                list.push(entry);
            }
        }
        let updated = inner.document["CostAndPrice"]["DefaultPriceText"].clone();
        if let Err(e) = inner
            .overlay
            .record("CostAndPrice", "DefaultPriceText", &updated)
        {
            warn!("could not persist DefaultPriceText to user configuration: {}", e);
        }
        Some(ConfigurationStatus::Accepted)
    }

    // ------------------------------------------------------------------
    // Typed getters for the connectivity layer
    // ------------------------------------------------------------------

    fn string_value(&self, section: &str, key: &str) -> Option<String> {
        let inner = self.inner.lock();
        inner
            .document
            .get(section)
            .and_then(|s| s.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn int_value(&self, section: &str, key: &str) -> Option<i64> {
        let inner = self.inner.lock();
        inner
            .document
            .get(section)
            .and_then(|s| s.get(key))
            .and_then(Value::as_i64)
    }

    fn bool_value(&self, section: &str, key: &str) -> Option<bool> {
        let inner = self.inner.lock();
        inner
            .document
            .get(section)
            .and_then(|s| s.get(key))
            .and_then(Value::as_bool)
    }

    fn cipher_list(&self, key: &str) -> Option<String> {
        let inner = self.inner.lock();
        match inner.document.get("Internal").and_then(|s| s.get(key))? {
            Value::String(s) => Some(s.clone()),
            Value::Array(list) => Some(
                list.iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(":"),
            ),
            _ => None,
        }
    }

    pub fn charge_point_id(&self) -> String {
        self.string_value("Internal", "ChargePointId")
            .unwrap_or_default()
    }

    pub fn central_system_uri(&self) -> String {
        self.string_value("Internal", "CentralSystemURI")
            .unwrap_or_default()
    }

    pub fn security_profile(&self) -> i64 {
        self.int_value("Security", "SecurityProfile").unwrap_or(0)
    }

    /// The HTTP Basic credential. Readable internally only; the key is
    /// write-only on the OCPP surface.
    pub fn authorization_key(&self) -> Option<String> {
        self.string_value("Security", "AuthorizationKey")
    }

    /// TLS 1.2 cipher list in OpenSSL notation, colon separated.
    pub fn supported_ciphers12(&self) -> Option<String> {
        self.cipher_list("SupportedCiphers12")
    }

    /// TLS 1.3 cipher suite list, colon separated.
    pub fn supported_ciphers13(&self) -> Option<String> {
        self.cipher_list("SupportedCiphers13")
    }

    /// WebSocket ping cadence in seconds; 0 disables pings.
    pub fn websocket_ping_interval(&self) -> u64 {
        self.int_value("Core", "WebSocketPingInterval")
            .map(|n| n.max(0) as u64)
            .unwrap_or(0)
    }

    /// Fixed reconnect delay in seconds.
    pub fn websocket_reconnect_interval(&self) -> u64 {
        self.int_value("Internal", "WebsocketReconnectInterval")
            .map(|n| n.max(0) as u64)
            .unwrap_or(10)
    }

    pub fn use_ssl_default_verify_paths(&self) -> bool {
        self.bool_value("Internal", "UseSslDefaultVerifyPaths")
            .unwrap_or(true)
    }

    pub fn verify_csms_common_name(&self) -> bool {
        self.bool_value("Internal", "VerifyCsmsCommonName")
            .unwrap_or(true)
    }

    pub fn verify_csms_allow_wildcards(&self) -> bool {
        self.bool_value("Internal", "VerifyCsmsAllowWildcards")
            .unwrap_or(false)
    }

    pub fn number_of_connectors(&self) -> u32 {
        self.int_value("Core", "NumberOfConnectors")
            .map(|n| n.max(0) as u32)
            .unwrap_or(1)
    }

    pub fn charge_point_model(&self) -> String {
        self.string_value("Internal", "ChargePointModel")
            .unwrap_or_default()
    }

    pub fn charge_point_vendor(&self) -> String {
        self.string_value("Internal", "ChargePointVendor")
            .unwrap_or_default()
    }

    pub fn firmware_version(&self) -> Option<String> {
        self.string_value("Internal", "FirmwareVersion")
    }

    pub fn charge_box_serial_number(&self) -> Option<String> {
        self.string_value("Internal", "ChargeBoxSerialNumber")
    }

    pub fn charge_point_serial_number(&self) -> Option<String> {
        self.string_value("Internal", "ChargePointSerialNumber")
    }

    pub fn iccid(&self) -> Option<String> {
        self.string_value("Internal", "ICCID")
    }

    pub fn imsi(&self) -> Option<String> {
        self.string_value("Internal", "IMSI")
    }

    pub fn meter_serial_number(&self) -> Option<String> {
        self.string_value("Internal", "MeterSerialNumber")
    }

    pub fn meter_type(&self) -> Option<String> {
        self.string_value("Internal", "MeterType")
    }

    /// Install the charge point identity reported in BootNotification.
    pub fn set_charge_point_information(
        &self,
        vendor: &str,
        model: &str,
        serial_number: Option<&str>,
        box_serial_number: Option<&str>,
        firmware_version: Option<&str>,
    ) {
        self.put_value("Internal", "ChargePointVendor", json!(vendor));
        self.put_value("Internal", "ChargePointModel", json!(model));
        if let Some(serial) = serial_number {
            self.put_value("Internal", "ChargePointSerialNumber", json!(serial));
        }
        if let Some(box_serial) = box_serial_number {
            self.put_value("Internal", "ChargeBoxSerialNumber", json!(box_serial));
        }
        if let Some(firmware) = firmware_version {
            self.put_value("Internal", "FirmwareVersion", json!(firmware));
        }
    }

    /// Install modem identity (ICCID / IMSI) if present.
    pub fn set_modem_information(&self, iccid: Option<&str>, imsi: Option<&str>) {
        if let Some(iccid) = iccid {
            self.put_value("Internal", "ICCID", json!(iccid));
        }
        if let Some(imsi) = imsi {
            self.put_value("Internal", "IMSI", json!(imsi));
        }
    }

    /// Install energy meter identity if present.
    pub fn set_meter_information(&self, serial_number: Option<&str>, meter_type: Option<&str>) {
        if let Some(serial) = serial_number {
            self.put_value("Internal", "MeterSerialNumber", json!(serial));
        }
        if let Some(kind) = meter_type {
            self.put_value("Internal", "MeterType", json!(kind));
        }
    }

    /// Expand a Core measurand list key into deduplicated
    /// (measurand, phase) pairs, skipping unsupported elements.
    pub fn measurands_with_phases(&self, key: &str) -> Vec<MeasurandWithPhase> {
        let Some(csv) = self.string_value("Core", key) else {
            return Vec::new();
        };
        let mut out: Vec<MeasurandWithPhase> = Vec::new();
        for element in validators::split_csv(&csv) {
            let Ok(measurand) = Measurand::from_str(element) else {
                warn!("{}: skipping unknown measurand {}", key, element);
                continue;
            };
            let Some(phases) = self.supported_measurands.get(&measurand) else {
                warn!("{}: skipping unsupported measurand {}", key, element);
                continue;
            };
            if phases.is_empty() {
                let entry = MeasurandWithPhase {
                    measurand,
                    phase: None,
                };
                if !out.contains(&entry) {
                    out.push(entry);
                }
            } else {
                for &phase in phases {
                    let entry = MeasurandWithPhase {
                        measurand,
                        phase: Some(phase),
                    };
                    if !out.contains(&entry) {
                        out.push(entry);
                    }
                }
            }
        }
        out
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn merge_overlay(document: &mut Value, user: &Value) {
    let Some(sections) = user.as_object() else {
        return;
    };
    for (section, keys) in sections {
        let Some(keys) = keys.as_object() else {
            continue;
        };
        for (key, value) in keys {
            document[section.as_str()][key.as_str()] = value.clone();
        }
    }
}

fn parse_meter_public_key_index(key: &str) -> Option<u32> {
    key.strip_prefix("MeterPublicKey[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}

fn parse_default_price_text_language(key: &str) -> Option<&str> {
    let language = key.strip_prefix("DefaultPriceText,")?;
    if language.is_empty() {
        return None;
    }
    Some(language)
}
