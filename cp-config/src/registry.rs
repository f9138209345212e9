//! Static registry of OCPP 1.6 configuration keys
//!
//! Every key the store understands is described here: the feature profile
//! (and thus document section) it belongs to, whether it is writable, how
//! its value is typed, and which extra validation rule applies on writes.
//! Custom-profile keys are deliberately absent; they are described by the
//! Custom schema instead.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::types::FeatureProfile;

/// How a key's string value is typed in the configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Boolean,
    PositiveInteger,
    Text,
    CsvList,
    Json,
}

/// Extra validation applied on top of the value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRule {
    MeasurandCsv,
    PhaseRotation,
    EvseIdList,
    MinLength(usize),
    Minimum(i64),
    Maximum(i64),
    LeafSubjectCommonName,
    LeafSubjectCountry,
    LeafSubjectOrganization,
    SupportedLanguage,
}

/// Non-standard write behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Special {
    /// The key is never reported by reads; writes are accepted.
    WriteOnly,
    /// Writes are acknowledged without touching the stored value.
    AcceptNoop,
}

/// Description of a single configuration key.
#[derive(Debug, Clone, Copy)]
pub struct KeyDescriptor {
    pub name: &'static str,
    pub profile: FeatureProfile,
    pub read_only: bool,
    pub kind: ValueKind,
    pub rule: Option<ValueRule>,
    pub reboot_required: bool,
    pub special: Option<Special>,
}

impl KeyDescriptor {
    const fn ro(name: &'static str, profile: FeatureProfile, kind: ValueKind) -> Self {
        Self {
            name,
            profile,
            read_only: true,
            kind,
            rule: None,
            reboot_required: false,
            special: None,
        }
    }

    const fn rw(name: &'static str, profile: FeatureProfile, kind: ValueKind) -> Self {
        Self {
            read_only: false,
            ..Self::ro(name, profile, kind)
        }
    }

    const fn with_rule(mut self, rule: ValueRule) -> Self {
        self.rule = Some(rule);
        self
    }

    const fn reboots(mut self) -> Self {
        self.reboot_required = true;
        self
    }

    const fn write_only(mut self) -> Self {
        self.special = Some(Special::WriteOnly);
        self
    }

    const fn accept_noop(mut self) -> Self {
        self.special = Some(Special::AcceptNoop);
        self
    }
}

use FeatureProfile::*;
use ValueKind::*;

static KEYS: &[KeyDescriptor] = &[
    // ------------------------------------------------------------------
    // Internal
    // ------------------------------------------------------------------
    KeyDescriptor::ro("ChargePointId", Internal, Text),
    KeyDescriptor::rw("CentralSystemURI", Internal, Text).reboots(),
    KeyDescriptor::ro("ChargeBoxSerialNumber", Internal, Text),
    KeyDescriptor::ro("ChargePointModel", Internal, Text),
    KeyDescriptor::ro("ChargePointSerialNumber", Internal, Text),
    KeyDescriptor::ro("ChargePointVendor", Internal, Text),
    KeyDescriptor::ro("FirmwareVersion", Internal, Text),
    KeyDescriptor::ro("ICCID", Internal, Text),
    KeyDescriptor::ro("IMSI", Internal, Text),
    KeyDescriptor::ro("MeterSerialNumber", Internal, Text),
    KeyDescriptor::ro("MeterType", Internal, Text),
    KeyDescriptor::ro("SupportedCiphers12", Internal, CsvList),
    KeyDescriptor::ro("SupportedCiphers13", Internal, CsvList),
    KeyDescriptor::ro("UseSslDefaultVerifyPaths", Internal, Boolean),
    KeyDescriptor::ro("VerifyCsmsCommonName", Internal, Boolean),
    KeyDescriptor::rw("VerifyCsmsAllowWildcards", Internal, Boolean),
    KeyDescriptor::ro("WebsocketReconnectInterval", Internal, PositiveInteger),
    KeyDescriptor::ro("AuthorizeConnectorZeroOnConnectorOne", Internal, Boolean),
    KeyDescriptor::ro("LogMessages", Internal, Boolean),
    KeyDescriptor::ro("LogMessagesFormat", Internal, CsvList),
    KeyDescriptor::ro("LogRotation", Internal, Boolean),
    KeyDescriptor::ro("LogRotationDateSuffix", Internal, Boolean),
    KeyDescriptor::ro("LogRotationMaximumFileSize", Internal, PositiveInteger),
    KeyDescriptor::ro("LogRotationMaximumFileCount", Internal, PositiveInteger),
    KeyDescriptor::ro("SupportedChargingProfilePurposeTypes", Internal, CsvList),
    KeyDescriptor::ro("MaxCompositeScheduleDuration", Internal, PositiveInteger),
    KeyDescriptor::ro("SupportedMeasurands", Internal, CsvList),
    KeyDescriptor::ro("MaxMessageSize", Internal, PositiveInteger),
    KeyDescriptor::rw("RetryBackoffRandomRange", Internal, PositiveInteger),
    KeyDescriptor::rw("RetryBackoffRepeatTimes", Internal, PositiveInteger),
    KeyDescriptor::rw("RetryBackoffWaitMinimum", Internal, PositiveInteger),
    KeyDescriptor::rw("OcspRequestInterval", Internal, PositiveInteger)
        .with_rule(ValueRule::Minimum(86400)),
    KeyDescriptor::rw("SeccLeafSubjectCommonName", Internal, Text)
        .with_rule(ValueRule::LeafSubjectCommonName),
    KeyDescriptor::rw("SeccLeafSubjectCountry", Internal, Text)
        .with_rule(ValueRule::LeafSubjectCountry),
    KeyDescriptor::rw("SeccLeafSubjectOrganization", Internal, Text)
        .with_rule(ValueRule::LeafSubjectOrganization),
    KeyDescriptor::rw("ConnectorEvseIds", Internal, CsvList).with_rule(ValueRule::EvseIdList),
    KeyDescriptor::rw("AllowChargingProfileWithoutStartSchedule", Internal, Boolean),
    KeyDescriptor::rw("WaitForStopTransactionsOnResetTimeout", Internal, PositiveInteger),
    KeyDescriptor::ro("QueueAllMessages", Internal, Boolean),
    KeyDescriptor::ro("MessageTypesDiscardForQueueing", Internal, CsvList),
    KeyDescriptor::ro("MessageQueueSizeThreshold", Internal, PositiveInteger),
    KeyDescriptor::ro("WebsocketPingPayload", Internal, Text),
    KeyDescriptor::ro("WebsocketPongTimeout", Internal, PositiveInteger),
    // ------------------------------------------------------------------
    // Core
    // ------------------------------------------------------------------
    KeyDescriptor::rw("AllowOfflineTxForUnknownId", Core, Boolean),
    KeyDescriptor::rw("AuthorizationCacheEnabled", Core, Boolean),
    KeyDescriptor::rw("AuthorizeRemoteTxRequests", Core, Boolean),
    KeyDescriptor::rw("BlinkRepeat", Core, PositiveInteger),
    KeyDescriptor::rw("ClockAlignedDataInterval", Core, PositiveInteger),
    KeyDescriptor::rw("ConnectionTimeOut", Core, PositiveInteger),
    KeyDescriptor::rw("ConnectorPhaseRotation", Core, CsvList)
        .with_rule(ValueRule::PhaseRotation),
    KeyDescriptor::ro("ConnectorPhaseRotationMaxLength", Core, PositiveInteger),
    KeyDescriptor::ro("GetConfigurationMaxKeys", Core, PositiveInteger),
    KeyDescriptor::rw("HeartbeatInterval", Core, PositiveInteger),
    KeyDescriptor::rw("LightIntensity", Core, PositiveInteger).with_rule(ValueRule::Maximum(100)),
    KeyDescriptor::rw("LocalAuthorizeOffline", Core, Boolean),
    KeyDescriptor::rw("LocalPreAuthorize", Core, Boolean),
    KeyDescriptor::rw("MaxEnergyOnInvalidId", Core, PositiveInteger),
    KeyDescriptor::rw("MeterValuesAlignedData", Core, CsvList)
        .with_rule(ValueRule::MeasurandCsv),
    KeyDescriptor::ro("MeterValuesAlignedDataMaxLength", Core, PositiveInteger),
    KeyDescriptor::rw("MeterValuesSampledData", Core, CsvList)
        .with_rule(ValueRule::MeasurandCsv),
    KeyDescriptor::ro("MeterValuesSampledDataMaxLength", Core, PositiveInteger),
    KeyDescriptor::rw("MeterValueSampleInterval", Core, PositiveInteger),
    KeyDescriptor::rw("MinimumStatusDuration", Core, PositiveInteger),
    KeyDescriptor::ro("NumberOfConnectors", Core, PositiveInteger),
    KeyDescriptor::rw("ResetRetries", Core, PositiveInteger),
    KeyDescriptor::rw("StopTransactionOnEVSideDisconnect", Core, Boolean),
    KeyDescriptor::rw("StopTransactionOnInvalidId", Core, Boolean),
    KeyDescriptor::rw("StopTxnAlignedData", Core, CsvList).with_rule(ValueRule::MeasurandCsv),
    KeyDescriptor::ro("StopTxnAlignedDataMaxLength", Core, PositiveInteger),
    KeyDescriptor::rw("StopTxnSampledData", Core, CsvList).with_rule(ValueRule::MeasurandCsv),
    KeyDescriptor::ro("StopTxnSampledDataMaxLength", Core, PositiveInteger),
    KeyDescriptor::ro("SupportedFeatureProfiles", Core, CsvList),
    KeyDescriptor::ro("SupportedFeatureProfilesMaxLength", Core, PositiveInteger),
    KeyDescriptor::rw("TransactionMessageAttempts", Core, PositiveInteger),
    KeyDescriptor::rw("TransactionMessageRetryInterval", Core, PositiveInteger),
    KeyDescriptor::rw("UnlockConnectorOnEVSideDisconnect", Core, Boolean),
    KeyDescriptor::rw("WebSocketPingInterval", Core, PositiveInteger),
    // ------------------------------------------------------------------
    // SmartCharging
    // ------------------------------------------------------------------
    KeyDescriptor::ro("ChargeProfileMaxStackLevel", SmartCharging, PositiveInteger),
    KeyDescriptor::ro("ChargingScheduleAllowedChargingRateUnit", SmartCharging, CsvList),
    KeyDescriptor::ro("ChargingScheduleMaxPeriods", SmartCharging, PositiveInteger),
    KeyDescriptor::ro("ConnectorSwitch3to1PhaseSupported", SmartCharging, Boolean),
    KeyDescriptor::ro("MaxChargingProfilesInstalled", SmartCharging, PositiveInteger),
    // ------------------------------------------------------------------
    // LocalAuthListManagement
    // ------------------------------------------------------------------
    KeyDescriptor::rw("LocalAuthListEnabled", LocalAuthListManagement, Boolean),
    KeyDescriptor::ro("LocalAuthListMaxLength", LocalAuthListManagement, PositiveInteger),
    KeyDescriptor::ro("SendLocalListMaxLength", LocalAuthListManagement, PositiveInteger),
    // ------------------------------------------------------------------
    // Reservation
    // ------------------------------------------------------------------
    KeyDescriptor::ro("ReserveConnectorZeroSupported", Reservation, Boolean),
    // ------------------------------------------------------------------
    // FirmwareManagement
    // ------------------------------------------------------------------
    KeyDescriptor::ro("SupportedFileTransferProtocols", FirmwareManagement, CsvList),
    // ------------------------------------------------------------------
    // Security
    // ------------------------------------------------------------------
    KeyDescriptor::ro("AdditionalRootCertificateCheck", Security, Boolean),
    KeyDescriptor::rw("AuthorizationKey", Security, Text)
        .with_rule(ValueRule::MinLength(8))
        .write_only(),
    KeyDescriptor::ro("CertificateSignedMaxChainSize", Security, PositiveInteger),
    KeyDescriptor::ro("CertificateStoreMaxLength", Security, PositiveInteger),
    KeyDescriptor::rw("CpoName", Security, Text),
    KeyDescriptor::rw("SecurityProfile", Security, PositiveInteger).accept_noop(),
    KeyDescriptor::rw("DisableSecurityEventNotifications", Security, Boolean),
    // ------------------------------------------------------------------
    // PnC
    // ------------------------------------------------------------------
    KeyDescriptor::rw("ISO15118PnCEnabled", PnC, Boolean),
    KeyDescriptor::rw("CentralContractValidationAllowed", PnC, Boolean),
    KeyDescriptor::rw("ContractValidationOffline", PnC, Boolean),
    // ------------------------------------------------------------------
    // CostAndPrice
    // ------------------------------------------------------------------
    KeyDescriptor::ro("CustomDisplayCostAndPrice", CostAndPrice, Boolean),
    KeyDescriptor::rw("NumberOfDecimalsForCostValues", CostAndPrice, PositiveInteger),
    KeyDescriptor::rw("DefaultPrice", CostAndPrice, Json),
    KeyDescriptor::rw("TimeOffset", CostAndPrice, Text),
    KeyDescriptor::rw("NextTimeOffsetTransitionDateTime", CostAndPrice, Text),
    KeyDescriptor::rw("TimeOffsetNextTransition", CostAndPrice, Text),
    KeyDescriptor::ro("SupportedLanguages", CostAndPrice, CsvList),
    KeyDescriptor::rw("Language", CostAndPrice, Text).with_rule(ValueRule::SupportedLanguage),
    KeyDescriptor::rw("CustomIdleFeeAfterStop", CostAndPrice, Boolean),
    KeyDescriptor::ro("CustomMultiLanguageMessages", CostAndPrice, Boolean),
    KeyDescriptor::rw("WaitForSetUserPriceTimeout", CostAndPrice, PositiveInteger),
];

fn table() -> &'static HashMap<&'static str, &'static KeyDescriptor> {
    static TABLE: OnceLock<HashMap<&'static str, &'static KeyDescriptor>> = OnceLock::new();
    TABLE.get_or_init(|| KEYS.iter().map(|d| (d.name, d)).collect())
}

/// Look up the descriptor for a key name.
pub fn descriptor(name: &str) -> Option<&'static KeyDescriptor> {
    table().get(name).copied()
}

/// All registered keys, in declaration order.
pub fn descriptors() -> impl Iterator<Item = &'static KeyDescriptor> {
    KEYS.iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let d = descriptor("HeartbeatInterval").unwrap();
        assert_eq!(d.profile, FeatureProfile::Core);
        assert!(!d.read_only);
        assert_eq!(d.kind, ValueKind::PositiveInteger);
        assert!(descriptor("NoSuchKey").is_none());
    }

    #[test]
    fn test_no_duplicate_names() {
        assert_eq!(table().len(), KEYS.len());
    }

    #[test]
    fn test_write_only_authorization_key() {
        let d = descriptor("AuthorizationKey").unwrap();
        assert_eq!(d.special, Some(Special::WriteOnly));
        assert_eq!(d.rule, Some(ValueRule::MinLength(8)));
    }

    #[test]
    fn test_central_system_uri_requires_reboot() {
        let d = descriptor("CentralSystemURI").unwrap();
        assert!(d.reboot_required);
        assert!(!d.read_only);
    }
}
