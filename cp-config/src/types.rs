//! OCPP 1.6 configuration data types
//!
//! Wire-visible types for GetConfiguration / ChangeConfiguration plus the
//! enumerations the configuration layer validates against: feature profiles,
//! measurands and phases.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum length of a configuration key name (CiString50).
pub const MAX_KEY_LENGTH: usize = 50;

/// Maximum length of a writable configuration value (CiString500).
pub const MAX_VALUE_LENGTH: usize = 500;

// ============================================================================
// Wire types
// ============================================================================

/// Result of a ChangeConfiguration write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ConfigurationStatus {
    Accepted,
    Rejected,
    RebootRequired,
    NotSupported,
}

/// A single entry in a GetConfiguration response.
///
/// `value` is absent for keys that exist but expose no readable value
/// (write-only keys are never reported at all).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub readonly: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

// ============================================================================
// Feature profiles
// ============================================================================

/// OCPP 1.6 feature profiles, including the vendor extensions carried in
/// the configuration document (`Internal`, `Security`, `PnC`, `CostAndPrice`,
/// `Custom`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureProfile {
    Internal,
    Core,
    FirmwareManagement,
    LocalAuthListManagement,
    Reservation,
    SmartCharging,
    RemoteTrigger,
    Security,
    PnC,
    CostAndPrice,
    Custom,
}

impl FeatureProfile {
    /// The section name under which this profile's keys live in the
    /// configuration document.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureProfile::Internal => "Internal",
            FeatureProfile::Core => "Core",
            FeatureProfile::FirmwareManagement => "FirmwareManagement",
            FeatureProfile::LocalAuthListManagement => "LocalAuthListManagement",
            FeatureProfile::Reservation => "Reservation",
            FeatureProfile::SmartCharging => "SmartCharging",
            FeatureProfile::RemoteTrigger => "RemoteTrigger",
            FeatureProfile::Security => "Security",
            FeatureProfile::PnC => "PnC",
            FeatureProfile::CostAndPrice => "CostAndPrice",
            FeatureProfile::Custom => "Custom",
        }
    }
}

impl fmt::Display for FeatureProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureProfile {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Internal" => Ok(FeatureProfile::Internal),
            "Core" => Ok(FeatureProfile::Core),
            "FirmwareManagement" => Ok(FeatureProfile::FirmwareManagement),
            "LocalAuthListManagement" => Ok(FeatureProfile::LocalAuthListManagement),
            "Reservation" => Ok(FeatureProfile::Reservation),
            "SmartCharging" => Ok(FeatureProfile::SmartCharging),
            "RemoteTrigger" => Ok(FeatureProfile::RemoteTrigger),
            "Security" => Ok(FeatureProfile::Security),
            "PnC" => Ok(FeatureProfile::PnC),
            "CostAndPrice" => Ok(FeatureProfile::CostAndPrice),
            "Custom" => Ok(FeatureProfile::Custom),
            _ => Err(()),
        }
    }
}

// ============================================================================
// Measurands and phases
// ============================================================================

/// Measurand types for meter values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Measurand {
    #[serde(rename = "Energy.Active.Import.Register")]
    EnergyActiveImportRegister,
    #[serde(rename = "Energy.Active.Export.Register")]
    EnergyActiveExportRegister,
    #[serde(rename = "Energy.Reactive.Import.Register")]
    EnergyReactiveImportRegister,
    #[serde(rename = "Energy.Reactive.Export.Register")]
    EnergyReactiveExportRegister,
    #[serde(rename = "Energy.Active.Import.Interval")]
    EnergyActiveImportInterval,
    #[serde(rename = "Energy.Active.Export.Interval")]
    EnergyActiveExportInterval,
    #[serde(rename = "Power.Active.Import")]
    PowerActiveImport,
    #[serde(rename = "Power.Active.Export")]
    PowerActiveExport,
    #[serde(rename = "Power.Reactive.Import")]
    PowerReactiveImport,
    #[serde(rename = "Power.Reactive.Export")]
    PowerReactiveExport,
    #[serde(rename = "Power.Offered")]
    PowerOffered,
    #[serde(rename = "Power.Factor")]
    PowerFactor,
    #[serde(rename = "Current.Import")]
    CurrentImport,
    #[serde(rename = "Current.Export")]
    CurrentExport,
    #[serde(rename = "Current.Offered")]
    CurrentOffered,
    Voltage,
    Frequency,
    Temperature,
    SoC,
    RPM,
}

impl Measurand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Measurand::EnergyActiveImportRegister => "Energy.Active.Import.Register",
            Measurand::EnergyActiveExportRegister => "Energy.Active.Export.Register",
            Measurand::EnergyReactiveImportRegister => "Energy.Reactive.Import.Register",
            Measurand::EnergyReactiveExportRegister => "Energy.Reactive.Export.Register",
            Measurand::EnergyActiveImportInterval => "Energy.Active.Import.Interval",
            Measurand::EnergyActiveExportInterval => "Energy.Active.Export.Interval",
            Measurand::PowerActiveImport => "Power.Active.Import",
            Measurand::PowerActiveExport => "Power.Active.Export",
            Measurand::PowerReactiveImport => "Power.Reactive.Import",
            Measurand::PowerReactiveExport => "Power.Reactive.Export",
            Measurand::PowerOffered => "Power.Offered",
            Measurand::PowerFactor => "Power.Factor",
            Measurand::CurrentImport => "Current.Import",
            Measurand::CurrentExport => "Current.Export",
            Measurand::CurrentOffered => "Current.Offered",
            Measurand::Voltage => "Voltage",
            Measurand::Frequency => "Frequency",
            Measurand::Temperature => "Temperature",
            Measurand::SoC => "SoC",
            Measurand::RPM => "RPM",
        }
    }
}

impl fmt::Display for Measurand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Measurand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Energy.Active.Import.Register" => Ok(Measurand::EnergyActiveImportRegister),
            "Energy.Active.Export.Register" => Ok(Measurand::EnergyActiveExportRegister),
            "Energy.Reactive.Import.Register" => Ok(Measurand::EnergyReactiveImportRegister),
            "Energy.Reactive.Export.Register" => Ok(Measurand::EnergyReactiveExportRegister),
            "Energy.Active.Import.Interval" => Ok(Measurand::EnergyActiveImportInterval),
            "Energy.Active.Export.Interval" => Ok(Measurand::EnergyActiveExportInterval),
            "Power.Active.Import" => Ok(Measurand::PowerActiveImport),
            "Power.Active.Export" => Ok(Measurand::PowerActiveExport),
            "Power.Reactive.Import" => Ok(Measurand::PowerReactiveImport),
            "Power.Reactive.Export" => Ok(Measurand::PowerReactiveExport),
            "Power.Offered" => Ok(Measurand::PowerOffered),
            "Power.Factor" => Ok(Measurand::PowerFactor),
            "Current.Import" => Ok(Measurand::CurrentImport),
            "Current.Export" => Ok(Measurand::CurrentExport),
            "Current.Offered" => Ok(Measurand::CurrentOffered),
            "Voltage" => Ok(Measurand::Voltage),
            "Frequency" => Ok(Measurand::Frequency),
            "Temperature" => Ok(Measurand::Temperature),
            "SoC" => Ok(Measurand::SoC),
            "RPM" => Ok(Measurand::RPM),
            _ => Err(()),
        }
    }
}

/// Electrical phase a measurand applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    L1,
    L2,
    L3,
    N,
    #[serde(rename = "L1-N")]
    L1N,
    #[serde(rename = "L2-N")]
    L2N,
    #[serde(rename = "L3-N")]
    L3N,
    #[serde(rename = "L1-L2")]
    L1L2,
    #[serde(rename = "L2-L3")]
    L2L3,
    #[serde(rename = "L3-L1")]
    L3L1,
}

/// A measurand paired with an optional phase, as expanded from a measurand
/// list key for meter-value consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeasurandWithPhase {
    pub measurand: Measurand,
    pub phase: Option<Phase>,
}
