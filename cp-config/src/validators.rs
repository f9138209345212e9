//! Value validators for ChangeConfiguration writes
//!
//! Each validator answers "is this candidate string acceptable for the key"
//! and never errors; the store maps a failed validation to a `Rejected`
//! status. Per-element diagnostics go through `tracing`.

use std::collections::HashMap;
use std::str::FromStr;

use tracing::warn;

use crate::types::{Measurand, Phase};

/// Outcome of parsing a candidate positive integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntParse {
    Ok(i64),
    Negative,
    NotNumeric,
    OutOfRange,
}

/// Parse a candidate value as a non-negative integer, distinguishing the
/// rejection causes for logging.
pub fn parse_positive_integer(value: &str) -> IntParse {
    // a leading minus sign is numeric, one anywhere else is not
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return IntParse::NotNumeric;
    }
    match trimmed.parse::<i64>() {
        Ok(n) if n < 0 => IntParse::Negative,
        Ok(n) => IntParse::Ok(n),
        Err(_) => IntParse::OutOfRange,
    }
}

/// Case-insensitive boolean parsing ("true" / "false" only).
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Split a comma-separated list, dropping empty elements.
pub fn split_csv(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

const PHASE_ROTATIONS: [&str; 6] = ["RST", "RTS", "SRT", "STR", "TRS", "TSR"];

/// Validate a ConnectorPhaseRotation value against the live connector count.
///
/// Entries of the form `<n>.NotApplicable` and `<n>.Unknown` are allowed and
/// skipped; every remaining entry must be exactly `<n>.<rotation>` with a
/// connector id in `0..=num_connectors` and a known three-letter rotation.
pub fn validate_connector_phase_rotation(value: &str, num_connectors: u32) -> bool {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    for entry in compact.split(',').filter(|s| !s.is_empty()) {
        let Some((connector, rotation)) = entry.split_once('.') else {
            return false;
        };
        let Ok(connector) = connector.parse::<u32>() else {
            return false;
        };
        if connector > num_connectors {
            return false;
        }
        if rotation == "NotApplicable" || rotation == "Unknown" {
            continue;
        }
        if !PHASE_ROTATIONS.contains(&rotation) {
            return false;
        }
    }
    true
}

/// Validate a ConnectorEvseIds value: each id between 7 and 37 characters,
/// whole list at most 1000 characters.
pub fn validate_evse_ids(value: &str) -> bool {
    if value.len() > 1000 {
        return false;
    }
    let ids = split_csv(value);
    if ids.is_empty() {
        return false;
    }
    ids.iter().all(|id| (7..=37).contains(&id.len()))
}

/// SECC leaf certificate subject common name (7..=64 characters).
pub fn validate_leaf_subject_common_name(value: &str) -> bool {
    (7..=64).contains(&value.len())
}

/// SECC leaf certificate subject country code (exactly 2 characters).
pub fn validate_leaf_subject_country(value: &str) -> bool {
    value.len() == 2
}

/// SECC leaf certificate subject organization (up to 64 characters).
pub fn validate_leaf_subject_organization(value: &str) -> bool {
    value.len() <= 64
}

/// Validate a measurand CSV against the supported measurand set, logging
/// every unsupported element.
pub fn validate_measurand_csv(
    value: &str,
    supported: &HashMap<Measurand, Vec<Phase>>,
) -> bool {
    let mut valid = true;
    for element in split_csv(value) {
        match Measurand::from_str(element) {
            Ok(measurand) if supported.contains_key(&measurand) => {}
            Ok(_) => {
                warn!("measurand {} is not supported on this charge point", element);
                valid = false;
            }
            Err(_) => {
                warn!("{} is not a known measurand", element);
                valid = false;
            }
        }
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive_integer() {
        assert_eq!(parse_positive_integer("42"), IntParse::Ok(42));
        assert_eq!(parse_positive_integer(" 0 "), IntParse::Ok(0));
        assert_eq!(parse_positive_integer("-5"), IntParse::Negative);
        assert_eq!(parse_positive_integer("12.5"), IntParse::NotNumeric);
        assert_eq!(parse_positive_integer("abc"), IntParse::NotNumeric);
        // a minus sign is only numeric in the leading position
        assert_eq!(parse_positive_integer("1-2"), IntParse::NotNumeric);
        assert_eq!(parse_positive_integer("-"), IntParse::NotNumeric);
        assert_eq!(parse_positive_integer("5-"), IntParse::NotNumeric);
        assert_eq!(
            parse_positive_integer("99999999999999999999999"),
            IntParse::OutOfRange
        );
    }

    #[test]
    fn test_parse_bool_case_insensitive() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("FALSE"), Some(false));
        assert_eq!(parse_bool("True"), Some(true));
        assert_eq!(parse_bool("yes"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_phase_rotation() {
        assert!(validate_connector_phase_rotation("0.RST, 1.RST, 2.RTS", 2));
        assert!(validate_connector_phase_rotation("1.NotApplicable,2.Unknown", 2));
        // connector id beyond the installed count
        assert!(!validate_connector_phase_rotation("3.RST", 2));
        // unknown rotation
        assert!(!validate_connector_phase_rotation("1.RSX", 2));
        // malformed entry
        assert!(!validate_connector_phase_rotation("1RST", 2));
    }

    #[test]
    fn test_evse_ids() {
        assert!(validate_evse_ids("DE*ICE*E0001,DE*ICE*E0002"));
        assert!(!validate_evse_ids("short"));
        assert!(!validate_evse_ids(""));
        let too_long = "DE*ICE*E0001,".repeat(100);
        assert!(!validate_evse_ids(&too_long));
    }

    #[test]
    fn test_leaf_subject() {
        assert!(validate_leaf_subject_common_name("cp.example.com"));
        assert!(!validate_leaf_subject_common_name("cp"));
        assert!(validate_leaf_subject_country("DE"));
        assert!(!validate_leaf_subject_country("DEU"));
        assert!(validate_leaf_subject_organization("Example Operator GmbH"));
    }

    #[test]
    fn test_measurand_csv() {
        let mut supported = HashMap::new();
        supported.insert(Measurand::EnergyActiveImportRegister, vec![]);
        supported.insert(Measurand::Voltage, vec![]);
        assert!(validate_measurand_csv(
            "Energy.Active.Import.Register,Voltage",
            &supported
        ));
        assert!(!validate_measurand_csv("Voltage,Temperature", &supported));
        assert!(!validate_measurand_csv("NotAMeasurand", &supported));
    }
}
