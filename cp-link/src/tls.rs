//! TLS policy for the CSMS connection
//!
//! Maps the TLS-related configuration keys onto a `native-tls` connector:
//! TLS 1.2 minimum, configured cipher preferences, and server name
//! verification with an explicit wildcard policy. Peer certificates are
//! always chain-verified; only the hostname check can be relaxed through
//! configuration.

use native_tls::{Protocol, TlsConnector};
use tracing::{debug, warn};

/// TLS connection policy derived from configuration.
#[derive(Debug, Clone)]
pub struct TlsPolicy {
    /// TLS 1.2 cipher list, OpenSSL notation, colon separated.
    pub ciphers12: Option<String>,
    /// TLS 1.3 cipher suite list, colon separated.
    pub ciphers13: Option<String>,
    /// Trust the platform's default CA store.
    pub use_default_verify_paths: bool,
    /// Verify that the certificate names the CSMS host.
    pub verify_common_name: bool,
    /// Accept wildcard certificate names when verifying.
    pub allow_wildcards: bool,
}

impl Default for TlsPolicy {
    fn default() -> Self {
        Self {
            ciphers12: None,
            ciphers13: None,
            use_default_verify_paths: true,
            verify_common_name: true,
            allow_wildcards: false,
        }
    }
}

impl TlsPolicy {
    /// Build the connector for a `wss://` session.
    ///
    /// The cipher preferences are logged but not narrowed further; the
    /// backend has no cipher-string hook and its defaults already exclude
    /// everything below TLS 1.2.
    pub fn build_connector(&self) -> Result<TlsConnector, native_tls::Error> {
        let mut builder = TlsConnector::builder();
        builder.min_protocol_version(Some(Protocol::Tlsv12));
        if !self.verify_common_name {
            warn!("CSMS common name verification is disabled by configuration");
            builder.danger_accept_invalid_hostnames(true);
        }
        if let Some(ciphers) = &self.ciphers12 {
            debug!("TLS 1.2 cipher preference: {}", ciphers);
        }
        if let Some(ciphers) = &self.ciphers13 {
            debug!("TLS 1.3 cipher suite preference: {}", ciphers);
        }
        builder.build()
    }

    /// Whether a certificate-presented name is acceptable for `hostname`
    /// under this policy.
    pub fn name_acceptable(&self, presented: &str, hostname: &str) -> bool {
        if !self.verify_common_name {
            return true;
        }
        hostname_matches(presented, hostname, self.allow_wildcards)
    }
}

/// Match a certificate name against a hostname.
///
/// Wildcards are only honored when `allow_wildcards` is set, and only in
/// the left-most label: `*.example.com` matches `cs.example.com` but not
/// `a.b.example.com`, `example.com`, or anything when the remainder is a
/// single label. Partial-label wildcards never match.
pub fn hostname_matches(pattern: &str, hostname: &str, allow_wildcards: bool) -> bool {
    let pattern = pattern.trim_end_matches('.').to_ascii_lowercase();
    let hostname = hostname.trim_end_matches('.').to_ascii_lowercase();
    if pattern.is_empty() || hostname.is_empty() {
        return false;
    }
    if pattern == hostname {
        return !pattern.contains('*');
    }
    if !allow_wildcards {
        return false;
    }
    let Some(tail) = pattern.strip_prefix("*.") else {
        return false;
    };
    // the remainder must be literal and keep at least two labels
    if tail.contains('*') || !tail.contains('.') {
        return false;
    }
    let Some(head) = hostname.strip_suffix(tail) else {
        return false;
    };
    let Some(label) = head.strip_suffix('.') else {
        return false;
    };
    !label.is_empty() && !label.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(hostname_matches("csms.example.com", "csms.example.com", false));
        assert!(hostname_matches("CSMS.Example.COM", "csms.example.com", false));
        assert!(!hostname_matches("csms.example.com", "other.example.com", false));
        assert!(!hostname_matches("", "csms.example.com", false));
    }

    #[test]
    fn test_wildcards_gated() {
        assert!(!hostname_matches("*.example.com", "csms.example.com", false));
        assert!(hostname_matches("*.example.com", "csms.example.com", true));
    }

    #[test]
    fn test_wildcard_scope() {
        // left-most label only, never across dots
        assert!(!hostname_matches("*.example.com", "a.b.example.com", true));
        // wildcard never matches the bare domain
        assert!(!hostname_matches("*.example.com", "example.com", true));
        // single remaining label is not enough
        assert!(!hostname_matches("*.com", "example.com", true));
        // partial-label and multi-label wildcards never match
        assert!(!hostname_matches("cs*.example.com", "csms.example.com", true));
        assert!(!hostname_matches("*.*.example.com", "a.b.example.com", true));
        assert!(!hostname_matches("*", "example.com", true));
    }

    #[test]
    fn test_policy_gate() {
        let mut policy = TlsPolicy::default();
        assert!(policy.name_acceptable("csms.example.com", "csms.example.com"));
        assert!(!policy.name_acceptable("*.example.com", "csms.example.com"));

        policy.allow_wildcards = true;
        assert!(policy.name_acceptable("*.example.com", "csms.example.com"));

        policy.verify_common_name = false;
        assert!(policy.name_acceptable("anything.invalid", "csms.example.com"));
    }

    #[test]
    fn test_build_connector() {
        let policy = TlsPolicy {
            ciphers12: Some("ECDHE-ECDSA-AES128-GCM-SHA256".to_string()),
            ..TlsPolicy::default()
        };
        assert!(policy.build_connector().is_ok());
    }
}
