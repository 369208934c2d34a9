//! Execution context and transport security resolution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where the worker process is running.
///
/// Read once at startup and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionContext {
    /// Local or editor-driven process, typically a developer machine
    Interactive,
    /// Deployed worker process without an interactive host
    Headless,
}

impl ExecutionContext {
    pub fn is_headless(self) -> bool {
        matches!(self, ExecutionContext::Headless)
    }
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionContext::Interactive => write!(f, "interactive"),
            ExecutionContext::Headless => write!(f, "headless"),
        }
    }
}

/// Security applied to a transport channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityMode {
    Insecure,
    Secure,
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityMode::Insecure => write!(f, "insecure"),
            SecurityMode::Secure => write!(f, "secure"),
        }
    }
}

impl FromStr for SecurityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "insecure" => Ok(SecurityMode::Insecure),
            "secure" | "tls" | "dtls" => Ok(SecurityMode::Secure),
            other => Err(format!("Invalid security type: {other}. Must be one of: insecure, secure")),
        }
    }
}

/// Resolves the security mode every transport channel should use.
pub struct SecurityPolicy;

impl SecurityPolicy {
    /// Resolves the security mode for `context`.
    ///
    /// Interactive processes connect to local deployments or to tunneled
    /// development deployments, neither of which can present certificates the
    /// developer is able to validate, so they are always [`SecurityMode::Insecure`]
    /// and `supplied` is ignored. Headless processes use whatever the external
    /// initializer supplied, falling back to [`SecurityMode::Secure`].
    pub fn resolve(context: ExecutionContext, supplied: Option<SecurityMode>) -> SecurityMode {
        match context {
            ExecutionContext::Interactive => SecurityMode::Insecure,
            ExecutionContext::Headless => supplied.unwrap_or(SecurityMode::Secure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interactive_is_always_insecure() {
        for supplied in [None, Some(SecurityMode::Insecure), Some(SecurityMode::Secure)] {
            assert_eq!(
                SecurityPolicy::resolve(ExecutionContext::Interactive, supplied),
                SecurityMode::Insecure
            );
        }
    }

    #[test]
    fn test_headless_defaults_to_secure() {
        assert_eq!(SecurityPolicy::resolve(ExecutionContext::Headless, None), SecurityMode::Secure);
    }

    #[test]
    fn test_headless_uses_supplied_mode() {
        assert_eq!(
            SecurityPolicy::resolve(ExecutionContext::Headless, Some(SecurityMode::Insecure)),
            SecurityMode::Insecure
        );
    }

    #[test]
    fn test_security_mode_parsing() {
        assert_eq!("Secure".parse::<SecurityMode>(), Ok(SecurityMode::Secure));
        assert_eq!("insecure".parse::<SecurityMode>(), Ok(SecurityMode::Insecure));
        assert!("plaintext".parse::<SecurityMode>().is_err());
    }
}
