//! Correlation codes and bridge target identifiers.
//!
//! Two independent random namespaces:
//! - `CorrelationCode`: numeric, pairs one outbound call with its completion.
//! - `BridgeTargetId`: alphanumeric, names the dispatcher instance the script
//!   runtime calls back into.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Correlation code for one outstanding call.
///
/// Opaque to the script runtime; it is echoed back verbatim with the
/// completion. Only valid while the call is pending.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationCode(String);

impl CorrelationCode {
    /// Wrap an existing code (e.g. one echoed back by the transport).
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Uniform-random decimal code of `len` digits, leading zeros kept.
    pub fn random_numeric<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Self {
        let code = (0..len)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CorrelationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CorrelationCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl From<String> for CorrelationCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl Borrow<str> for CorrelationCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CorrelationCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier under which a dispatcher registers its callback channel with
/// the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BridgeTargetId(String);

impl BridgeTargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Random alphanumeric id of `len` characters.
    pub fn random(len: usize) -> Self {
        let id = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BridgeTargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
