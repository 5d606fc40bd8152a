//! Call Registry - single source of truth for in-flight calls.
//!
//! Maps correlation codes to pending calls and issues the codes.
//!
//! Flow:
//! 1. Dispatcher calls `allocate_code()`
//! 2. Dispatcher calls `register()` with the pending call
//! 3. A completion arrives and the dispatcher calls `resolve()`, which removes
//!    and returns the entry exactly once

use crate::domain::{CorrelationCode, PendingCall};
use crate::error::BridgeError;
use crate::ports::CodeGenerator;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Default regeneration attempts on code collision
pub const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 8;

/// Statistics for the call registry
#[derive(Debug, Default)]
pub struct RegistryStats {
    /// Total calls registered
    pub total_registered: AtomicU64,
    /// Total calls resolved by a completion
    pub total_resolved: AtomicU64,
    /// Total calls removed by the expiry sweep
    pub total_expired: AtomicU64,
    /// Fresh codes that collided with a pending call
    pub code_collisions: AtomicU64,
}

/// Correlation table plus code issuance.
///
/// `register` and `resolve` are atomic with respect to each other and to
/// themselves; contention is limited to the shard holding the code.
pub struct CallRegistry {
    /// Map of correlation code to pending call
    pending: DashMap<CorrelationCode, PendingCall>,
    /// Unique-ID source
    codes: Arc<dyn CodeGenerator>,
    /// Attempts before giving up on a collision-free code
    max_code_attempts: u32,
    /// Statistics
    stats: RegistryStats,
}

impl CallRegistry {
    pub fn new(codes: Arc<dyn CodeGenerator>) -> Self {
        Self {
            pending: DashMap::new(),
            codes,
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
            stats: RegistryStats::default(),
        }
    }

    pub fn with_max_code_attempts(mut self, attempts: u32) -> Self {
        self.max_code_attempts = attempts.max(1);
        self
    }

    /// Draw a fresh correlation code.
    ///
    /// Regenerates while the code is already pending, up to the configured
    /// attempts. A code that still collides is returned anyway and rejected
    /// by `register`.
    pub fn allocate_code(&self) -> CorrelationCode {
        let mut code = self.codes.generate();
        let mut attempts = 1;

        while self.pending.contains_key(&code) && attempts < self.max_code_attempts {
            self.stats.code_collisions.fetch_add(1, Ordering::Relaxed);
            debug!(code = %code, attempt = attempts, "Correlation code collision, regenerating");
            code = self.codes.generate();
            attempts += 1;
        }

        code
    }

    /// Register a pending call under `code`.
    ///
    /// Fails with `DuplicateCorrelation` if the code is already pending.
    pub fn register(&self, code: CorrelationCode, call: PendingCall) -> Result<(), BridgeError> {
        match self.pending.entry(code) {
            Entry::Occupied(entry) => {
                error!(
                    code = %entry.key(),
                    function = %call.function,
                    "Correlation code already pending"
                );
                Err(BridgeError::DuplicateCorrelation(entry.key().clone()))
            }
            Entry::Vacant(entry) => {
                debug!(
                    code = %entry.key(),
                    function = %call.function,
                    "Registered pending call"
                );
                entry.insert(call);
                self.stats.total_registered.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
        }
    }

    /// Remove and return the call pending under `code`.
    ///
    /// `None` for unknown or already-resolved codes; that is not an error.
    pub fn resolve(&self, code: &str) -> Option<PendingCall> {
        let (_, call) = self.pending.remove(code)?;
        self.stats.total_resolved.fetch_add(1, Ordering::Relaxed);
        Some(call)
    }

    /// Remove calls whose timeout elapsed before `now`.
    pub fn remove_expired(&self, now: Instant) -> Vec<PendingCall> {
        let overdue: Vec<CorrelationCode> = self
            .pending
            .iter()
            .filter(|entry| entry.value().is_expired(now))
            .map(|entry| entry.key().clone())
            .collect();

        let mut expired = Vec::with_capacity(overdue.len());
        for code in overdue {
            // A completion may have won the race since the scan.
            if let Some((_, call)) = self.pending.remove_if(&code, |_, call| call.is_expired(now)) {
                warn!(
                    code = %code,
                    function = %call.function,
                    elapsed_ms = now.saturating_duration_since(call.created_at).as_millis() as u64,
                    "Removing expired pending call"
                );
                self.stats.total_expired.fetch_add(1, Ordering::Relaxed);
                expired.push(call);
            }
        }

        expired
    }

    /// Get number of currently pending calls
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check if a correlation code is pending (diagnostics only)
    pub fn is_pending(&self, code: &str) -> bool {
        self.pending.contains_key(code)
    }

    pub fn stats(&self) -> &RegistryStats {
        &self.stats
    }
}
