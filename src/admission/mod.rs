//! Request deduplication and contract admission gate.
//!
//! Every contract-creation request passes the checks in a fixed order:
//! duplicate submission, structural validation, duplicate IMEI within the
//! request, IMEI conflict against active contracts, rate limit. Only a
//! request that passes all five is registered in the ledger and handed to
//! the downstream creation handler.
//!
//! The duplicate and conflict checks fail open: an infrastructure error
//! (poisoned ledger lock, unreachable database) is logged and treated as
//! "check passed", because order-entry availability outranks best-effort
//! duplicate suppression. Structural validation fails closed — its failures
//! mean the data itself is unsubmittable. A transient database error can
//! therefore admit a conflicting IMEI; that leniency is inherited from the
//! source system and recorded in DESIGN.md.

pub mod fingerprint;
pub mod ledger;
pub mod rate_limit;
pub mod validation;

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::models::installment::CreateContractRequest;
use crate::store::ContractStore;

use fingerprint::{RequestFingerprint, Requester};
use ledger::{LedgerTicket, RecentRequestLedger};
use rate_limit::RequestRateLimiter;

/// One named rejection per failed check. All are caller errors, never
/// surfaced as server faults.
#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionRejection {
    Duplicate { retry_after_secs: u64 },
    Validation { details: Vec<String> },
    DuplicateImei { imeis: Vec<String> },
    ImeiConflict { imei: String, contract_no: String },
    RateLimited { retry_after_secs: u64 },
}

impl AdmissionRejection {
    /// Machine-parseable code the calling UI branches on.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Duplicate { .. } => "DUPLICATE_SUBMISSION",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::DuplicateImei { .. } => "DUPLICATE_IMEI_IN_REQUEST",
            Self::ImeiConflict { .. } => "IMEI_ALREADY_IN_USE",
            Self::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
        }
    }
}

/// Outcome of a passed gate. The ticket is `None` when the ledger was
/// unavailable at admission time (fail-open path).
#[derive(Debug)]
pub struct Admission {
    pub ticket: Option<LedgerTicket>,
}

pub struct AdmissionGate {
    ledger: RecentRequestLedger,
    limiter: RequestRateLimiter,
}

impl AdmissionGate {
    pub fn new(dedup_window: Duration, rate_window: Duration, rate_max_requests: u32) -> Self {
        Self {
            ledger: RecentRequestLedger::new(dedup_window),
            limiter: RequestRateLimiter::new(rate_window, rate_max_requests),
        }
    }

    /// Runs all checks against the wall clock.
    pub async fn evaluate<S: ContractStore + Sync>(
        &self,
        store: &S,
        requester: &Requester,
        payload: &CreateContractRequest,
    ) -> Result<Admission, AdmissionRejection> {
        self.evaluate_at(Instant::now(), store, requester, payload)
            .await
    }

    /// Clock-explicit variant. The conflict query is the only await point.
    pub async fn evaluate_at<S: ContractStore + Sync>(
        &self,
        now: Instant,
        store: &S,
        requester: &Requester,
        payload: &CreateContractRequest,
    ) -> Result<Admission, AdmissionRejection> {
        // 1. Duplicate submission. Ledger unavailability is not a rejection.
        let fingerprint = RequestFingerprint::build(requester, payload);
        match self.ledger.duplicate_at(now, &fingerprint) {
            Ok(Some(retry_after)) => {
                warn!(
                    "Duplicate submission from {} rejected, retry in {}s",
                    requester.key(),
                    ceil_secs(retry_after)
                );
                return Err(AdmissionRejection::Duplicate {
                    retry_after_secs: ceil_secs(retry_after),
                });
            }
            Ok(None) => {}
            Err(err) => warn!("Skipping duplicate check: {err}"),
        }

        // 2. Structural validation. Fails closed.
        let details = validation::validate(payload);
        if !details.is_empty() {
            info!(
                "Validation rejected request from {}: {} violation(s)",
                requester.key(),
                details.len()
            );
            return Err(AdmissionRejection::Validation { details });
        }

        // One IMEI must not appear on two line items of the same request.
        let imeis = validation::duplicate_imeis(payload);
        if !imeis.is_empty() {
            return Err(AdmissionRejection::DuplicateImei { imeis });
        }

        // 3. IMEI conflicts against active contracts. Fails open on query
        // errors so a database hiccup cannot block order entry.
        for item in &payload.items {
            let Some(imei) = item.imei.as_deref().filter(|imei| !imei.is_empty()) else {
                continue;
            };
            match store.find_active_contract(imei).await {
                Ok(Some(contract_no)) => {
                    return Err(AdmissionRejection::ImeiConflict {
                        imei: imei.to_string(),
                        contract_no,
                    });
                }
                Ok(None) => {}
                Err(err) => warn!("Skipping conflict check for IMEI {imei}: {err}"),
            }
        }

        // 4. Rate limit. Administrators are exempt.
        if !requester.is_admin() {
            if let Err(retry_after) = self.limiter.check_at(now, &requester.key()) {
                warn!(
                    "Rate limit exceeded for {}, retry in {}s",
                    requester.key(),
                    ceil_secs(retry_after)
                );
                return Err(AdmissionRejection::RateLimited {
                    retry_after_secs: ceil_secs(retry_after),
                });
            }
        }

        // 5. Admit: register the fingerprint for the dedup window.
        let ticket = match self.ledger.admit_at(
            now,
            fingerprint,
            requester.key(),
            requester.addr,
        ) {
            Ok(ticket) => Some(ticket),
            Err(err) => {
                warn!("Admitting without ledger entry: {err}");
                None
            }
        };

        Ok(Admission { ticket })
    }

    /// Releases a ledger entry early, e.g. when the downstream insert fails.
    pub fn release(&self, ticket: LedgerTicket) {
        self.ledger.expire(ticket);
    }

    /// One pass of ledger sweep and rate-limiter pruning.
    pub fn sweep(&self) {
        self.ledger.sweep();
        self.limiter.prune();
    }

    pub fn ledger_entries(&self) -> usize {
        self.ledger.entry_count()
    }

    pub fn limiter_keys(&self) -> usize {
        self.limiter.key_count()
    }

    pub fn dedup_window(&self) -> Duration {
        self.ledger.window()
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    let whole = duration.as_secs();
    if duration.subsec_nanos() > 0 { whole + 1 } else { whole }
}
