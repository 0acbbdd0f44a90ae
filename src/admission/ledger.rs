//! In-memory sliding-window ledger of recently admitted request fingerprints.
//!
//! Best-effort, single-process duplicate suppression: a process restart
//! clears the ledger, and with multiple worker processes each one sees only
//! its own admissions. Correctness against double contract creation is
//! carried by the persistence-layer IMEI conflict check, not by this ledger.
//!
//! Entries expire by sweep-on-access: every lookup first discards entries
//! older than the window, so a stale entry can never produce a false
//! positive. A periodic background sweep keeps the ledger small between
//! requests.

use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use super::fingerprint::RequestFingerprint;

/// Raised when the ledger cannot be consulted (poisoned lock). The admission
/// policy treats this as "check passed" rather than blocking order entry.
#[derive(Debug, Error)]
#[error("recent-request ledger unavailable")]
pub struct LedgerUnavailable;

/// Removal handle for one admitted entry, distinct from the fingerprint:
/// the fingerprint is the compared value, the ticket is only for storage
/// and early removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerTicket(u64);

#[derive(Debug)]
pub struct LedgerEntry {
    ticket: u64,
    fingerprint: RequestFingerprint,
    admitted_at: Instant,
    requester: String,
    addr: IpAddr,
}

impl LedgerEntry {
    pub fn requester(&self) -> &str {
        &self.requester
    }
}

/// Drops every entry older than `window` as of `now`. Pure function of the
/// entry list and the clock, shared by lookups and the background sweep.
pub fn sweep_entries(entries: &mut Vec<LedgerEntry>, now: Instant, window: Duration) -> usize {
    let before = entries.len();
    entries.retain(|entry| now.duration_since(entry.admitted_at) <= window);
    before - entries.len()
}

#[derive(Debug, Default)]
struct LedgerInner {
    next_ticket: u64,
    entries: Vec<LedgerEntry>,
}

pub struct RecentRequestLedger {
    window: Duration,
    inner: Mutex<LedgerInner>,
}

impl RecentRequestLedger {
    pub fn new(window: Duration) -> Self {
        assert!(window > Duration::ZERO, "Dedup window must be positive");
        assert!(
            window <= Duration::from_secs(3600),
            "Dedup window exceeds defensive limit"
        );
        Self {
            window,
            inner: Mutex::new(LedgerInner::default()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns the remaining retry-after for a live identical fingerprint,
    /// or `None` when the request is not a duplicate. Sweeps expired entries
    /// before comparing.
    pub fn duplicate(
        &self,
        fingerprint: &RequestFingerprint,
    ) -> Result<Option<Duration>, LedgerUnavailable> {
        self.duplicate_at(Instant::now(), fingerprint)
    }

    pub fn duplicate_at(
        &self,
        now: Instant,
        fingerprint: &RequestFingerprint,
    ) -> Result<Option<Duration>, LedgerUnavailable> {
        let mut inner = self.inner.lock().map_err(|_| LedgerUnavailable)?;
        sweep_entries(&mut inner.entries, now, self.window);

        let hit = inner
            .entries
            .iter()
            .find(|entry| entry.fingerprint == *fingerprint)
            .map(|entry| {
                let elapsed = now.duration_since(entry.admitted_at);
                debug!(
                    "Duplicate fingerprint from {} ({}) admitted {}ms ago",
                    entry.requester,
                    entry.addr,
                    elapsed.as_millis()
                );
                self.window.saturating_sub(elapsed)
            });
        Ok(hit)
    }

    /// Records an admitted fingerprint stamped `now`. Uniqueness is not
    /// enforced here: distinct fingerprints from one requester may coexist.
    pub fn admit(
        &self,
        fingerprint: RequestFingerprint,
        requester: String,
        addr: IpAddr,
    ) -> Result<LedgerTicket, LedgerUnavailable> {
        self.admit_at(Instant::now(), fingerprint, requester, addr)
    }

    pub fn admit_at(
        &self,
        now: Instant,
        fingerprint: RequestFingerprint,
        requester: String,
        addr: IpAddr,
    ) -> Result<LedgerTicket, LedgerUnavailable> {
        let mut inner = self.inner.lock().map_err(|_| LedgerUnavailable)?;
        let ticket = inner.next_ticket;
        inner.next_ticket = inner.next_ticket.wrapping_add(1);
        inner.entries.push(LedgerEntry {
            ticket,
            fingerprint,
            admitted_at: now,
            requester,
            addr,
        });
        Ok(LedgerTicket(ticket))
    }

    /// Removes an entry before its window elapses. Called when the downstream
    /// contract insert fails, so the operator can resubmit immediately.
    pub fn expire(&self, ticket: LedgerTicket) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.entries.retain(|entry| entry.ticket != ticket.0);
        }
    }

    /// Drops expired entries, returning how many were evicted.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        match self.inner.lock() {
            Ok(mut inner) => {
                let evicted = sweep_entries(&mut inner.entries, now, self.window);
                if evicted > 0 {
                    debug!("Ledger sweep evicted {evicted} expired entries");
                }
                evicted
            }
            Err(_) => 0,
        }
    }

    pub fn entry_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }
}
