//! Periodic background sweep of the admission gate.
//!
//! Lookups already sweep on access, so this task only bounds how long an
//! expired entry can linger in memory between requests.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::admission::AdmissionGate;

pub struct GateSweeper {
    gate: Arc<AdmissionGate>,
    interval: Duration,
}

impl GateSweeper {
    pub fn new(gate: Arc<AdmissionGate>, interval: Duration) -> Self {
        assert!(interval > Duration::ZERO, "Sweep interval must be positive");
        Self { gate, interval }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!("Starting admission gate sweep loop");
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    match changed {
                        Ok(_) => {
                            if *shutdown.borrow() {
                                info!("Sweeper shutdown signal received");
                                break;
                            }
                        }
                        Err(_) => {
                            warn!("Shutdown channel closed unexpectedly. Exiting sweep loop");
                            break;
                        }
                    }
                }
                _ = sleep(self.interval) => {
                    self.gate.sweep();
                }
            }
        }

        Ok(())
    }
}
