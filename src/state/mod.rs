use std::sync::Arc;
use std::time::Instant;

use sea_orm::DatabaseConnection;

use crate::admission::AdmissionGate;
use crate::config::AdmissionConfig;
use crate::store::SqlContractStore;

#[derive(Clone)]
pub struct AppState {
    pub database: DatabaseConnection,
    pub gate: Arc<AdmissionGate>,
    pub store: SqlContractStore,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(database: DatabaseConnection, admission: &AdmissionConfig) -> Self {
        let gate = Arc::new(AdmissionGate::new(
            admission.dedup_window(),
            admission.rate_window(),
            admission.rate_limit_max_requests,
        ));
        assert!(
            gate.dedup_window() == admission.dedup_window(),
            "Gate must carry the configured dedup window"
        );
        let store = SqlContractStore::new(database.clone());
        Self {
            database,
            gate,
            store,
            start_time: Instant::now(),
        }
    }
}
