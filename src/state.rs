use crate::ledger::Aggregates;
use crate::models::StoreData;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Persisted data plus the aggregates derived from it, behind one lock so the
/// two can never be observed out of step.
#[derive(Debug)]
pub struct Shared {
    pub data: StoreData,
    pub aggregates: Aggregates,
}

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub shared: Arc<Mutex<Shared>>,
}

impl AppState {
    /// Builds the session state from a snapshot read, replaying the stored
    /// transaction list into fresh aggregates.
    pub fn new(data_path: PathBuf, data: StoreData) -> Self {
        let aggregates = Aggregates::replay(&data.transactions);
        Self {
            data_path,
            shared: Arc::new(Mutex::new(Shared { data, aggregates })),
        }
    }
}
