use std::sync::Arc;

pub mod handlers;
pub mod router;
pub mod types;

pub use router::create_router;
pub use types::*;

use crate::config::ScannerConfig;
use crate::scan::QuotaScanner;

pub struct ApiState {
    pub scanner: Arc<QuotaScanner>,
    pub config: Arc<ScannerConfig>,
}

impl ApiState {
    pub fn new(scanner: Arc<QuotaScanner>, config: Arc<ScannerConfig>) -> Self {
        Self { scanner, config }
    }
}
