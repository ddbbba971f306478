use std::sync::Arc;

pub mod handlers;
pub mod router;
pub mod types;

pub use router::create_router;
pub use types::*;

use crate::alerts::AlertFetcher;
use crate::config::NotifierConfig;

pub struct ApiState {
    pub fetcher: AlertFetcher,
    pub config: Arc<NotifierConfig>,
}

impl ApiState {
    pub fn new(fetcher: AlertFetcher, config: Arc<NotifierConfig>) -> Self {
        Self { fetcher, config }
    }
}
