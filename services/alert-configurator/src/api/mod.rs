use std::sync::Arc;

pub mod handlers;
pub mod router;
pub mod types;

pub use router::create_router;
pub use types::*;

use crate::config::ConfiguratorConfig;
use crate::provision::Provisioner;

pub struct ApiState {
    pub provisioner: Provisioner,
    pub config: Arc<ConfiguratorConfig>,
}

impl ApiState {
    pub fn new(provisioner: Provisioner, config: Arc<ConfiguratorConfig>) -> Self {
        Self {
            provisioner,
            config,
        }
    }
}
