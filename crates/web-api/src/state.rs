use std::sync::Arc;

use application::HubHandle;
use config::HubConfig;

use crate::JwtService;

#[derive(Clone)]
pub struct AppState {
    pub hub: HubHandle,
    pub jwt_service: Arc<JwtService>,
    pub hub_config: HubConfig,
}

impl AppState {
    pub fn new(hub: HubHandle, jwt_service: Arc<JwtService>, hub_config: HubConfig) -> Self {
        Self {
            hub,
            jwt_service,
            hub_config,
        }
    }
}
