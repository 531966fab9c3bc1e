pub mod errors;
pub mod forms;
pub mod lead;
pub mod routes;
pub mod server;

use crate::{repo, services};

pub struct AppState {
    pub repo: repo::ImplLeadRepo,
    pub notification_service: services::ImplNotificationService,
    pub crm_service: services::ImplCrmService,
}
