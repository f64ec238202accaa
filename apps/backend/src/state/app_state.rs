use std::sync::Arc;

use super::security_config::SecurityConfig;
use crate::ledger::MembershipLedger;
use crate::services::Services;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Engine operations, all wired to one membership ledger
    pub services: Services,
    /// Direct ledger handle for health probes
    pub ledger: Arc<MembershipLedger>,
    /// Security configuration including JWT settings
    pub security: SecurityConfig,
}

impl AppState {
    pub fn new(ledger: Arc<MembershipLedger>, services: Services, security: SecurityConfig) -> Self {
        Self {
            services,
            ledger,
            security,
        }
    }
}
