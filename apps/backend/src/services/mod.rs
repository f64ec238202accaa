//! Engine operations. Each service reads through the Membership Ledger,
//! decides, and commits one change set.

use std::sync::Arc;

use crate::infra::analytics::Analytics;
use crate::infra::name_filter::NameFilter;
use crate::infra::remote_ops::RemoteOps;
use crate::ledger::MembershipLedger;

mod authz;
pub mod clubs;
pub mod leagues;
pub mod matches;
pub mod requests;
pub mod swap;

pub use clubs::{ClubService, Removal};
pub use leagues::{LeagueService, NewLeague};
pub use matches::{MatchService, MatchView};
pub use requests::RequestService;
pub use swap::RosterSwap;

/// Outside collaborators the engine calls into.
#[derive(Clone)]
pub struct Collaborators {
    pub analytics: Arc<dyn Analytics>,
    pub names: Arc<dyn NameFilter>,
    pub remote: Arc<dyn RemoteOps>,
}

/// Every engine operation, wired to one ledger.
#[derive(Clone)]
pub struct Services {
    pub leagues: Arc<LeagueService>,
    pub clubs: Arc<ClubService>,
    pub swaps: Arc<RosterSwap>,
    pub requests: Arc<RequestService>,
    pub matches: Arc<MatchService>,
}

impl Services {
    pub fn new(ledger: Arc<MembershipLedger>, deps: Collaborators) -> Self {
        Self {
            leagues: Arc::new(LeagueService::new(ledger.clone(), deps.clone())),
            clubs: Arc::new(ClubService::new(ledger.clone(), deps.clone())),
            swaps: Arc::new(RosterSwap::new(ledger.clone(), deps.analytics.clone())),
            requests: Arc::new(RequestService::new(ledger.clone(), deps.analytics.clone())),
            matches: Arc::new(MatchService::new(ledger, deps)),
        }
    }
}
