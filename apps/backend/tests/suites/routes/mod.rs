pub mod clubs_requests;
pub mod leagues;
