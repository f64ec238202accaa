//! Claims carried by backend-issued access tokens.

use serde::{Deserialize, Serialize};

use crate::domain::Actor;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// The identity provider's subject; becomes the user id
    pub sub: String,
    #[serde(default)]
    pub username: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

impl Claims {
    pub fn actor(&self) -> Actor {
        Actor::new(self.sub.as_str(), self.username.as_str())
    }
}
