//! Typed reads over the document store.
//!
//! Repos know record shapes and paths; they do not decide anything. Every
//! read returns the document version next to the value so the ledger can
//! condition its writes on exactly what it read.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::infra::db_errors::map_store_err;
use crate::store::{Document, Snapshot, StoreError};

pub mod clubs;
pub mod leagues;
pub mod matches;
pub mod paths;
pub mod standings;
pub mod users;

/// A record together with the store version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

impl<T> Versioned<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Versioned<U> {
        Versioned {
            version: self.version,
            value: f(self.value),
        }
    }
}

impl<T> std::ops::Deref for Versioned<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

pub(crate) fn decode<T: DeserializeOwned>(snap: Snapshot) -> Result<Versioned<T>, DomainError> {
    let path = snap.path.to_string();
    let value = serde_json::from_value(serde_json::Value::Object(snap.data)).map_err(|e| {
        map_store_err(StoreError::Corrupt {
            path,
            detail: e.to_string(),
        })
    })?;
    Ok(Versioned {
        version: snap.version,
        value,
    })
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Document, DomainError> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("record encoded to a non-object: {other}"),
        )),
        Err(e) => Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            e.to_string(),
        )),
    }
}
