use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

/// Status kinds carried back to RPC callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCode {
    InvalidArgument,
    NotFound,
    Internal,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::InvalidArgument => "invalid argument",
            StatusCode::NotFound => "not found",
            StatusCode::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Wire form of a failed call: a kind plus a human readable message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct RpcStatus {
    pub code: StatusCode,
    pub message: String,
}

/// Failures of the directory operations
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidArgument(_) => StatusCode::InvalidArgument,
            ServiceError::NotFound(_) => StatusCode::NotFound,
            ServiceError::Internal(_) => StatusCode::Internal,
        }
    }

    pub fn bad_id() -> Self {
        Self::InvalidArgument("cannot parse post id".into())
    }

    pub fn missing(id: &str) -> Self {
        Self::NotFound(format!("no post with id {id}"))
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<ServiceError> for RpcStatus {
    fn from(err: ServiceError) -> Self {
        RpcStatus { code: err.code(), message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_kind_maps_to_its_status() {
        let cases = [
            (ServiceError::bad_id(), StatusCode::InvalidArgument),
            (ServiceError::missing("abc"), StatusCode::NotFound),
            (ServiceError::Internal("boom".into()), StatusCode::Internal),
        ];
        for (err, code) in cases {
            let status = RpcStatus::from(err);
            assert_eq!(status.code, code);
        }
    }

    #[test]
    fn store_failures_are_internal() {
        let err: ServiceError = StoreError::Write("disk full".into()).into();
        assert_eq!(err.code(), StatusCode::Internal);
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn status_display_names_the_kind() {
        let status = RpcStatus::from(ServiceError::missing("65f0"));
        assert_eq!(status.to_string(), "not found: no post with id 65f0");
    }
}
