pub mod meals;
pub mod nutrition;
pub mod preferences;

use axum::{http::StatusCode, Json};

use crate::error::ErrorBody;

/// Error half of every proxy handler.
pub type ProxyError = (StatusCode, Json<ErrorBody>);

pub type ProxyResult<T> = Result<Json<T>, ProxyError>;
