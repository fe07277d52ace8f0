//! The fixed JSON shape every AJAX endpoint answers with.

use actix_web::HttpResponse;
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::error::AppError;

#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct AjaxResponse {
    pub success: bool,
    #[schema(example = "")]
    pub error: String,
    /// Re-rendered calendar fragment, when the call changed it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar: Option<String>,
}

impl AjaxResponse {
    pub fn ok() -> Self {
        AjaxResponse {
            success: true,
            error: String::new(),
            calendar: None,
        }
    }

    pub fn with_calendar(html: String) -> Self {
        AjaxResponse {
            calendar: Some(html),
            ..Self::ok()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        AjaxResponse {
            success: false,
            error: error.into(),
            calendar: None,
        }
    }
}

/// Folds recoverable errors into a `success=false` body; everything else
/// aborts the request with its own status.
pub fn respond<T: Serialize>(result: Result<T, AppError>) -> Result<HttpResponse, AppError> {
    match result {
        Ok(body) => Ok(HttpResponse::Ok().json(body)),
        Err(e) if e.is_recoverable() => {
            debug!(error = %e, "AJAX request rejected");
            Ok(HttpResponse::Ok().json(AjaxResponse::failure(e.to_string())))
        }
        Err(e) => Err(e),
    }
}
