use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use crisisbrief_common::CrisisBriefError;
use serde::Serialize;
use std::fmt;

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub category: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

/// [`CrisisBriefError`] rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub CrisisBriefError);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CrisisBriefError> for ApiError {
    fn from(err: CrisisBriefError) -> Self {
        Self(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.0.to_string(),
            category: self.0.category(),
            remediation: self.0.remediation().map(str::to_string),
        })
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
