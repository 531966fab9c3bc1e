use derive_more::{Display, Error};
use log::{error, warn};
use ntex::{http, web};
use serde_json::json;

use crate::{consts, front::forms::lead::ValidationErrors};

#[derive(Debug, Display, Error)]
pub enum ApiError {
    Validation(#[error(not(source))] ValidationErrors),
    DuplicateSubscription,
    #[display("{public_message} ({detail})")]
    Unhandled {
        public_message: &'static str,
        detail: String,
    },
    UrlNotFound,
}

impl ApiError {
    /// Wraps an unexpected failure, only `public_message` is shown to the caller
    pub fn unhandled(public_message: &'static str, e: anyhow::Error) -> Self {
        ApiError::Unhandled {
            public_message,
            detail: format!("{e:#}"),
        }
    }
}

impl web::error::WebResponseError for ApiError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        let body = match self {
            ApiError::Validation(errors) => {
                warn!("rejected invalid submission: {:?}", errors.kinds());
                json!({ "message": errors.first_message(), "errors": errors })
            }
            ApiError::DuplicateSubscription => json!({
                "message": consts::ALREADY_SUBSCRIBED_MESSAGE,
                "alreadySubscribed": true,
            }),
            ApiError::Unhandled {
                public_message,
                detail,
            } => {
                error!("[UnhandledError] {detail}");
                json!({ "message": public_message })
            }
            ApiError::UrlNotFound => json!({ "message": "Not found" }),
        };

        web::HttpResponse::build(self.status_code()).json(&body)
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            ApiError::Validation(_) => http::StatusCode::BAD_REQUEST,
            ApiError::DuplicateSubscription => http::StatusCode::CONFLICT,
            ApiError::Unhandled { .. } => http::StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UrlNotFound => http::StatusCode::NOT_FOUND,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}
