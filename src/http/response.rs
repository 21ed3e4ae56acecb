//! Envelope responses and error mapping

use crate::controllers::Envelope;
use crate::Error;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// An envelope with its status code
pub struct Reply<T>(pub StatusCode, pub Envelope<T>);

impl<T> Reply<T> {
    pub fn ok(envelope: Envelope<T>) -> Self {
        Self(StatusCode::OK, envelope)
    }

    pub fn created(envelope: Envelope<T>) -> Self {
        Self(StatusCode::CREATED, envelope)
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if self.is_client_error() {
            self.to_string()
        } else {
            tracing::error!(error = %self, "request failed");
            INTERNAL_ERROR_MESSAGE.to_string()
        };

        (status, Json(Envelope::failure(message))).into_response()
    }
}

/// Unwrap a JSON body, turning any rejection into a 400 envelope
pub fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| Error::MalformedPayload(rejection.body_text()))
}
