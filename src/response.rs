use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::AppError;

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_NOT_FOUND: &str = "not found";
pub const STATUS_ERROR: &str = "error";

pub type ApiResult<T> = Result<JsonApiResponse<T>, AppError>;

/// Top-level JSON body of every response. Absent parts are left out of the
/// wire shape entirely rather than serialized as `null`.
#[derive(Debug, Serialize)]
pub struct JsonApiResponse<T: Serialize> {
    #[serde(skip)]
    pub code: StatusCode,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(rename = "resourceId", skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<u32>,
}

impl<T: Serialize> JsonApiResponse<T> {
    pub fn ok(data: T) -> ApiResult<T> {
        Ok(Self {
            code: StatusCode::OK,
            status: STATUS_SUCCESS,
            message: None,
            data: Some(data),
            resource_id: None,
        })
    }
}

impl JsonApiResponse<()> {
    pub fn message(message: impl Into<String>) -> ApiResult<()> {
        Ok(Self {
            code: StatusCode::OK,
            status: STATUS_SUCCESS,
            message: Some(message.into()),
            data: None,
            resource_id: None,
        })
    }

    pub fn created(message: impl Into<String>, resource_id: u32) -> ApiResult<()> {
        Ok(Self {
            code: StatusCode::CREATED,
            status: STATUS_SUCCESS,
            message: Some(message.into()),
            data: None,
            resource_id: Some(resource_id),
        })
    }

    pub(crate) fn from_error(err: &AppError) -> Self {
        let code = status_for(err);
        let status = if code == StatusCode::NOT_FOUND {
            STATUS_NOT_FOUND
        } else {
            STATUS_ERROR
        };
        Self {
            code,
            status,
            message: Some(err.message().to_string()),
            data: None,
            resource_id: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            log_app_error(&self, status);
        }
        JsonApiResponse::from_error(&self).into_response()
    }
}

impl<T: Serialize> IntoResponse for JsonApiResponse<T> {
    fn into_response(self) -> Response {
        (self.code, Json(self)).into_response()
    }
}

pub(crate) fn log_app_error(err: &AppError, status: StatusCode) {
    tracing::error!(status = status.as_u16(), message = %err.message(), "request failed");
}

pub(crate) fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::JsonApiResponse;
    use crate::error::AppError;

    #[test]
    fn created_envelope_carries_resource_id_and_no_data() {
        let response = JsonApiResponse::created("made", 12).expect("created is infallible");
        assert_eq!(response.code, StatusCode::CREATED);
        assert_eq!(
            serde_json::to_value(&response).expect("serialize"),
            json!({ "status": "success", "message": "made", "resourceId": 12 })
        );
    }

    #[test]
    fn data_envelope_omits_message() {
        let response = JsonApiResponse::ok(vec![1, 2]).expect("ok is infallible");
        assert_eq!(
            serde_json::to_value(&response).expect("serialize"),
            json!({ "status": "success", "data": [1, 2] })
        );
    }

    #[test]
    fn not_found_errors_use_the_not_found_status_label() {
        let body = JsonApiResponse::from_error(&AppError::todo_not_found());
        assert_eq!(body.code, StatusCode::NOT_FOUND);
        assert_eq!(
            serde_json::to_value(&body).expect("serialize"),
            json!({ "status": "not found", "message": "No todo found!" })
        );
    }

    #[test]
    fn other_errors_use_the_error_status_label() {
        let body = JsonApiResponse::from_error(&AppError::internal("boom"));
        assert_eq!(body.code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.status, "error");
    }
}
