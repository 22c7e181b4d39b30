use axum::{
    body::{Bytes, to_bytes},
    extract::Request,
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    error::{AppError, NOT_FOUND_MESSAGE},
    response::{JsonApiResponse, log_app_error},
};

const MAX_ERROR_BODY_BYTES: usize = 16 * 1024;

/// Rewrites error responses that did not come from a handler (unmatched
/// routes, 405s, plain-text rejections) into the JSON envelope.
pub async fn json_error_middleware(req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    if is_json_response(&response) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let message = match to_bytes(body, MAX_ERROR_BODY_BYTES).await {
        Ok(bytes) => body_bytes_to_message(status, bytes),
        Err(_) => default_message(status),
    };
    let app_error = app_error_from_status(status, message);
    if status.is_server_error() {
        log_app_error(&app_error, status);
    }

    let mut new_response = JsonApiResponse::from_error(&app_error).into_response();
    copy_headers(&parts.headers, &mut new_response);
    new_response
}

fn is_json_response(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            let value = value.to_ascii_lowercase();
            value.contains("application/json") || value.contains("+json")
        })
        .unwrap_or(false)
}

fn body_bytes_to_message(status: StatusCode, bytes: Bytes) -> String {
    let message = String::from_utf8_lossy(&bytes).trim().to_string();
    if message.is_empty() {
        return default_message(status);
    }
    message
}

fn default_message(status: StatusCode) -> String {
    if status == StatusCode::NOT_FOUND {
        return NOT_FOUND_MESSAGE.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

fn app_error_from_status(status: StatusCode, message: String) -> AppError {
    match status {
        StatusCode::NOT_FOUND => AppError::not_found(message),
        StatusCode::METHOD_NOT_ALLOWED => AppError::method_not_allowed(message),
        _ if status.is_client_error() => AppError::bad_request(message),
        _ => AppError::internal(message),
    }
}

// Keeps e.g. the `allow` header of a 405.
fn copy_headers(src: &HeaderMap, dest: &mut Response) {
    for (name, value) in src {
        if name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH {
            continue;
        }
        dest.headers_mut().insert(name.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::{app_error_from_status, default_message};
    use crate::error::{AppError, NOT_FOUND_MESSAGE};

    #[test]
    fn unmatched_routes_get_the_todo_not_found_message() {
        assert_eq!(default_message(StatusCode::NOT_FOUND), NOT_FOUND_MESSAGE);
    }

    #[test]
    fn statuses_map_onto_matching_variants() {
        assert!(matches!(
            app_error_from_status(StatusCode::METHOD_NOT_ALLOWED, "nope".into()),
            AppError::MethodNotAllowed(_)
        ));
        assert!(matches!(
            app_error_from_status(StatusCode::UNSUPPORTED_MEDIA_TYPE, "nope".into()),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            app_error_from_status(StatusCode::BAD_GATEWAY, "nope".into()),
            AppError::Internal(_)
        ));
    }
}
