//! Synthetic responses served without touching the network.

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};
use url::Url;

use crate::rewrite::html::escape_html;

/// Body of every synthesized unavailable response.
pub const UNAVAILABLE_BODY: &str = "<h1>Service Unavailable</h1>";

/// A `302 Found` pointing the client at `urim`.
///
/// Returns `None` when `urim` cannot be carried in a `Location` header even
/// after URL serialization.
pub fn local_redirect(urim: &str) -> Option<Response<Body>> {
    let location = HeaderValue::from_str(urim).ok().or_else(|| {
        Url::parse(urim)
            .ok()
            .and_then(|url| HeaderValue::from_str(url.as_str()).ok())
    })?;

    let body = format!("<h1>Locally Redirecting</h1><p>{}</p>", escape_html(urim));
    let mut response = html_response(StatusCode::FOUND, body);
    let headers = response.headers_mut();
    headers.insert(header::LOCATION, location);
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    Some(response)
}

/// The `503 Service Unavailable` returned when a memento cannot be fetched.
pub fn service_unavailable() -> Response<Body> {
    html_response(StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE_BODY.to_string())
}

fn html_response(status: StatusCode, body: String) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
    response
}
