use axum::response::{IntoResponse, Response};
use http::{header, HeaderValue, StatusCode};

/// Outcome of asking the backend to process an access link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedemptionResult {
    Success {
        api_key: String,
        token_valid_for_days: u32,
    },
    Failure {
        message: String,
    },
}

/// A `302 Found` response with the cookies it should set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub location: String,
    pub set_cookies: Vec<String>,
}

impl Redirection {
    pub fn new(location: String, set_cookies: Vec<String>) -> Self {
        Self {
            location,
            set_cookies,
        }
    }
}

impl IntoResponse for Redirection {
    fn into_response(self) -> Response {
        let mut response = StatusCode::FOUND.into_response();
        let headers = response.headers_mut();

        match HeaderValue::from_str(&self.location) {
            Ok(location) => {
                headers.insert(header::LOCATION, location);
            }
            Err(error) => {
                // safe_redirect only yields header-safe paths
                tracing::error!(%error, "redirect location is not a valid header value");
                headers.insert(header::LOCATION, HeaderValue::from_static("/"));
            }
        }

        for cookie in self.set_cookies {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    headers.append(header::SET_COOKIE, value);
                }
                Err(error) => tracing::error!(%error, "dropping cookie with invalid header value"),
            }
        }

        response
    }
}
