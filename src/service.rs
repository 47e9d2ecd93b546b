use std::{ops::Deref, sync::Arc};

use axum::response::{IntoResponse, Response};
use url::Url;

use crate::{
    backend::AccessLinkBackend,
    cookies::{self, ToastKind},
    redirect::safe_redirect,
    responses::{Redirection, RedemptionResult},
};

const MAX_ACCESS_LINK_ID_LENGTH: usize = 256;
const BACKEND_FAILURE_MESSAGE: &str = "Could not process the access link, please try again";

#[derive(Debug, PartialEq, Eq)]
pub enum AccessLinkIdValidationFailed {
    Empty,
    TooLong,
    ControlCharacters,
}

impl From<AccessLinkIdValidationFailed> for Response {
    fn from(value: AccessLinkIdValidationFailed) -> Self {
        let message = match value {
            AccessLinkIdValidationFailed::Empty => "access link id must not be empty",
            AccessLinkIdValidationFailed::TooLong => "access link id is too long",
            AccessLinkIdValidationFailed::ControlCharacters => {
                "access link id contains invalid characters"
            }
        };
        (http::StatusCode::BAD_REQUEST, message).into_response()
    }
}

#[derive(Debug, Clone)]
pub struct AccessLinkId(String);

impl Deref for AccessLinkId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<String> for AccessLinkId {
    type Error = AccessLinkIdValidationFailed;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err(AccessLinkIdValidationFailed::Empty);
        }

        if value.len() > MAX_ACCESS_LINK_ID_LENGTH {
            return Err(AccessLinkIdValidationFailed::TooLong);
        }

        if value.chars().any(char::is_control) {
            return Err(AccessLinkIdValidationFailed::ControlCharacters);
        }

        Ok(Self(value))
    }
}

/// Where redemptions land and how their cookies are marked.
#[derive(Debug, Clone)]
pub struct RedeemSettings {
    pub app_origin: Url,
    pub default_redirect_path: String,
    pub auth_path: String,
    pub cookie_secure: bool,
}

pub struct RedeemService {
    backend: Arc<dyn AccessLinkBackend>,
    settings: RedeemSettings,
}

impl RedeemService {
    pub fn new(backend: Arc<dyn AccessLinkBackend>, settings: RedeemSettings) -> Self {
        Self { backend, settings }
    }

    /// Exchanges `id` for a session. Backend errors end on the auth page like a rejection.
    #[tracing::instrument(skip_all, fields(redemption_id = %uuid::Uuid::new_v4()))]
    pub async fn redeem(&self, id: &AccessLinkId, redirect_to: Option<&str>) -> Redirection {
        let result = self.backend.process_access_link(id).await;

        match result {
            Ok(RedemptionResult::Success {
                api_key,
                token_valid_for_days,
            }) => {
                let location = safe_redirect(
                    redirect_to,
                    &self.settings.app_origin,
                    &self.settings.default_redirect_path,
                );
                tracing::info!(token_valid_for_days, %location, "access link redeemed");

                Redirection::new(
                    location,
                    vec![cookies::session_cookie(
                        &api_key,
                        token_valid_for_days,
                        self.settings.cookie_secure,
                        chrono::Utc::now(),
                    )],
                )
            }
            Ok(RedemptionResult::Failure { message }) => {
                tracing::warn!(reason = %message, "access link rejected");
                self.to_auth_page(&message)
            }
            Err(error) => {
                tracing::error!(%error, "failed to process access link");
                self.to_auth_page(BACKEND_FAILURE_MESSAGE)
            }
        }
    }

    fn to_auth_page(&self, message: &str) -> Redirection {
        Redirection::new(
            self.settings.auth_path.clone(),
            vec![
                cookies::clear_session_cookie(self.settings.cookie_secure),
                cookies::toast_cookie(ToastKind::Error, message, self.settings.cookie_secure),
            ],
        )
    }
}
