use std::time::Duration;

use axum::async_trait;
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::responses::RedemptionResult;

const PROCESS_ACCESS_LINK: &str = include_str!("../queries/process_access_link.graphql");

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status code: {0}")]
    UnexpectedStatus(StatusCode),
    #[error("graphql error: {0}")]
    Graphql(String),
    #[error("response carried no data")]
    MissingData,
}

/// The backend operation that exchanges an access link for credentials.
#[async_trait]
pub trait AccessLinkBackend: Send + Sync {
    async fn process_access_link(
        &self,
        access_link_id: &str,
    ) -> Result<RedemptionResult, BackendError>;
}

pub struct GraphqlBackend {
    endpoint: String,
    client: reqwest::Client,
}

impl GraphqlBackend {
    pub fn new(backend_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint: format!("{}/graphql", backend_url.trim_end_matches('/')),
            client,
        })
    }
}

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a, V> {
    query: &'a str,
    #[serde(rename = "operationName")]
    operation_name: &'a str,
    variables: V,
}

#[derive(Debug, Serialize)]
struct ProcessAccessLinkVariables<'a> {
    input: ProcessAccessLinkInput<'a>,
}

#[derive(Debug, Serialize)]
struct ProcessAccessLinkInput<'a> {
    id: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessAccessLinkData {
    process_access_link: ProcessAccessLinkResult,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum ProcessAccessLinkResult {
    ProcessAccessLinkResponse {
        #[serde(rename = "apiKey")]
        api_key: String,
        #[serde(rename = "tokenValidForDays")]
        token_valid_for_days: u32,
    },
    ProcessAccessLinkError {
        error: String,
    },
}

impl From<ProcessAccessLinkResult> for RedemptionResult {
    fn from(value: ProcessAccessLinkResult) -> Self {
        match value {
            ProcessAccessLinkResult::ProcessAccessLinkResponse {
                api_key,
                token_valid_for_days,
            } => RedemptionResult::Success {
                api_key,
                token_valid_for_days,
            },
            ProcessAccessLinkResult::ProcessAccessLinkError { error } => {
                RedemptionResult::Failure {
                    message: describe_error(&error),
                }
            }
        }
    }
}

/// Turns the backend's error codes into something a person can read.
fn describe_error(code: &str) -> String {
    let message = match code {
        "NOT_FOUND" => "This access link does not exist",
        "EXPIRED" => "This access link has expired",
        "REVOKED" => "This access link has been revoked",
        "MAXIMUM_USES_REACHED" => "This access link has already been used the maximum number of times",
        other => other,
    };
    message.to_string()
}

#[async_trait]
impl AccessLinkBackend for GraphqlBackend {
    #[tracing::instrument(skip_all)]
    async fn process_access_link(
        &self,
        access_link_id: &str,
    ) -> Result<RedemptionResult, BackendError> {
        let result = self
            .client
            .post(&self.endpoint)
            .json(&GraphqlRequest {
                query: PROCESS_ACCESS_LINK,
                operation_name: "ProcessAccessLink",
                variables: ProcessAccessLinkVariables {
                    input: ProcessAccessLinkInput { id: access_link_id },
                },
            })
            .send()
            .await?;

        let response = match result.status() {
            StatusCode::OK => result
                .json::<GraphqlResponse<ProcessAccessLinkData>>()
                .await
                .map_err(BackendError::from),
            status => {
                tracing::error!("unexpected status code: {:?}", status);

                Err(BackendError::UnexpectedStatus(status))
            }
        }?;

        if let Some(data) = response.data {
            return Ok(data.process_access_link.into());
        }

        match response.errors.into_iter().next() {
            Some(error) => Err(BackendError::Graphql(error.message)),
            None => Err(BackendError::MissingData),
        }
    }
}
