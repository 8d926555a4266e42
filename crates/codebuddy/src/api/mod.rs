use std::time::Duration;

use codebuddy_core::api::{
    ErrorBody, FeedbackAck, FeedbackKind, FeedbackRequest, GenerateRequest, GenerateResponse,
    HealthResponse, TrainingExample, TrainingListResponse, TrainingSubmitRequest,
    TrainingSubmitResponse,
};

use crate::error::Error;

/// Hard timeout for generation requests. Feedback and training calls
/// inherit the client default.
const GENERATE_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the code-generation backend.
///
/// One instance per session; every operation is a single attempt with no
/// retries, and failures surface as typed [`Error`]s.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_global(global: &crate::Global) -> Self {
        Self::new(global.backend_url.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /generate`: generate code for a prompt.
    ///
    /// An empty prompt is rejected before any network call. The language
    /// on the request is passed through verbatim; resolving `auto` to a
    /// concrete language is the caller's contract.
    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, Error> {
        if request.prompt.trim().is_empty() {
            return Err(Error::Validation("Prompt is required".to_string()));
        }

        let response = self
            .client
            .post(self.url("/generate"))
            .timeout(GENERATE_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error("generate", e))?;

        read_json(response, "generate").await
    }

    /// `POST /feedback`: record feedback on a task/solution pair.
    ///
    /// Presence of all fields is validated here; that the type is a
    /// meaningful polarity is enforced by [`FeedbackKind`] itself.
    pub async fn submit_feedback(
        &self,
        task: &str,
        solution: &str,
        kind: FeedbackKind,
    ) -> Result<FeedbackAck, Error> {
        if task.trim().is_empty() || solution.trim().is_empty() {
            return Err(Error::Validation(
                "Feedback requires both a task and a solution".to_string(),
            ));
        }

        let request = FeedbackRequest {
            task: task.to_string(),
            solution: solution.to_string(),
            kind,
        };

        let response = self
            .client
            .post(self.url("/feedback"))
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error("feedback", e))?;

        read_json(response, "feedback").await
    }

    /// `POST /training`: store a task/solution pair. The backend assigns
    /// and returns the identity.
    pub async fn submit_training_example(
        &self,
        task: &str,
        solution: &str,
    ) -> Result<TrainingSubmitResponse, Error> {
        if task.trim().is_empty() || solution.trim().is_empty() {
            return Err(Error::Validation(
                "A training example requires both a task and a solution".to_string(),
            ));
        }

        let request = TrainingSubmitRequest {
            task: task.to_string(),
            solution: solution.to_string(),
        };

        let response = self
            .client
            .post(self.url("/training"))
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error("training", e))?;

        read_json(response, "training").await
    }

    /// `GET /training?language=<filter>`: list stored training examples.
    /// The filter is passed through verbatim.
    pub async fn list_training_examples(
        &self,
        language_filter: &str,
    ) -> Result<Vec<TrainingExample>, Error> {
        let response = self
            .client
            .get(self.url("/training"))
            .query(&[("language", language_filter)])
            .send()
            .await
            .map_err(|e| transport_error("training", e))?;

        let list: TrainingListResponse = read_json(response, "training").await?;
        Ok(list.examples)
    }

    /// `GET /`: backend health probe.
    pub async fn health(&self) -> Result<HealthResponse, Error> {
        let response = self
            .client
            .get(self.url("/"))
            .send()
            .await
            .map_err(|e| transport_error("status", e))?;

        read_json(response, "status").await
    }
}

fn transport_error(operation: &str, err: reqwest::Error) -> Error {
    log::error!("{operation} request failed: {err}");
    if err.is_timeout() {
        Error::Network("Request timed out".to_string())
    } else {
        Error::Network(err.to_string())
    }
}

/// Map a backend response to a typed payload. Non-2xx statuses are
/// uniformly failures, carrying the backend's `{error}` message when the
/// body has one.
async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    operation: &str,
) -> Result<T, Error> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| format!("Backend returned HTTP {status}"));
        log::error!("{operation} failed: {message}");
        return Err(Error::Backend(message));
    }

    response.json::<T>().await.map_err(|e| {
        log::error!("{operation} response could not be parsed: {e}");
        Error::Backend(format!("Invalid response from backend: {e}"))
    })
}
