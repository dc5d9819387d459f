use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::schema::{EvaluationBody, ParseResumeBody, QuestionsBody};
use super::{Backend, GatewayError, RESUME_FIELD};
use crate::config::Config;
use crate::models::evaluation::{EvaluationRequest, EvaluationResponse};
use crate::models::interview::{ContactFields, Question, ResumeFile};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Backend reached over HTTP at the configured base URL.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    parse_url: String,
    questions_url: String,
    evaluate_url: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            parse_url: join_url(&config.backend_url, &config.resume_parse_endpoint),
            questions_url: join_url(&config.backend_url, &config.questions_endpoint),
            evaluate_url: join_url(&config.backend_url, &config.evaluate_endpoint),
        })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn parse_resume(&self, file: &ResumeFile) -> Result<ContactFields, GatewayError> {
        let mut part = multipart::Part::bytes(file.bytes.to_vec()).file_name(file.file_name.clone());
        if let Some(mime) = &file.content_type {
            part = part.mime_str(mime)?;
        }
        let form = multipart::Form::new().part(RESUME_FIELD, part);

        debug!("Uploading resume '{}' to {}", file.file_name, self.parse_url);
        let response = self.client.post(&self.parse_url).multipart(form).send().await?;
        let body: ParseResumeBody = read_json(response).await?;
        Ok(body.into_fields())
    }

    async fn fetch_questions(&self) -> Result<Vec<Question>, GatewayError> {
        let response = self.client.get(&self.questions_url).send().await?;
        let body: QuestionsBody = read_json(response).await?;
        let questions = body.validate()?;
        debug!("Fetched {} interview questions", questions.len());
        Ok(questions)
    }

    async fn submit_evaluation(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResponse, GatewayError> {
        let response = self
            .client
            .post(&self.evaluate_url)
            .json(request)
            .send()
            .await?;
        let body: EvaluationBody = read_json(response).await?;
        body.validate()
    }
}

/// Rejects non-2xx statuses, then parses the body as JSON.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        warn!("Backend returned {}: {}", status, text);
        return Err(GatewayError::Status {
            status: status.as_u16(),
            message: text,
        });
    }

    serde_json::from_str(&text).map_err(|e| GatewayError::Schema(e.to_string()))
}

fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
