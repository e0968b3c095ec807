use crate::error::{ApiError, Result};
use crate::types::{NodeResponse, ProfessionStats, ResultResponse, Step, Vacancy, VacanciesResponse};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

pub const NODE_ENDPOINT: &str = "ai-tree/api/node";
pub const RESULT_ENDPOINT: &str = "ai-tree/api/result";
pub const VACANCIES_ENDPOINT: &str = "ai-tree/api/vacancies";
pub const PREDICT_ENDPOINT: &str = "career/predict";
pub const RELEVANCE_ENDPOINT: &str = "career/relevance";

/// The relevance endpoint accepts at most this many professions per call.
pub const RELEVANCE_LIMIT: usize = 10;

/// Minimum number of answer options a node response must carry to be usable.
pub const MIN_NODE_OPTIONS: usize = 2;

pub struct QuizClient {
    client: Client,
    base: Url,
}

impl QuizClient {
    pub fn new(base: Url) -> Self {
        Self::with_timeout(base, 30)
    }

    pub fn with_timeout(base: Url, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent("Kompas/0.2 (https://github.com/trapdoorsec/kompas)")
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(timeout_secs.div_ceil(2)))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base: normalize_base(base),
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Request the next question for the given path. Validates that the
    /// backend returned at least [`MIN_NODE_OPTIONS`] non-empty options;
    /// anything less is reported as [`ApiError::Malformed`] so the caller
    /// can retry instead of rendering an unanswerable node.
    pub async fn fetch_node(&self, path: &[Step]) -> Result<NodeResponse> {
        debug!("Requesting node at depth {}", path.len());
        let body = self.post_json(NODE_ENDPOINT, &json!({ "path": path })).await?;
        let node: NodeResponse = serde_json::from_value(body)?;

        if node.question.trim().is_empty() {
            return Err(ApiError::Malformed("node question is empty".to_string()));
        }
        let usable = node.options.iter().filter(|o| !o.trim().is_empty()).count();
        if usable < MIN_NODE_OPTIONS || usable != node.options.len() {
            return Err(ApiError::Malformed(format!(
                "node carried {} usable options, need at least {}",
                usable, MIN_NODE_OPTIONS
            )));
        }

        Ok(node)
    }

    /// Request the final profession for a completed path.
    pub async fn fetch_result(&self, path: &[Step]) -> Result<ResultResponse> {
        debug!("Requesting result for path of {} steps", path.len());
        let body = self.post_json(RESULT_ENDPOINT, &json!({ "path": path })).await?;
        let result: ResultResponse = serde_json::from_value(body)?;

        if result.profession.trim().is_empty() {
            return Err(ApiError::Malformed("result profession is empty".to_string()));
        }

        Ok(result)
    }

    /// Look up current vacancies for a profession title. An empty list is a
    /// valid response and is returned as-is.
    pub async fn fetch_vacancies(&self, profession: &str) -> Result<Vec<Vacancy>> {
        debug!("Requesting vacancies for '{}'", profession);
        let body = self
            .post_json(VACANCIES_ENDPOINT, &json!({ "profession": profession }))
            .await?;
        let parsed: VacanciesResponse = serde_json::from_value(body)?;
        Ok(parsed.vacancies)
    }

    /// Ask the backend for career recommendations based on free-form skills
    /// and interests. Returns the raw recommendation text.
    pub async fn predict(&self, skills: &str, interests: &str) -> Result<String> {
        debug!("Requesting career prediction");
        let body = self
            .post_json(
                PREDICT_ENDPOINT,
                &json!({ "skills": skills, "interests": interests }),
            )
            .await?;

        body.get("result")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ApiError::Malformed("predict response missing 'result'".to_string()))
    }

    /// Fetch labour-market statistics for up to [`RELEVANCE_LIMIT`]
    /// professions. Longer lists are capped before the request is sent.
    pub async fn relevance(&self, professions: &[String]) -> Result<Vec<ProfessionStats>> {
        let capped = &professions[..professions.len().min(RELEVANCE_LIMIT)];
        if capped.len() < professions.len() {
            warn!(
                "Capping relevance lookup to {} of {} professions",
                capped.len(),
                professions.len()
            );
        }

        let body = self
            .post_json(RELEVANCE_ENDPOINT, &json!({ "professions": capped }))
            .await?;
        let stats: Vec<ProfessionStats> = serde_json::from_value(body)?;
        Ok(stats)
    }

    /// POST a JSON body and decode the response, folding non-2xx statuses
    /// into transport errors and a non-empty `error` field into
    /// [`ApiError::Backend`]. An empty `error` field is ignored.
    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value> {
        let url = self
            .base
            .join(endpoint)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", endpoint, e)))?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;

        let value: Value = response.json().await?;

        if let Some(err) = value.get("error").and_then(Value::as_str)
            && !err.trim().is_empty()
        {
            return Err(ApiError::Backend(err.to_string()));
        }

        Ok(value)
    }
}

/// Relative endpoint joins drop the last path segment unless the base ends
/// with a slash, so enforce one up front.
fn normalize_base(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> QuizClient {
        QuizClient::new(Url::parse(&server.uri()).unwrap())
    }

    #[tokio::test]
    async fn test_fetch_node_parses_valid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ai-tree/api/node"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "question": "Вам ближе техника или люди?",
                "options": ["Техника", "Люди"]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let node = client.fetch_node(&[]).await.unwrap();

        assert_eq!(node.question, "Вам ближе техника или люди?");
        assert_eq!(node.options.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_node_sends_path_as_body() {
        let server = MockServer::start().await;
        let steps = vec![Step::new("Q1", "A1"), Step::new("Q2", "A2")];

        Mock::given(method("POST"))
            .and(path("/ai-tree/api/node"))
            .and(body_json(json!({ "path": steps })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "question": "Q3",
                "options": ["A", "B"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client.fetch_node(&steps).await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_node_rejects_single_option() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ai-tree/api/node"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "question": "Q",
                "options": ["только один"]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.fetch_node(&[]).await.unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_node_rejects_blank_options() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ai-tree/api/node"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "question": "Q",
                "options": ["Вариант", "   "]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.fetch_node(&[]).await.unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_backend_error_field_is_surfaced_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/career/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": "квота исчерпана"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.predict("python", "").await.unwrap_err();
        assert!(matches!(err, ApiError::Backend(ref msg) if msg == "квота исчерпана"));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_empty_error_field_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/career/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": "",
                "result": "1. **Инженер**"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let text = client.predict("python", "").await.unwrap();
        assert_eq!(text, "1. **Инженер**");
    }

    #[tokio::test]
    async fn test_non_2xx_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ai-tree/api/result"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.fetch_result(&[]).await.unwrap_err();
        assert!(matches!(err, ApiError::Http(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_vacancies_allows_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ai-tree/api/vacancies"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "vacancies": [] })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let vacancies = client.fetch_vacancies("Сварщик").await.unwrap();
        assert!(vacancies.is_empty());
    }

    #[tokio::test]
    async fn test_relevance_caps_submission_at_limit() {
        let server = MockServer::start().await;
        let professions: Vec<String> = (1..=14).map(|i| format!("Профессия {}", i)).collect();
        let expected: Vec<String> = professions[..RELEVANCE_LIMIT].to_vec();

        Mock::given(method("POST"))
            .and(path("/career/relevance"))
            .and(body_json(json!({ "professions": expected })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let stats = client.relevance(&professions).await.unwrap();
        assert!(stats.is_empty());
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = QuizClient::new(Url::parse("http://127.0.0.1:8080/app").unwrap());
        assert_eq!(client.base().path(), "/app/");
    }
}
