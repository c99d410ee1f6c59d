//! HTTP implementation of the quiz backend.

use async_trait::async_trait;
use reqwest::{Response, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

use quizform_core::error::BackendError;
use quizform_core::model::{FormSelection, ProblemSet, Subject};
use quizform_core::traits::{ExportRequest, QuizBackend};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

const UNITS_PATH: &str = "/api/get_units";
const GENERATE_PATH: &str = "/api/generate_problems";
const PDF_PATH: &str = "/api/generate_pdf";

/// Talks to the units, generation, and PDF endpoints of one server.
///
/// No request timeout is set: a request that never resolves keeps its
/// operation pending.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };

        Self {
            base_url: base.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[derive(Deserialize)]
struct UnitsBody {
    units: Vec<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

fn transport(e: reqwest::Error) -> BackendError {
    BackendError::Network(e.to_string())
}

/// Turn a non-2xx response into a server error, using its `{error}` body
/// when it has one.
async fn server_error(response: Response) -> BackendError {
    let status = response.status().as_u16();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error);
    BackendError::server(status, message)
}

#[async_trait]
impl QuizBackend for HttpBackend {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_units(
        &self,
        subject: Subject,
        grade: &str,
    ) -> Result<Vec<String>, BackendError> {
        let url = Url::parse_with_params(
            &self.endpoint(UNITS_PATH),
            &[("subject", subject.as_str()), ("grade", grade)],
        )
        .map_err(|e| BackendError::Network(format!("invalid URL: {e}")))?;

        let response = self.client.get(url).send().await.map_err(transport)?;
        if !response.status().is_success() {
            return Err(server_error(response).await);
        }

        let body: UnitsBody = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        debug!(count = body.units.len(), "units received");
        Ok(body.units)
    }

    #[instrument(skip_all, fields(base_url = %self.base_url, subject = %selection.subject))]
    async fn generate(&self, selection: &FormSelection) -> Result<ProblemSet, BackendError> {
        let response = self
            .client
            .post(self.endpoint(GENERATE_PATH))
            .json(selection)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(server_error(response).await);
        }

        response
            .json::<ProblemSet>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    #[instrument(skip_all, fields(base_url = %self.base_url))]
    async fn export_pdf(&self, request: &ExportRequest<'_>) -> Result<Vec<u8>, BackendError> {
        let mut response = self
            .client
            .post(self.endpoint(PDF_PATH))
            .json(request)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(server_error(response).await);
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(transport)? {
            bytes.extend_from_slice(&chunk);
        }
        debug!(size = bytes.len(), "PDF received");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizform_core::model::{Problem, SelectionOptions};
    use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn selection() -> FormSelection {
        FormSelection {
            subject: Subject::Math,
            grade: "中学1年".into(),
            unit: "分数".into(),
            problem_type: "選択式".into(),
            count: 2,
            difficulty: "標準".into(),
            paragraph_count: None,
            options: SelectionOptions {
                calculation_only: Some(true),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn units_query_is_encoded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/get_units"))
            .and(query_param("subject", "english"))
            .and(query_param("grade", "高校英語長文"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"units": ["長文読解", "要約"]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri());
        let units = backend
            .fetch_units(Subject::English, "高校英語長文")
            .await
            .unwrap();
        assert_eq!(units, vec!["長文読解", "要約"]);
    }

    #[tokio::test]
    async fn units_error_body_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/get_units"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"error": "Subject and grade are required"})),
            )
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri());
        let err = backend
            .fetch_units(Subject::Math, "中学1年")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BackendError::Server {
                status: 400,
                message: "Subject and grade are required".into()
            }
        );
    }

    #[tokio::test]
    async fn non_json_error_uses_generic_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate_problems"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri());
        let err = backend.generate(&selection()).await.unwrap_err();
        assert_eq!(err, BackendError::server(502, None));
    }

    #[tokio::test]
    async fn generate_posts_selection() {
        let server = MockServer::start().await;

        let expected_body = serde_json::json!({
            "subject": "math",
            "grade": "中学1年",
            "unit": "分数",
            "problemType": "選択式",
            "count": 2,
            "difficulty": "標準",
            "options": {"calculation_only": true}
        });
        let response_body = serde_json::json!({
            "problems": [
                {"id": 1, "question": "1/2 + 1/3 = ?", "choices": ["5/6", "2/5"], "answer": "5/6", "explanation": "通分する"},
                {"id": 2, "question": "2/3 × 3/4 = ?", "answer": "1/2"}
            ]
        });

        Mock::given(method("POST"))
            .and(path("/api/generate_problems"))
            .and(body_json(&expected_body))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri());
        let set = backend.generate(&selection()).await.unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.problems()[0].choices.as_ref().unwrap()[0], "5/6");
        assert_eq!(set.problems()[1].explanation, None);
    }

    #[tokio::test]
    async fn generate_accepts_passage_shape() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate_problems"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "readingPassage": "Tom lives in Tokyo.",
                "questions": [{"id": 1, "question": "Where does Tom live?", "answer": "Tokyo"}]
            })))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri());
        let set = backend.generate(&selection()).await.unwrap();
        assert_eq!(set.passage(), Some("Tom lives in Tokyo."));
    }

    #[tokio::test]
    async fn unexpected_success_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate_problems"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri());
        let err = backend.generate(&selection()).await.unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[tokio::test]
    async fn pdf_body_merges_set_and_settings() {
        let server = MockServer::start().await;
        let pdf = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\nfake".to_vec();

        Mock::given(method("POST"))
            .and(path("/api/generate_pdf"))
            .and(body_partial_json(serde_json::json!({
                "subject": "math",
                "unit": "分数",
                "problems": {"problems": [{"id": 1, "answer": "5/6"}]}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/pdf")
                    .set_body_bytes(pdf.clone()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let set = ProblemSet::Flat {
            problems: vec![Problem {
                id: 1,
                question: "1/2 + 1/3 = ?".into(),
                choices: None,
                answer: "5/6".into(),
                explanation: None,
            }],
        };
        let settings = selection();
        let backend = HttpBackend::new(&server.uri());
        let bytes = backend
            .export_pdf(&ExportRequest {
                problems: &set,
                settings: &settings,
            })
            .await
            .unwrap();
        assert_eq!(bytes, pdf);
    }

    #[tokio::test]
    async fn pdf_error_message_is_parsed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate_pdf"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"error": "font not found"})),
            )
            .mount(&server)
            .await;

        let set = ProblemSet::Flat { problems: vec![] };
        let settings = selection();
        let backend = HttpBackend::new(&server.uri());
        let err = backend
            .export_pdf(&ExportRequest {
                problems: &set,
                settings: &settings,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "font not found");
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        // Port 9 (discard) is not expected to be listening locally.
        let backend = HttpBackend::new("http://127.0.0.1:9");
        let err = backend
            .fetch_units(Subject::Math, "中学1年")
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Network(_)));
    }

    #[test]
    fn base_url_defaults_and_trims() {
        assert_eq!(HttpBackend::new("").base_url(), DEFAULT_BASE_URL);
        assert_eq!(
            HttpBackend::new("http://example.test/").base_url(),
            "http://example.test"
        );
    }
}
