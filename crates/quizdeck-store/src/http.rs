//! REST question store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

use quizdeck_core::error::StoreError;
use quizdeck_core::loader::parse_raw_set;
use quizdeck_core::model::{Filter, NewQuestionSet, Question, QuestionSetSummary};
use quizdeck_core::selection::{selection_rng, SelectionPolicy, ShuffleWithinCategories};
use quizdeck_core::traits::QuestionStore;

/// Question store backed by a JSON REST service.
///
/// - `GET  {base}/question-sets?grade=&semester=&examType=&subject=`
/// - `GET  {base}/question-sets/{id}/questions`
/// - `POST {base}/question-sets`
pub struct HttpStore {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
    policy: Box<dyn SelectionPolicy>,
    seed: Option<u64>,
}

/// Body of a successful create; services differ in the id field they use.
#[derive(Deserialize)]
struct CreatedResponse {
    #[serde(alias = "_id", alias = "insertedId")]
    id: String,
}

impl HttpStore {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| StoreError::InvalidData(format!("invalid base URL {base_url:?}: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::NetworkError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            api_key: api_key.filter(|k| !k.is_empty()),
            timeout,
            client,
            policy: Box::new(ShuffleWithinCategories),
            seed: None,
        })
    }

    pub fn with_policy(mut self, policy: Box<dyn SelectionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("Authorization", format!("Bearer {key}")),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder, what: &str) -> Result<Response, StoreError> {
        let response = self.authorize(req).send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout(self.timeout.as_secs())
            } else {
                StoreError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(StoreError::NotFound(what.to_string()));
        }
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Unauthorized(body));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::ApiError {
                status,
                message: body,
            });
        }
        Ok(response)
    }

    async fn read_body(&self, response: Response) -> Result<String, StoreError> {
        response.text().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout(self.timeout.as_secs())
            } else {
                StoreError::NetworkError(e.to_string())
            }
        })
    }
}

#[async_trait]
impl QuestionStore for HttpStore {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, filter), fields(filter = %filter))]
    async fn list_question_sets(&self, filter: &Filter) -> anyhow::Result<Vec<QuestionSetSummary>> {
        let url = Url::parse_with_params(
            &format!("{}/question-sets", self.base_url),
            [
                ("grade", filter.grade.code()),
                ("semester", filter.semester.code()),
                ("examType", filter.exam_type.code()),
                ("subject", filter.subject.code()),
            ],
        )
        .map_err(|e| StoreError::InvalidData(format!("invalid list URL: {e}")))?;

        let response = self.send(self.client.get(url), "question sets").await?;
        let body = self.read_body(response).await?;
        let sets: Vec<QuestionSetSummary> = serde_json::from_str(&body)
            .map_err(|e| StoreError::InvalidData(format!("failed to parse set list: {e}")))?;
        debug!(count = sets.len(), "listed question sets");
        Ok(sets)
    }

    #[instrument(skip(self))]
    async fn get_questions(&self, set_id: &str) -> anyhow::Result<Vec<Question>> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| StoreError::InvalidData(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidData("base URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(["question-sets", set_id, "questions"]);

        let response = self.send(self.client.get(url), set_id).await?;
        let body = self.read_body(response).await?;
        let raw = parse_raw_set(&body)
            .map_err(|e| StoreError::InvalidData(format!("failed to parse questions: {e:#}")))?;
        let mut rng = selection_rng(self.seed);
        let questions = raw.into_questions(self.policy.as_ref(), &mut rng);
        debug!(policy = self.policy.name(), count = questions.len(), "fetched questions");
        Ok(questions)
    }

    #[instrument(skip(self, set), fields(name = %set.name, questions = set.questions.len()))]
    async fn create_question_set(&self, set: &NewQuestionSet) -> anyhow::Result<String> {
        let req = self
            .client
            .post(format!("{}/question-sets", self.base_url))
            .json(set);
        let response = self.send(req, &set.name).await?;
        let body = self.read_body(response).await?;
        let created: CreatedResponse = serde_json::from_str(&body)
            .map_err(|e| StoreError::InvalidData(format!("failed to parse create response: {e}")))?;
        debug!(id = %created.id, "created question set");
        Ok(created.id)
    }
}
