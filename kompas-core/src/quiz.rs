use crate::session::{PathFull, QuizSession, SessionState};
use crate::tree::{QuizTree, TreeError};
use kompas_api::types::{NodeResponse, Vacancy};
use kompas_api::{ApiError, QuizClient, Step};
use petgraph::graph::NodeIndex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, sleep};
use tracing::{info, warn};

/// Placeholder rendered when the backend could not produce a usable
/// question within the retry budget. Keeps the quiz from hanging.
pub const FALLBACK_QUESTION: &str = "Не удалось сгенерировать вопрос";
pub const FALLBACK_OPTION: &str = "Ошибка";

pub const NODE_RETRY_LIMIT: usize = 3;

/// How long a loading placeholder stays visible at minimum, regardless of
/// how fast the backend answers.
pub const DEFAULT_MIN_DISPLAY: Duration = Duration::from_millis(1200);

pub const LOADING_FIRST_QUESTION: &str = "Генерируется первый вопрос...";
pub const LOADING_NEXT_QUESTION: &str = "Генерируется следующий вопрос...";
pub const LOADING_RESULT: &str = "Подбирается профессия...";
pub const LOADING_VACANCIES: &str = "Ищем вакансии...";
pub const RESULT_ERROR_MESSAGE: &str = "Ошибка при получении результата";

/// Prefix the backend is instructed to open its verdict with; the short
/// profession title follows on the same line.
pub const PROFESSION_PREFIX: &str = "Профессия:";

#[derive(Debug, Clone)]
pub struct QuizConfig {
    pub max_depth: usize,
    pub retry_limit: usize,
    pub min_display: Duration,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            max_depth: crate::session::DEFAULT_MAX_DEPTH,
            retry_limit: NODE_RETRY_LIMIT,
            min_display: DEFAULT_MIN_DISPLAY,
        }
    }
}

/// Progress notifications for whichever front end is rendering the quiz.
#[derive(Debug, Clone)]
pub enum QuizProgress {
    Loading { message: String },
    Retrying { attempt: usize, limit: usize },
    TransientError { message: String },
}

pub type ProgressCallback = Arc<dyn Fn(QuizProgress) + Send + Sync>;

/// What a front end needs to render one question.
#[derive(Debug, Clone)]
pub struct QuestionView {
    pub id: NodeIndex,
    pub question: String,
    pub options: Vec<String>,
    pub depth: usize,
    pub pos: (i32, i32),
    pub fallback: bool,
}

#[derive(Debug, Clone)]
pub enum StepOutcome {
    Question(QuestionView),
    Finished(QuizOutcome),
}

#[derive(Debug, Clone)]
pub struct QuizOutcome {
    pub profession: String,
    pub title: Option<String>,
    pub vacancies: VacancyOutcome,
}

/// Vacancy lookup result. `NotRequested` (no parseable profession title)
/// is distinct from an empty list, which is distinct from a failed fetch.
#[derive(Debug, Clone)]
pub enum VacancyOutcome {
    NotRequested,
    Found(Vec<Vacancy>),
    Empty,
    Failed(String),
}

#[derive(Debug, Error)]
pub enum QuizError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    PathFull(#[from] PathFull),

    #[error("no question awaiting an answer")]
    NoActiveQuestion,
}

/// Drives one strictly sequential, depth-bounded request/render cycle.
/// The controller owns no rendering: render targets are injected as a
/// progress callback at construction and question views are returned to
/// the caller, so the same controller backs the CLI loop and the TUI.
pub struct QuizController {
    client: QuizClient,
    config: QuizConfig,
    session: QuizSession,
    tree: QuizTree,
    current: Option<NodeIndex>,
    progress: Option<ProgressCallback>,
}

impl QuizController {
    pub fn new(client: QuizClient) -> Self {
        Self::with_config(client, QuizConfig::default())
    }

    pub fn with_config(client: QuizClient, config: QuizConfig) -> Self {
        let session = QuizSession::new(config.max_depth);
        Self {
            client,
            config,
            session,
            tree: QuizTree::new(),
            current: None,
            progress: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn tree(&self) -> &QuizTree {
        &self.tree
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    /// Begin a fresh run: any previous path, tree and result are discarded
    /// and the first question is requested at depth 0.
    pub async fn start(&mut self) -> Result<QuestionView, QuizError> {
        self.session.reset();
        self.tree.clear();
        self.current = None;

        info!("Starting quiz session {}", self.session.id());
        self.report(QuizProgress::Loading {
            message: LOADING_FIRST_QUESTION.to_string(),
        });
        self.next_question(None).await
    }

    /// Answer the current question. The node locks on the first selection,
    /// the step is appended to the path, and the controller either fetches
    /// the next question or, at the depth bound, the final result.
    pub async fn select_option(&mut self, option: usize) -> Result<StepOutcome, QuizError> {
        let current = self.current.ok_or(QuizError::NoActiveQuestion)?;
        self.tree.mark_answered(current, option)?;

        let (question, answer) = match self.tree.node(current) {
            Some(node) => (node.question.clone(), node.options[option].clone()),
            None => return Err(QuizError::Tree(TreeError::UnknownNode)),
        };
        self.session.record(Step::new(question, answer))?;

        if self.session.is_complete() {
            return self.finish().await.map(StepOutcome::Finished);
        }

        self.report(QuizProgress::Loading {
            message: LOADING_NEXT_QUESTION.to_string(),
        });
        self.next_question(Some(current)).await.map(StepOutcome::Question)
    }

    async fn next_question(&mut self, parent: Option<NodeIndex>) -> Result<QuestionView, QuizError> {
        let depth = self.session.depth();
        self.session.set_state(SessionState::AwaitingNode { depth });

        let (response, fallback) = self
            .paced(Self::request_node_with_retry(
                &self.client,
                self.session.path(),
                self.config.retry_limit,
                self.progress.as_ref(),
            ))
            .await;

        let NodeResponse { question, options } = response;
        let id = match parent {
            None => self.tree.add_root(question, options, fallback),
            Some(parent) => self.tree.add_child(parent, question, options, fallback)?,
        };

        self.current = Some(id);
        self.session.set_state(SessionState::QuestionShown { depth });
        Ok(self.view(id))
    }

    /// Ask for the next node, retrying malformed responses and transport
    /// failures up to the retry budget. Never fails: once the budget is
    /// exhausted (or the backend signals an explicit error) the hard-coded
    /// placeholder question takes the node's place.
    async fn request_node_with_retry(
        client: &QuizClient,
        path: &[Step],
        retry_limit: usize,
        progress: Option<&ProgressCallback>,
    ) -> (NodeResponse, bool) {
        for attempt in 1..=retry_limit {
            match client.fetch_node(path).await {
                Ok(node) => return (node, false),
                Err(err) if err.is_retryable() => {
                    warn!("Node request attempt {}/{} failed: {}", attempt, retry_limit, err);
                    if attempt < retry_limit
                        && let Some(cb) = progress
                    {
                        cb(QuizProgress::Retrying {
                            attempt,
                            limit: retry_limit,
                        });
                    }
                }
                Err(err) => {
                    warn!("Backend refused node request: {}", err);
                    if let Some(cb) = progress {
                        cb(QuizProgress::TransientError {
                            message: err.to_string(),
                        });
                    }
                    break;
                }
            }
        }

        (fallback_node(), true)
    }

    async fn finish(&mut self) -> Result<QuizOutcome, QuizError> {
        self.session.set_state(SessionState::AwaitingResult);
        self.report(QuizProgress::Loading {
            message: LOADING_RESULT.to_string(),
        });

        let result = match self.paced(self.client.fetch_result(self.session.path())).await {
            Ok(result) => result,
            Err(err) => {
                // Contained failure: surface it, drop back to a restartable
                // state instead of stranding the session mid-flight.
                warn!("Result request failed: {}", err);
                self.report(QuizProgress::TransientError {
                    message: RESULT_ERROR_MESSAGE.to_string(),
                });
                self.session.set_state(SessionState::Idle);
                self.current = None;
                return Err(err.into());
            }
        };

        self.session.set_state(SessionState::ResultShown);
        self.current = None;

        let title = extract_profession_title(&result.profession);
        let vacancies = match title.as_deref() {
            Some(title) => self.lookup_vacancies(title).await,
            None => {
                info!("No profession title in result; skipping vacancy lookup");
                VacancyOutcome::NotRequested
            }
        };

        Ok(QuizOutcome {
            profession: result.profession,
            title,
            vacancies,
        })
    }

    async fn lookup_vacancies(&mut self, title: &str) -> VacancyOutcome {
        self.session.set_state(SessionState::AwaitingVacancies);
        self.report(QuizProgress::Loading {
            message: LOADING_VACANCIES.to_string(),
        });

        match self.client.fetch_vacancies(title).await {
            Ok(list) if list.is_empty() => {
                self.session.set_state(SessionState::VacanciesEmpty);
                VacancyOutcome::Empty
            }
            Ok(list) => {
                self.session.set_state(SessionState::VacanciesShown);
                VacancyOutcome::Found(list)
            }
            Err(err) => {
                warn!("Vacancy lookup for '{}' failed: {}", title, err);
                self.session.set_state(SessionState::VacanciesFailed);
                VacancyOutcome::Failed(err.to_string())
            }
        }
    }

    /// Hold the loading placeholder for at least `min_display` so fast
    /// responses do not flicker past the user. Decoupled from request
    /// latency: a slow backend adds nothing on top.
    async fn paced<T>(&self, fut: impl Future<Output = T>) -> T {
        let started = Instant::now();
        let out = fut.await;
        let elapsed = started.elapsed();
        if elapsed < self.config.min_display {
            sleep(self.config.min_display - elapsed).await;
        }
        out
    }

    fn view(&self, id: NodeIndex) -> QuestionView {
        let node = self.tree.node(id).expect("freshly inserted node");
        QuestionView {
            id,
            question: node.question.clone(),
            options: node.options.clone(),
            depth: node.depth,
            pos: node.pos,
            fallback: node.fallback,
        }
    }

    fn report(&self, progress: QuizProgress) {
        if let Some(cb) = &self.progress {
            cb(progress);
        }
    }
}

fn fallback_node() -> NodeResponse {
    NodeResponse {
        question: FALLBACK_QUESTION.to_string(),
        options: vec![FALLBACK_OPTION.to_string(), FALLBACK_OPTION.to_string()],
    }
}

/// Pull the short profession title out of the backend's verdict text.
/// Only the fixed `"Профессия: <title>"` pattern counts; anything else
/// yields `None` and the vacancy lookup is skipped.
pub fn extract_profession_title(text: &str) -> Option<String> {
    text.lines()
        .find_map(|line| line.trim().strip_prefix(PROFESSION_PREFIX))
        .map(|title| title.trim().trim_end_matches('.').trim().to_string())
        .filter(|title| !title.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title_from_first_line() {
        let text = "Профессия: Сварщик\nВы любите работать руками, и это заметно.";
        assert_eq!(extract_profession_title(text), Some("Сварщик".to_string()));
    }

    #[test]
    fn test_extract_title_strips_trailing_period() {
        let text = "Профессия: Электромонтажник.\nПояснение.";
        assert_eq!(
            extract_profession_title(text),
            Some("Электромонтажник".to_string())
        );
    }

    #[test]
    fn test_extract_title_finds_pattern_on_later_line() {
        let text = "Поздравляем!\nПрофессия: Токарь\nОбъяснение ниже.";
        assert_eq!(extract_profession_title(text), Some("Токарь".to_string()));
    }

    #[test]
    fn test_no_pattern_means_no_title() {
        assert_eq!(extract_profession_title("Вам подойдёт работа сварщиком."), None);
        assert_eq!(extract_profession_title("Профессия:   "), None);
    }

    #[test]
    fn test_fallback_node_shape() {
        let node = fallback_node();
        assert_eq!(node.question, FALLBACK_QUESTION);
        assert_eq!(node.options, vec![FALLBACK_OPTION, FALLBACK_OPTION]);
    }
}
