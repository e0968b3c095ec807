use kompas_api::types::ProfessionStats;
use kompas_api::{ApiError, QuizClient};
use thiserror::Error;
use tracing::{debug, info};

/// Client-side validation message for an empty skills field. Shown before
/// any request is made.
pub const EMPTY_SKILLS_MESSAGE: &str = "Введите хотя бы один навык!";
pub const NO_PROFESSIONS_MESSAGE: &str = "AI не вернул профессии";
pub const ERROR_PREFIX: &str = "Ошибка";

#[derive(Debug, Error)]
pub enum CareerError {
    #[error("{EMPTY_SKILLS_MESSAGE}")]
    EmptySkills,

    #[error("{NO_PROFESSIONS_MESSAGE}")]
    NoProfessions,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CareerError {
    /// User-facing rendering, matching the inline error banner of the
    /// original flow: `"Ошибка: <причина>"`.
    pub fn display_message(&self) -> String {
        format!("{}: {}", ERROR_PREFIX, self)
    }
}

/// Outcome of one analysis run: the raw recommendation text, the
/// profession titles parsed out of it, and labour-market stats for the
/// submitted subset.
#[derive(Debug, Clone)]
pub struct CareerAnalysis {
    pub recommendations: String,
    pub professions: Vec<String>,
    pub stats: Vec<ProfessionStats>,
}

/// Skills/interests form flow: predict, parse, then enrich with
/// relevance data. Sequential by contract; a failed or refused predict
/// call means the relevance endpoint is never contacted.
pub struct CareerAdvisor {
    client: QuizClient,
}

impl CareerAdvisor {
    pub fn new(client: QuizClient) -> Self {
        Self { client }
    }

    pub async fn analyze(&self, skills: &str, interests: &str) -> Result<CareerAnalysis, CareerError> {
        let skills = skills.trim();
        if skills.is_empty() {
            // Rejected locally; the backend never sees the submission.
            return Err(CareerError::EmptySkills);
        }

        let recommendations = self.client.predict(skills, interests.trim()).await?;
        let professions = parse_professions(&recommendations);
        info!("Parsed {} professions from recommendation text", professions.len());

        if professions.is_empty() {
            return Err(CareerError::NoProfessions);
        }

        let stats = self.client.relevance(&professions).await?;
        debug!("Received relevance stats for {} professions", stats.len());

        Ok(CareerAnalysis {
            recommendations,
            professions,
            stats,
        })
    }
}

/// Extract profession titles from recommendation markdown. Titles appear
/// as numbered bold entries: `1. **Инженер-электрик** - 85% совпадение`.
pub fn parse_professions(text: &str) -> Vec<String> {
    text.lines().filter_map(parse_profession_line).collect()
}

fn parse_profession_line(line: &str) -> Option<String> {
    let trimmed = line.trim_start();
    let after_number = trimmed.trim_start_matches(|c: char| c.is_ascii_digit());
    if after_number.len() == trimmed.len() {
        return None;
    }

    let rest = after_number.strip_prefix('.')?.trim_start();
    let rest = rest.strip_prefix("**")?;
    let end = rest.find("**")?;
    let title = rest[..end].trim();

    (!title.is_empty()).then(|| title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_professions_from_numbered_bold_list() {
        let text = "\
Вот подходящие варианты:
1. **Инженер-электрик** - 85% совпадение
   • Что изучить: ПУЭ, схемотехника
2. **Сварщик** - 70% совпадение
   • Перспективы: высокий спрос
10. **Наладчик ЧПУ** - 55% совпадение";

        let professions = parse_professions(text);
        assert_eq!(professions, vec!["Инженер-электрик", "Сварщик", "Наладчик ЧПУ"]);
    }

    #[test]
    fn test_parse_ignores_lines_without_bold_title() {
        let text = "1. Инженер без выделения\n2) **не тот разделитель**\n- **маркер не номер**";
        assert!(parse_professions(text).is_empty());
    }

    #[test]
    fn test_parse_ignores_empty_bold() {
        assert!(parse_professions("1. **** - 50%").is_empty());
    }

    #[test]
    fn test_error_display_message_has_prefix() {
        let err = CareerError::Api(ApiError::Backend("квота исчерпана".to_string()));
        assert_eq!(err.display_message(), "Ошибка: квота исчерпана");

        let err = CareerError::EmptySkills;
        assert_eq!(err.display_message(), "Ошибка: Введите хотя бы один навык!");
    }
}
