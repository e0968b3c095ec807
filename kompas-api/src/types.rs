use serde::{Deserialize, Serialize};

/// One answered step of the quiz path, wire-identical to the backend contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub question: String,
    pub answer: String,
}

impl Step {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeResponse {
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultResponse {
    pub profession: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vacancy {
    pub name: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacanciesResponse {
    pub vacancies: Vec<Vacancy>,
}

/// Labour-market statistics for one profession, as returned by the
/// relevance endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfessionStats {
    pub profession: String,
    pub vacancy_count: u64,
    #[serde(default)]
    pub average_salary: Option<u64>,
    #[serde(default)]
    pub median_salary: Option<u64>,
    pub trend: String,
    pub top_skills: Vec<String>,
    pub search_url: String,
}
