// Tests for the skills/interests career analysis flow

use kompas_api::{ApiError, QuizClient};
use kompas_core::career::{CareerAdvisor, CareerError, EMPTY_SKILLS_MESSAGE};
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn advisor_for(server: &MockServer) -> CareerAdvisor {
    CareerAdvisor::new(QuizClient::new(Url::parse(&server.uri()).unwrap()))
}

const RECOMMENDATIONS: &str = "\
1. **Инженер-электрик** - 85% совпадение
   • Что изучить: ПУЭ, схемотехника
2. **Сварщик** - 70% совпадение
   • Перспективы: стабильный спрос";

fn stats_body() -> serde_json::Value {
    serde_json::json!([
        {
            "profession": "Инженер-электрик",
            "vacancy_count": 120,
            "average_salary": 450000,
            "median_salary": 400000,
            "trend": "↑ 12%",
            "top_skills": ["автокад", "пуэ"],
            "search_url": "https://hh.kz/search/vacancy?text=Инженер-электрик&area=40"
        },
        {
            "profession": "Сварщик",
            "vacancy_count": 80,
            "average_salary": null,
            "median_salary": null,
            "trend": "→ 0%",
            "top_skills": [],
            "search_url": "https://hh.kz/search/vacancy?text=Сварщик&area=40"
        }
    ])
}

#[tokio::test]
async fn test_analysis_predicts_then_enriches_with_relevance() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/career/predict"))
        .and(body_json(serde_json::json!({
            "skills": "сварка, чтение чертежей",
            "interests": "техника"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": RECOMMENDATIONS
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/career/relevance"))
        .and(body_json(serde_json::json!({
            "professions": ["Инженер-электрик", "Сварщик"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body()))
        .expect(1)
        .mount(&server)
        .await;

    let advisor = advisor_for(&server);
    let analysis = advisor
        .analyze("сварка, чтение чертежей", "техника")
        .await
        .unwrap();

    assert_eq!(analysis.professions, vec!["Инженер-электрик", "Сварщик"]);
    assert_eq!(analysis.stats.len(), 2);
    assert_eq!(analysis.stats[0].vacancy_count, 120);
    assert!(analysis.stats[1].average_salary.is_none());
}

#[tokio::test]
async fn test_empty_skills_rejected_without_any_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/career/predict"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let advisor = advisor_for(&server);
    let err = advisor.analyze("   ", "техника").await.unwrap_err();

    assert!(matches!(err, CareerError::EmptySkills));
    assert_eq!(err.to_string(), EMPTY_SKILLS_MESSAGE);
}

#[tokio::test]
async fn test_predict_error_skips_relevance() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/career/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": "модель недоступна"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/career/relevance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let advisor = advisor_for(&server);
    let err = advisor.analyze("python", "").await.unwrap_err();

    assert!(matches!(err, CareerError::Api(ApiError::Backend(_))));
    assert_eq!(err.display_message(), "Ошибка: модель недоступна");
}

#[tokio::test]
async fn test_recommendations_without_titles_skip_relevance() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/career/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "Сложно сказать, попробуйте уточнить навыки."
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/career/relevance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let advisor = advisor_for(&server);
    let err = advisor.analyze("python", "").await.unwrap_err();

    assert!(matches!(err, CareerError::NoProfessions));
}
