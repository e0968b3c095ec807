// Report generation for finished quiz runs and career analyses

use crate::career::CareerAnalysis;
use crate::quiz::VacancyOutcome;
use kompas_api::Step;
use kompas_api::types::ProfessionStats;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuizReportData {
    pub session_id: String,
    pub path: Vec<Step>,
    pub profession: String,
    pub title: Option<String>,
    pub vacancies: VacancyOutcome,
}

const CHART_WIDTH: usize = 40;

pub fn generate_quiz_text_report(data: &QuizReportData) -> String {
    let mut report = String::new();

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("                         KOMPAS CAREER QUIZ REPORT\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    report.push_str(&format!("Session ID:   {}\n", data.session_id));
    report.push_str(&format!("Steps:        {}\n\n", data.path.len()));

    report.push_str("ANSWERED PATH\n");
    report.push_str("────────────────────────────────────────────────────────────────────────────────\n");
    report.push_str(&generate_path_tree(&data.path));
    report.push('\n');

    report.push_str("RESULT\n");
    report.push_str("────────────────────────────────────────────────────────────────────────────────\n");
    if let Some(ref title) = data.title {
        report.push_str(&format!("  ★ {}\n\n", title));
    }
    report.push_str(&wrap_text(&data.profession, 80, "  "));
    report.push('\n');

    report.push_str("VACANCIES\n");
    report.push_str("────────────────────────────────────────────────────────────────────────────────\n");
    match &data.vacancies {
        VacancyOutcome::Found(list) => {
            for vacancy in list {
                let salary = vacancy.salary.as_deref().unwrap_or("з/п не указана");
                report.push_str(&format!(
                    "  • {} — {} ({})\n    {}\n",
                    vacancy.name, vacancy.company, salary, vacancy.url
                ));
            }
        }
        VacancyOutcome::Empty => report.push_str("  Вакансии не найдены\n"),
        VacancyOutcome::Failed(reason) => {
            report.push_str(&format!("  Не удалось загрузить вакансии: {}\n", reason))
        }
        VacancyOutcome::NotRequested => report.push_str("  Поиск вакансий не выполнялся\n"),
    }

    report.push('\n');
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("                              End of Report\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    report
}

pub fn generate_quiz_json_report(data: &QuizReportData) -> Result<String, serde_json::Error> {
    let vacancies = match &data.vacancies {
        VacancyOutcome::Found(list) => serde_json::json!({ "state": "found", "items": list }),
        VacancyOutcome::Empty => serde_json::json!({ "state": "empty" }),
        VacancyOutcome::Failed(reason) => {
            serde_json::json!({ "state": "failed", "reason": reason })
        }
        VacancyOutcome::NotRequested => serde_json::json!({ "state": "not_requested" }),
    };

    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Kompas",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "session": {
                "id": data.session_id,
                "steps": data.path.len()
            },
            "path": data.path,
            "result": {
                "profession": data.profession,
                "title": data.title
            },
            "vacancies": vacancies
        }
    });

    serde_json::to_string_pretty(&json_report)
}

#[derive(Debug, Clone)]
pub struct CareerReportData {
    pub skills: String,
    pub interests: String,
    pub analysis: CareerAnalysis,
}

pub fn generate_career_text_report(data: &CareerReportData) -> String {
    let mut report = String::new();

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("                        KOMPAS CAREER ANALYSIS REPORT\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    report.push_str(&format!("Навыки:    {}\n", data.skills));
    if !data.interests.trim().is_empty() {
        report.push_str(&format!("Интересы:  {}\n", data.interests));
    }
    report.push('\n');

    report.push_str("RECOMMENDATIONS\n");
    report.push_str("────────────────────────────────────────────────────────────────────────────────\n");
    report.push_str(&wrap_text(&data.analysis.recommendations, 80, "  "));
    report.push('\n');

    if !data.analysis.stats.is_empty() {
        report.push_str("PROFESSION CARDS\n");
        report.push_str("────────────────────────────────────────────────────────────────────────────────\n\n");
        for stats in &data.analysis.stats {
            report.push_str(&generate_profession_card(stats));
            report.push('\n');
        }

        report.push_str("VACANCY COUNTS\n");
        report.push_str("────────────────────────────────────────────────────────────────────────────────\n");
        report.push_str(&generate_bar_chart(
            data.analysis
                .stats
                .iter()
                .map(|s| (s.profession.as_str(), s.vacancy_count)),
        ));
        report.push('\n');

        report.push_str("AVERAGE SALARIES\n");
        report.push_str("────────────────────────────────────────────────────────────────────────────────\n");
        report.push_str(&generate_bar_chart(
            data.analysis
                .stats
                .iter()
                .map(|s| (s.profession.as_str(), s.average_salary.unwrap_or(0))),
        ));
        report.push('\n');
    }

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("                              End of Report\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    report
}

pub fn generate_career_json_report(data: &CareerReportData) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Kompas",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "input": {
                "skills": data.skills,
                "interests": data.interests
            },
            "recommendations": data.analysis.recommendations,
            "professions": data.analysis.professions,
            "stats": data.analysis.stats
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Render one profession card: salary figures, demand, skills, search link.
fn generate_profession_card(stats: &ProfessionStats) -> String {
    let mut card = String::new();

    card.push_str(&format!(
        "  {}  —  {}\n",
        stats.profession,
        format_salary(stats.average_salary)
    ));
    card.push_str(&format!(
        "    Вакансий: {}   Медианная з/п: {}   Динамика: {}\n",
        stats.vacancy_count,
        format_salary(stats.median_salary),
        stats.trend
    ));
    if !stats.top_skills.is_empty() {
        card.push_str(&format!("    Навыки: {}\n", stats.top_skills.join(", ")));
    }
    card.push_str(&format!("    🔍 {}\n", stats.search_url));

    card
}

/// Horizontal ASCII bar chart, scaled to the largest value.
fn generate_bar_chart<'a>(values: impl Iterator<Item = (&'a str, u64)>) -> String {
    let rows: Vec<(&str, u64)> = values.collect();
    let max = rows.iter().map(|(_, v)| *v).max().unwrap_or(0);

    let label_width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0)
        .min(24);

    let mut chart = String::new();
    for (label, value) in rows {
        let bar_len = if max == 0 {
            0
        } else {
            ((value as f64 / max as f64) * CHART_WIDTH as f64).round() as usize
        };

        let short: String = label.chars().take(label_width).collect();
        chart.push_str(&format!(
            "  {:<width$} {} {}\n",
            short,
            "█".repeat(bar_len),
            value,
            width = label_width
        ));
    }

    chart
}

/// The answered path rendered step by step as a descending tree.
fn generate_path_tree(path: &[Step]) -> String {
    if path.is_empty() {
        return "  (empty)\n".to_string();
    }

    let mut tree = String::new();
    for (i, step) in path.iter().enumerate() {
        let prefix = if i == path.len() - 1 { "└── " } else { "├── " };
        let indent = "    ".repeat(i.min(8));
        tree.push_str(&format!("  {}{}{}\n", indent, prefix, step.question));
        tree.push_str(&format!("  {}    → {}\n", indent, step.answer));
    }

    tree
}

pub fn format_salary(salary: Option<u64>) -> String {
    match salary {
        Some(amount) => format!("{} ₸", group_thousands(amount)),
        None => "Н/Д".to_string(),
    }
}

fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::new();

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    grouped
}

fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let mut result = String::new();

    for source_line in text.lines() {
        if source_line.trim().is_empty() {
            result.push('\n');
            continue;
        }

        let mut current_line = String::new();
        for word in source_line.split_whitespace() {
            if !current_line.is_empty()
                && current_line.chars().count() + word.chars().count() + 1 > width - indent.len()
            {
                result.push_str(indent);
                result.push_str(&current_line);
                result.push('\n');
                current_line.clear();
            }

            if !current_line.is_empty() {
                current_line.push(' ');
            }
            current_line.push_str(word);
        }

        if !current_line.is_empty() {
            result.push_str(indent);
            result.push_str(&current_line);
            result.push('\n');
        }
    }

    result
}
