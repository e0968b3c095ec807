use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use kompas_api::QuizClient;
use kompas_core::career::CareerAdvisor;
use kompas_core::quiz::{QuestionView, QuizConfig, QuizController, QuizProgress, StepOutcome};
use kompas_core::report::{
    CareerReportData, QuizReportData, ReportFormat, generate_career_json_report,
    generate_career_text_report, generate_quiz_json_report, generate_quiz_text_report,
    save_report,
};
use kompas_tui::{LogLevel, QuizMessage, UiCommand, create_screen_channels, run_quiz_screen};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

// Helper functions shared by the command handlers

/// Parse a 1-based menu choice typed by the user into a 0-based index.
pub fn parse_choice(input: &str, options: usize) -> Option<usize> {
    let n: usize = input.trim().parse().ok()?;
    (1..=options).contains(&n).then(|| n - 1)
}

/// Tilde-expand a report output path.
pub fn expand_output_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).into_owned())
}

pub fn render_quiz_report(
    data: &QuizReportData,
    format: &ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_quiz_text_report(data)),
        ReportFormat::Json => generate_quiz_json_report(data),
    }
}

pub fn render_career_report(
    data: &CareerReportData,
    format: &ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_career_text_report(data)),
        ReportFormat::Json => generate_career_json_report(data),
    }
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

/// Numeric/yes-no prompt; the response comes back trimmed and lowercased.
fn print_prompt(msg: &str) -> String {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush().unwrap();
    let mut response = String::new();
    io::stdin().read_line(&mut response).unwrap();
    response.trim().to_lowercase()
}

/// Free-text prompt; preserves the user's casing.
fn read_line_prompt(msg: &str) -> String {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush().unwrap();
    let mut response = String::new();
    io::stdin().read_line(&mut response).unwrap();
    response.trim().to_string()
}

fn make_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn report_format_from(sub_matches: &ArgMatches) -> ReportFormat {
    sub_matches
        .get_one::<String>("format")
        .and_then(|s| ReportFormat::from_str(s))
        .unwrap_or(ReportFormat::Text)
}

fn save_if_requested(report: &str, output: Option<&PathBuf>) {
    if let Some(output) = output {
        let path = expand_output_path(output);
        match save_report(report, &path) {
            Ok(()) => println!(
                "{} Отчёт сохранён: {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            ),
            Err(e) => eprintln!("✗ Не удалось сохранить отчёт: {}", e),
        }
    }
}

pub async fn handle_quiz(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let base_url = sub_matches.get_one::<Url>("base-url").unwrap().clone();
    let depth = *sub_matches.get_one::<usize>("depth").unwrap_or(&10);
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap_or(&30);
    let min_display = *sub_matches.get_one::<u64>("min-display-ms").unwrap_or(&1200);
    let output = sub_matches.get_one::<PathBuf>("output");
    let format = report_format_from(sub_matches);

    println!("\n🧭 Карьерное путешествие");
    println!("Backend: {}", base_url);
    println!("Вопросов: {}\n", depth);

    let client = QuizClient::with_timeout(base_url, timeout);
    let config = QuizConfig {
        max_depth: depth,
        min_display: Duration::from_millis(min_display),
        ..QuizConfig::default()
    };

    let spinner = make_spinner();
    let progress_spinner = spinner.clone();
    let mut controller = QuizController::with_config(client, config).with_progress_callback(
        Arc::new(move |progress| match progress {
            QuizProgress::Loading { message } => progress_spinner.set_message(message),
            QuizProgress::Retrying { attempt, limit } => {
                progress_spinner.set_message(format!("Повтор запроса {}/{}...", attempt, limit))
            }
            QuizProgress::TransientError { message } => {
                progress_spinner.println(format!("⚠ {}", message.yellow()))
            }
        }),
    );

    let mut view = match controller.start().await {
        Ok(view) => view,
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("✗ Не удалось начать путешествие: {}", e);
            std::process::exit(1);
        }
    };

    let outcome = loop {
        let choice = spinner.suspend(|| prompt_for_choice(&view, depth));
        match controller.select_option(choice).await {
            Ok(StepOutcome::Question(next)) => view = next,
            Ok(StepOutcome::Finished(outcome)) => break outcome,
            Err(e) => {
                spinner.finish_and_clear();
                eprintln!("✗ {}", e);
                std::process::exit(1);
            }
        }
    };

    spinner.finish_and_clear();
    println!("\n✓ Путешествие завершено!\n");

    let data = QuizReportData {
        session_id: controller.session().id().to_string(),
        path: controller.session().path().to_vec(),
        profession: outcome.profession,
        title: outcome.title,
        vacancies: outcome.vacancies,
    };

    match render_quiz_report(&data, &format) {
        Ok(report) => {
            print!("{}", report);
            save_if_requested(&report, output);
        }
        Err(e) => {
            eprintln!("✗ Не удалось собрать отчёт: {}", e);
            std::process::exit(1);
        }
    }
}

fn prompt_for_choice(view: &QuestionView, total: usize) -> usize {
    print_divider();
    println!(
        "{} {}",
        format!("[{}/{}]", view.depth + 1, total).bright_blue().bold(),
        view.question.bright_white().bold()
    );
    if view.fallback {
        println!("{}", "⚠ Запасной вопрос: backend не ответил".yellow());
    }
    for (i, option) in view.options.iter().enumerate() {
        println!("  {} {}", format!("{}.", i + 1).bright_cyan().bold(), option);
    }

    loop {
        let response = print_prompt(&format!("Ваш выбор [1-{}]:", view.options.len()));
        if let Some(idx) = parse_choice(&response, view.options.len()) {
            return idx;
        }
        println!("{}", "Введите номер варианта из списка".yellow());
    }
}

pub async fn handle_ui(sub_matches: &ArgMatches) {
    let base_url = sub_matches.get_one::<Url>("base-url").unwrap().clone();
    let depth = *sub_matches.get_one::<usize>("depth").unwrap_or(&10);
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap_or(&30);

    let (msg_tx, msg_rx, cmd_tx, cmd_rx) = create_screen_channels();

    let client = QuizClient::with_timeout(base_url, timeout);
    let config = QuizConfig {
        max_depth: depth,
        ..QuizConfig::default()
    };

    let progress_tx = msg_tx.clone();
    let controller = QuizController::with_config(client, config).with_progress_callback(Arc::new(
        move |progress| {
            let _ = match progress {
                QuizProgress::Loading { message } => {
                    progress_tx.send(QuizMessage::Loading { message })
                }
                QuizProgress::Retrying { attempt, limit } => progress_tx.send(QuizMessage::Log {
                    level: LogLevel::Warn,
                    message: format!("Повтор запроса {}/{}", attempt, limit),
                }),
                QuizProgress::TransientError { message } => {
                    progress_tx.send(QuizMessage::Error { message })
                }
            };
        },
    ));

    let driver = tokio::spawn(drive_quiz(controller, msg_tx, cmd_rx));
    let screen = tokio::task::spawn_blocking(move || run_quiz_screen(msg_rx, cmd_tx));

    match screen.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => eprintln!("✗ Ошибка интерфейса: {}", e),
        Err(e) => eprintln!("✗ Interface task failed: {}", e),
    }
    driver.abort();
}

/// Owns the controller for the lifetime of the TUI: answers arrive over the
/// command channel, rendered state flows back as messages.
async fn drive_quiz(
    mut controller: QuizController,
    msgs: mpsc::UnboundedSender<QuizMessage>,
    mut commands: mpsc::UnboundedReceiver<UiCommand>,
) {
    let total = controller.config().max_depth;
    start_session(&mut controller, &msgs, total).await;

    loop {
        match commands.recv().await {
            None => break,
            Some(UiCommand::Restart) => start_session(&mut controller, &msgs, total).await,
            Some(UiCommand::Answer(idx)) => match controller.select_option(idx).await {
                Ok(StepOutcome::Question(view)) => {
                    let _ = msgs.send(QuizMessage::Progress {
                        answered: controller.session().depth(),
                        total,
                    });
                    send_question(&msgs, &view);
                }
                Ok(StepOutcome::Finished(outcome)) => {
                    let _ = msgs.send(QuizMessage::Progress {
                        answered: total,
                        total,
                    });
                    let _ = msgs.send(QuizMessage::Result {
                        profession: outcome.profession,
                        title: outcome.title,
                    });
                    let _ = msgs.send(QuizMessage::Vacancies(outcome.vacancies));
                    let _ = msgs.send(QuizMessage::Log {
                        level: LogLevel::Info,
                        message: "Сессия завершена. r — начать заново".to_string(),
                    });
                }
                Err(e) => {
                    let _ = msgs.send(QuizMessage::Error {
                        message: e.to_string(),
                    });
                }
            },
        }
    }
}

async fn start_session(
    controller: &mut QuizController,
    msgs: &mpsc::UnboundedSender<QuizMessage>,
    total: usize,
) {
    match controller.start().await {
        Ok(view) => {
            let _ = msgs.send(QuizMessage::SessionStarted {
                session_id: controller.session().id().to_string(),
                total_steps: total,
            });
            let _ = msgs.send(QuizMessage::Progress { answered: 0, total });
            send_question(msgs, &view);
        }
        Err(e) => {
            let _ = msgs.send(QuizMessage::Error {
                message: e.to_string(),
            });
            let _ = msgs.send(QuizMessage::Log {
                level: LogLevel::Error,
                message: format!("Не удалось начать сессию: {}", e),
            });
        }
    }
}

fn send_question(msgs: &mpsc::UnboundedSender<QuizMessage>, view: &QuestionView) {
    let _ = msgs.send(QuizMessage::Question {
        question: view.question.clone(),
        options: view.options.clone(),
        depth: view.depth,
        fallback: view.fallback,
    });
}

pub async fn handle_predict(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let base_url = sub_matches.get_one::<Url>("base-url").unwrap().clone();
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap_or(&30);
    let output = sub_matches.get_one::<PathBuf>("output");
    let format = report_format_from(sub_matches);

    let skills = match sub_matches.get_one::<String>("skills") {
        Some(skills) => skills.clone(),
        None => read_line_prompt("Навыки (через запятую):"),
    };
    let interests = match sub_matches.get_one::<String>("interests") {
        Some(interests) => interests.clone(),
        None => read_line_prompt("Интересы (Enter — пропустить):"),
    };

    let spinner = make_spinner();
    spinner.set_message("АНАЛИЗ...");

    let advisor = CareerAdvisor::new(QuizClient::with_timeout(base_url, timeout));
    match advisor.analyze(&skills, &interests).await {
        Ok(analysis) => {
            spinner.finish_and_clear();
            println!("\n✓ Анализ завершён!\n");

            let data = CareerReportData {
                skills: skills.trim().to_string(),
                interests: interests.trim().to_string(),
                analysis,
            };
            match render_career_report(&data, &format) {
                Ok(report) => {
                    print!("{}", report);
                    save_if_requested(&report, output);
                }
                Err(e) => {
                    eprintln!("✗ Не удалось собрать отчёт: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{}", e.display_message().red().bold());
            std::process::exit(1);
        }
    }
}
