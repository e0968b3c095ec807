use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use kompas_core::quiz::VacancyOutcome;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::starfield::Starfield;

/// Inline errors stay visible this long, then dismiss themselves.
const ERROR_DISPLAY: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Message types for communication between the quiz driver and the TUI
#[derive(Debug, Clone)]
pub enum QuizMessage {
    /// Session started with ID
    SessionStarted {
        session_id: String,
        total_steps: usize,
    },
    /// A loading placeholder should occupy the question slot
    Loading {
        message: String,
    },
    /// A question is ready; replaces the loading placeholder atomically
    Question {
        question: String,
        options: Vec<String>,
        depth: usize,
        fallback: bool,
    },
    /// Progress update after an answer
    Progress {
        answered: usize,
        total: usize,
    },
    /// Final profession text
    Result {
        profession: String,
        title: Option<String>,
    },
    /// Vacancy lookup outcome
    Vacancies(VacancyOutcome),
    /// Log message
    Log {
        level: LogLevel,
        message: String,
    },
    /// Transient inline error; auto-dismissed
    Error {
        message: String,
    },
}

/// What the user can ask the quiz driver to do.
#[derive(Debug, Clone, Copy)]
pub enum UiCommand {
    Answer(usize),
    Restart,
}

struct CurrentQuestion {
    question: String,
    options: Vec<String>,
    depth: usize,
    fallback: bool,
}

/// TUI state for one quiz run
pub struct QuizScreen {
    session_id: Option<String>,
    total_steps: usize,
    answered: usize,
    loading: Option<String>,
    question: Option<CurrentQuestion>,
    selected: usize,
    locked_choice: Option<usize>,
    result: Option<(String, Option<String>)>,
    vacancies: Option<VacancyOutcome>,
    logs: Vec<(LogLevel, String)>,
    error: Option<(String, Instant)>,
    starfield: Starfield,
    rx: mpsc::UnboundedReceiver<QuizMessage>,
}

impl QuizScreen {
    pub fn new(rx: mpsc::UnboundedReceiver<QuizMessage>) -> Self {
        Self {
            session_id: None,
            total_steps: 0,
            answered: 0,
            loading: None,
            question: None,
            selected: 0,
            locked_choice: None,
            result: None,
            vacancies: None,
            logs: Vec::new(),
            error: None,
            starfield: Starfield::new(),
            rx,
        }
    }

    /// Process incoming messages from the driver without blocking
    fn process_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                QuizMessage::SessionStarted {
                    session_id,
                    total_steps,
                } => {
                    self.session_id = Some(session_id);
                    self.total_steps = total_steps;
                    self.answered = 0;
                    self.question = None;
                    self.result = None;
                    self.vacancies = None;
                    self.locked_choice = None;
                }
                QuizMessage::Loading { message } => {
                    self.loading = Some(message);
                }
                QuizMessage::Question {
                    question,
                    options,
                    depth,
                    fallback,
                } => {
                    // Remove-then-insert: the loading placeholder and any
                    // stale question vanish in the same frame the new one
                    // appears.
                    self.loading = None;
                    self.question = Some(CurrentQuestion {
                        question,
                        options,
                        depth,
                        fallback,
                    });
                    self.selected = 0;
                    self.locked_choice = None;
                }
                QuizMessage::Progress { answered, total } => {
                    self.answered = answered;
                    self.total_steps = total;
                }
                QuizMessage::Result { profession, title } => {
                    self.loading = None;
                    self.question = None;
                    self.result = Some((profession, title));
                }
                QuizMessage::Vacancies(outcome) => {
                    self.loading = None;
                    self.vacancies = Some(outcome);
                }
                QuizMessage::Log { level, message } => {
                    self.logs.push((level, message));
                    if self.logs.len() > 500 {
                        self.logs.drain(0..self.logs.len() - 500);
                    }
                }
                QuizMessage::Error { message } => {
                    self.error = Some((message, Instant::now()));
                }
            }
        }

        if let Some((_, since)) = &self.error
            && since.elapsed() > ERROR_DISPLAY
        {
            self.error = None;
        }
    }

    fn option_count(&self) -> usize {
        self.question.as_ref().map(|q| q.options.len()).unwrap_or(0)
    }

    fn can_answer(&self) -> bool {
        self.question.is_some() && self.locked_choice.is_none() && self.loading.is_none()
    }

    fn render_question(&self, f: &mut Frame, area: Rect) {
        let title = match &self.question {
            Some(q) => format!(" Вопрос {} из {} ", q.depth + 1, self.total_steps),
            None => " Kompas ".to_string(),
        };
        let border_color = match &self.question {
            Some(q) if q.fallback => Color::Red,
            Some(_) => Color::Cyan,
            None => Color::DarkGray,
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(area);
        f.render_widget(block, area);

        if let Some(ref message) = self.loading {
            let loading = Paragraph::new(format!("⠋ {}", message))
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            f.render_widget(loading, inner);
            return;
        }

        let Some(ref current) = self.question else {
            let hint = Paragraph::new("Нажмите r, чтобы начать путешествие")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            f.render_widget(hint, inner);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(current.options.len() as u16 + 1)])
            .split(inner);

        let question = Paragraph::new(current.question.as_str())
            .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
            .wrap(Wrap { trim: true });
        f.render_widget(question, chunks[0]);

        let items: Vec<ListItem> = current
            .options
            .iter()
            .enumerate()
            .map(|(idx, option)| {
                let text = format!(" {}. {} ", idx + 1, option);
                let style = match self.locked_choice {
                    // Answered: the chosen option stays green, the rest dim out.
                    Some(chosen) if chosen == idx => {
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                    }
                    Some(_) => Style::default().fg(Color::DarkGray),
                    None if idx == self.selected => Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                    None => Style::default().fg(Color::Gray),
                };
                ListItem::new(text).style(style)
            })
            .collect();

        f.render_widget(List::new(items), chunks[1]);
    }

    fn render_result(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Ваш результат ")
            .border_style(Style::default().fg(Color::Green));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let Some((ref profession, ref title)) = self.result else {
            return;
        };

        let mut text = Vec::new();
        if let Some(title) = title {
            text.push(Line::from(Span::styled(
                format!("★ {}", title),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
            text.push(Line::from(""));
        }
        for line in profession.lines() {
            text.push(Line::from(line.to_string()));
        }

        text.push(Line::from(""));
        match &self.vacancies {
            Some(VacancyOutcome::Found(list)) => {
                text.push(Line::from(Span::styled(
                    "Актуальные вакансии",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for vacancy in list {
                    let salary = vacancy.salary.as_deref().unwrap_or("з/п не указана");
                    text.push(Line::from(format!(
                        "  • {} — {} ({})",
                        vacancy.name, vacancy.company, salary
                    )));
                }
            }
            Some(VacancyOutcome::Empty) => {
                text.push(Line::from(Span::styled(
                    "Вакансии не найдены",
                    Style::default().fg(Color::Yellow),
                )));
            }
            Some(VacancyOutcome::Failed(_)) => {
                text.push(Line::from(Span::styled(
                    "Не удалось загрузить вакансии",
                    Style::default().fg(Color::Red),
                )));
            }
            Some(VacancyOutcome::NotRequested) | None => {}
        }

        let paragraph = Paragraph::new(text).wrap(Wrap { trim: true });
        f.render_widget(paragraph, inner);
    }

    fn render_logs(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Журнал ")
            .border_style(Style::default().fg(Color::Magenta));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let height = inner.height as usize;
        let skip = self.logs.len().saturating_sub(height);

        let items: Vec<ListItem> = self
            .logs
            .iter()
            .skip(skip)
            .map(|(level, message)| {
                let (prefix, style) = match level {
                    LogLevel::Info => ("INFO ", Style::default().fg(Color::Blue)),
                    LogLevel::Warn => ("WARN ", Style::default().fg(Color::Yellow)),
                    LogLevel::Error => ("ERROR", Style::default().fg(Color::Red)),
                };
                ListItem::new(format!("[{}] {}", prefix, message)).style(style)
            })
            .collect();

        f.render_widget(List::new(items), inner);
    }

    fn render_progress(&self, f: &mut Frame, area: Rect) {
        let ratio = if self.total_steps == 0 {
            0.0
        } else {
            (self.answered as f64 / self.total_steps as f64).min(1.0)
        };

        let mut title = " Прогресс ".to_string();
        if let Some(ref session_id) = self.session_id {
            title = format!(" Прогресс · {} ", session_id);
        }

        let gauge = Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(ratio)
            .label(format!("{}/{}", self.answered, self.total_steps));
        f.render_widget(gauge, area);
    }

    fn render_hints(&self, f: &mut Frame, area: Rect) {
        let key_style = Style::default().fg(Color::Black).bg(Color::Gray);
        let mut spans = vec![
            Span::styled(" ↑/↓ ", key_style),
            Span::raw(" Выбор  "),
            Span::styled(" Enter ", key_style),
            Span::raw(" Ответить  "),
            Span::styled(" 1-9 ", key_style),
            Span::raw(" Быстрый ответ  "),
            Span::styled(" r ", key_style),
            Span::raw(" Заново  "),
            Span::styled(" q/ESC ", key_style),
            Span::raw(" Выход"),
        ];

        if let Some((ref message, _)) = self.error {
            spans.push(Span::raw("   "));
            spans.push(Span::styled(
                format!("⚠ {}", message),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }

        let paragraph =
            Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black).fg(Color::Gray));
        f.render_widget(paragraph, area);
    }

    fn draw(&self, f: &mut Frame) {
        let size = f.area();

        // Starfield first, everything else on top of it.
        f.render_widget(&self.starfield, size);

        let vertical_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(10),   // Main area
                Constraint::Length(3), // Progress gauge
                Constraint::Length(1), // Hints bar
            ])
            .split(size);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(62), // Question / result
                Constraint::Percentage(38), // Logs
            ])
            .split(vertical_chunks[0]);

        if self.result.is_some() {
            self.render_result(f, main_chunks[0]);
        } else {
            self.render_question(f, main_chunks[0]);
        }
        self.render_logs(f, main_chunks[1]);
        self.render_progress(f, vertical_chunks[1]);
        self.render_hints(f, vertical_chunks[2]);
    }
}

/// Run the quiz screen (blocking function, should be run in a separate
/// thread while the driver task owns the controller).
pub fn run_quiz_screen(
    rx: mpsc::UnboundedReceiver<QuizMessage>,
    commands: mpsc::UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut screen = QuizScreen::new(rx);

    loop {
        screen.process_messages();
        screen.starfield.tick();

        terminal.draw(|f| screen.draw(f))?;

        if event::poll(Duration::from_millis(60))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Up => {
                    if screen.can_answer() && screen.selected > 0 {
                        screen.selected -= 1;
                    }
                }
                KeyCode::Down => {
                    let count = screen.option_count();
                    if screen.can_answer() && count > 0 && screen.selected < count - 1 {
                        screen.selected += 1;
                    }
                }
                KeyCode::Enter => {
                    if screen.can_answer() {
                        screen.locked_choice = Some(screen.selected);
                        if commands.send(UiCommand::Answer(screen.selected)).is_err() {
                            break;
                        }
                    }
                }
                KeyCode::Char(c @ '1'..='9') => {
                    let idx = (c as usize) - ('1' as usize);
                    if screen.can_answer() && idx < screen.option_count() {
                        screen.selected = idx;
                        screen.locked_choice = Some(idx);
                        if commands.send(UiCommand::Answer(idx)).is_err() {
                            break;
                        }
                    }
                }
                KeyCode::Char('r') => {
                    if commands.send(UiCommand::Restart).is_err() {
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

/// Create the channel pair connecting the quiz driver and the screen
pub fn create_screen_channels() -> (
    mpsc::UnboundedSender<QuizMessage>,
    mpsc::UnboundedReceiver<QuizMessage>,
    mpsc::UnboundedSender<UiCommand>,
    mpsc::UnboundedReceiver<UiCommand>,
) {
    let (msg_tx, msg_rx) = mpsc::unbounded_channel();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    (msg_tx, msg_rx, cmd_tx, cmd_rx)
}
