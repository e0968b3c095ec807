pub mod quiz_screen;
pub mod starfield;

pub use quiz_screen::{
    LogLevel, QuizMessage, QuizScreen, UiCommand, create_screen_channels, run_quiz_screen,
};
pub use starfield::Starfield;
