pub mod client;
pub mod error;
pub mod types;

pub use client::QuizClient;
pub use error::ApiError;
pub use types::{NodeResponse, ProfessionStats, ResultResponse, Step, Vacancy};
