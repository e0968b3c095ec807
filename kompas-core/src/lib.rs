pub mod career;
pub mod quiz;
pub mod report;
pub mod session;
pub mod tree;

pub use career::{CareerAdvisor, CareerAnalysis, CareerError};
pub use quiz::{QuizConfig, QuizController, QuizError, QuizOutcome, StepOutcome, VacancyOutcome};
pub use session::{QuizSession, SessionState};
pub use tree::{QuizNode, QuizTree};

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
    ██╗  ██╗ ██████╗ ███╗   ███╗██████╗  █████╗ ███████╗
    ██║ ██╔╝██╔═══██╗████╗ ████║██╔══██╗██╔══██╗██╔════╝
    █████╔╝ ██║   ██║██╔████╔██║██████╔╝███████║███████╗
    ██╔═██╗ ██║   ██║██║╚██╔╝██║██╔═══╝ ██╔══██║╚════██║
    ██║  ██╗╚██████╔╝██║ ╚═╝ ██║██║     ██║  ██║███████║
    ╚═╝  ╚═╝ ╚═════╝ ╚═╝     ╚═╝╚═╝     ╚═╝  ╚═╝╚══════╝
"#;

    println!("{}", banner.bright_cyan());
    println!(
        "    {} v{}\n",
        "An AI-guided career navigator".bright_white(),
        env!("CARGO_PKG_VERSION")
    );
}
