// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    expand_output_path,
    parse_choice,
    render_career_report,
    render_quiz_report,
};
