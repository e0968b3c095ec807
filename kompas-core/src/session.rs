use kompas_api::Step;
use tracing::debug;
use uuid::Uuid;

/// Number of answered steps after which the quiz asks for a final result
/// instead of another question. The backend honors the same bound.
pub const DEFAULT_MAX_DEPTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingNode { depth: usize },
    QuestionShown { depth: usize },
    AwaitingResult,
    ResultShown,
    AwaitingVacancies,
    VacanciesShown,
    VacanciesEmpty,
    VacanciesFailed,
}

/// One quiz run: the answered path plus where the traversal currently is.
/// Starting over discards the whole session, id included.
pub struct QuizSession {
    id: String,
    path: Vec<Step>,
    max_depth: usize,
    state: SessionState,
}

impl QuizSession {
    pub fn new(max_depth: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            path: Vec::new(),
            max_depth,
            state: SessionState::Idle,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &[Step] {
        &self.path
    }

    /// Number of answered steps so far.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn set_state(&mut self, next: SessionState) {
        debug!("Session {}: {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }

    /// Append an answered step. The path is append-only and bounded: once
    /// `max_depth` steps are recorded, only a result request may follow.
    pub fn record(&mut self, step: Step) -> Result<(), PathFull> {
        if self.path.len() >= self.max_depth {
            return Err(PathFull {
                max_depth: self.max_depth,
            });
        }
        self.path.push(step);
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.path.len() >= self.max_depth
    }

    /// Discard the run entirely and become a fresh session.
    pub fn reset(&mut self) {
        self.id = Uuid::new_v4().to_string();
        self.path.clear();
        self.state = SessionState::Idle;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("quiz path already holds {max_depth} steps")]
pub struct PathFull {
    pub max_depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_is_bounded_by_max_depth() {
        let mut session = QuizSession::new(3);

        for i in 0..3 {
            assert!(!session.is_complete());
            session
                .record(Step::new(format!("Q{}", i), "A"))
                .unwrap();
            assert!(session.depth() <= session.max_depth());
        }

        assert!(session.is_complete());
        let err = session.record(Step::new("Q4", "A")).unwrap_err();
        assert_eq!(err.max_depth, 3);
        assert_eq!(session.depth(), 3);
    }

    #[test]
    fn test_reset_discards_path_and_identity() {
        let mut session = QuizSession::new(2);
        session.record(Step::new("Q", "A")).unwrap();
        session.set_state(SessionState::QuestionShown { depth: 1 });
        let old_id = session.id().to_string();

        session.reset();

        assert_eq!(session.depth(), 0);
        assert_eq!(session.state(), SessionState::Idle);
        assert_ne!(session.id(), old_id);
    }
}
