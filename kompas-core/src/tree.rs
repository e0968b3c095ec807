use kompas_api::Step;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

/// Horizontal spread of a depth-1 child from its parent, in layout cells.
/// Halves with every further level so branches never overlap.
pub const H_SPREAD: i32 = 16;
/// Vertical distance between consecutive depths, in layout cells.
pub const V_STEP: i32 = 4;

/// One rendered question-and-options unit at a given depth. Exists from the
/// moment a backend response (or fallback) arrives; a node answers at most
/// once and stays frozen afterwards.
#[derive(Debug, Clone)]
pub struct QuizNode {
    pub question: String,
    pub options: Vec<String>,
    pub depth: usize,
    pub pos: (i32, i32),
    pub chosen: Option<usize>,
    pub fallback: bool,
}

impl QuizNode {
    pub fn is_answered(&self) -> bool {
        self.chosen.is_some()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("node is not part of this tree")]
    UnknownNode,

    #[error("parent node has no recorded answer")]
    ParentUnanswered,

    #[error("node already answered; options stay locked for the session")]
    AlreadyAnswered,

    #[error("option {given} out of range, node offers {available}")]
    InvalidOption { given: usize, available: usize },
}

/// Explicit quiz tree: node id -> parent id via graph edges, depth and
/// path-prefix recoverable without any captured closures. The parent edge
/// is only inserted once the child node exists, so edge endpoints are
/// always valid.
pub struct QuizTree {
    graph: DiGraph<QuizNode, ()>,
    root: Option<NodeIndex>,
}

impl QuizTree {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            root: None,
        }
    }

    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node(&self, id: NodeIndex) -> Option<&QuizNode> {
        self.graph.node_weight(id)
    }

    pub fn parent(&self, id: NodeIndex) -> Option<NodeIndex> {
        self.graph.neighbors_directed(id, Direction::Incoming).next()
    }

    /// Place the first question at the layout origin.
    pub fn add_root(&mut self, question: String, options: Vec<String>, fallback: bool) -> NodeIndex {
        let id = self.graph.add_node(QuizNode {
            question,
            options,
            depth: 0,
            pos: (0, 0),
            chosen: None,
            fallback,
        });
        self.root = Some(id);
        id
    }

    /// Attach the next question beneath an answered parent. The child lands
    /// left of the parent for an even chosen option, right for an odd one,
    /// with the spread shrinking at every depth.
    pub fn add_child(
        &mut self,
        parent: NodeIndex,
        question: String,
        options: Vec<String>,
        fallback: bool,
    ) -> Result<NodeIndex, TreeError> {
        let parent_node = self.graph.node_weight(parent).ok_or(TreeError::UnknownNode)?;
        let chosen = parent_node.chosen.ok_or(TreeError::ParentUnanswered)?;

        let depth = parent_node.depth + 1;
        let dir: i32 = if chosen % 2 == 0 { -1 } else { 1 };
        let spread = (H_SPREAD >> parent_node.depth.min(3)).max(2);
        let pos = (parent_node.pos.0 + dir * spread, parent_node.pos.1 + V_STEP);

        let child = self.graph.add_node(QuizNode {
            question,
            options,
            depth,
            pos,
            chosen: None,
            fallback,
        });
        self.graph.add_edge(parent, child, ());

        Ok(child)
    }

    /// Record the chosen option on a node. The first selection wins; every
    /// later attempt is rejected so a step can never be submitted twice.
    pub fn mark_answered(&mut self, id: NodeIndex, option: usize) -> Result<(), TreeError> {
        let node = self.graph.node_weight_mut(id).ok_or(TreeError::UnknownNode)?;
        if node.is_answered() {
            return Err(TreeError::AlreadyAnswered);
        }
        if option >= node.options.len() {
            return Err(TreeError::InvalidOption {
                given: option,
                available: node.options.len(),
            });
        }
        node.chosen = Some(option);
        Ok(())
    }

    /// Reconstruct the answered path-prefix from the root down to (and
    /// including) the given node, skipping anything not yet answered.
    pub fn path_to(&self, id: NodeIndex) -> Vec<Step> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            chain.push(current);
            cursor = self.parent(current);
        }
        chain.reverse();

        chain
            .into_iter()
            .filter_map(|idx| {
                let node = self.node(idx)?;
                let chosen = node.chosen?;
                Some(Step::new(node.question.clone(), node.options[chosen].clone()))
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.graph.clear();
        self.root = None;
    }
}

impl Default for QuizTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_options() -> Vec<String> {
        vec!["Левый".to_string(), "Правый".to_string()]
    }

    #[test]
    fn test_children_alternate_sides_of_parent() {
        let mut tree = QuizTree::new();
        let root = tree.add_root("Q0".to_string(), two_options(), false);

        tree.mark_answered(root, 0).unwrap();
        let left = tree.add_child(root, "Q1".to_string(), two_options(), false).unwrap();
        assert!(tree.node(left).unwrap().pos.0 < 0);

        tree.mark_answered(left, 1).unwrap();
        let right = tree.add_child(left, "Q2".to_string(), two_options(), false).unwrap();
        let (left_node, right_node) = (tree.node(left).unwrap(), tree.node(right).unwrap());
        assert!(right_node.pos.0 > left_node.pos.0);
        assert_eq!(right_node.pos.1, left_node.pos.1 + V_STEP);
        assert_eq!(right_node.depth, 2);
    }

    #[test]
    fn test_child_requires_answered_parent() {
        let mut tree = QuizTree::new();
        let root = tree.add_root("Q0".to_string(), two_options(), false);

        let err = tree
            .add_child(root, "Q1".to_string(), two_options(), false)
            .unwrap_err();
        assert_eq!(err, TreeError::ParentUnanswered);
    }

    #[test]
    fn test_first_answer_locks_the_node() {
        let mut tree = QuizTree::new();
        let root = tree.add_root("Q0".to_string(), two_options(), false);

        tree.mark_answered(root, 1).unwrap();
        assert_eq!(tree.mark_answered(root, 0), Err(TreeError::AlreadyAnswered));
        assert_eq!(tree.node(root).unwrap().chosen, Some(1));
    }

    #[test]
    fn test_out_of_range_option_is_rejected() {
        let mut tree = QuizTree::new();
        let root = tree.add_root("Q0".to_string(), two_options(), false);

        assert_eq!(
            tree.mark_answered(root, 5),
            Err(TreeError::InvalidOption { given: 5, available: 2 })
        );
        assert!(!tree.node(root).unwrap().is_answered());
    }

    #[test]
    fn test_path_reconstruction_follows_parent_edges() {
        let mut tree = QuizTree::new();
        let root = tree.add_root("Q0".to_string(), two_options(), false);
        tree.mark_answered(root, 0).unwrap();
        let mid = tree.add_child(root, "Q1".to_string(), two_options(), false).unwrap();
        tree.mark_answered(mid, 1).unwrap();
        let leaf = tree.add_child(mid, "Q2".to_string(), two_options(), false).unwrap();

        let path = tree.path_to(leaf);
        assert_eq!(path.len(), 2);
        assert_eq!(path[0], Step::new("Q0", "Левый"));
        assert_eq!(path[1], Step::new("Q1", "Правый"));

        tree.mark_answered(leaf, 0).unwrap();
        assert_eq!(tree.path_to(leaf).len(), 3);
    }
}
