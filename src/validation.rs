//! Input validation for task graphs.
//!
//! Checks structural integrity of an application before scheduling.
//! Detects:
//! - Empty graphs
//! - Duplicate task names
//! - Parent/child references to unknown tasks
//! - Parent/child lists that disagree with each other
//! - Circular dependencies (DAG validation)
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use crate::models::Application;
use std::collections::{HashMap, HashSet};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The application has no tasks.
    EmptyGraph,
    /// Two tasks share the same name.
    DuplicateId,
    /// A parent or child reference names a task that doesn't exist.
    UnknownTask,
    /// A task lists a child that doesn't list it as parent, or vice versa.
    AsymmetricEdge,
    /// Dependency graph contains a cycle.
    CyclicDependency,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates an application's task graph.
///
/// Checks:
/// 1. At least one task
/// 2. No duplicate task names
/// 3. All parent and child references point to existing tasks
/// 4. Parent and child lists agree (A lists B as child ⇔ B lists A as parent)
/// 5. No circular dependencies
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_application(app: &Application) -> ValidationResult {
    let mut errors = Vec::new();

    if app.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyGraph,
            format!("Application '{}' has no tasks", app.name),
        ));
        return Err(errors);
    }

    let mut names = HashSet::new();
    for task in app.tasks() {
        if !names.insert(task.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate task name: {}", task.name),
            ));
        }
    }

    let by_name = app.by_name();
    for task in app.tasks() {
        for parent in &task.parents {
            match by_name.get(parent.as_str()) {
                None => errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTask,
                    format!("Task '{}' references unknown parent '{}'", task.name, parent),
                )),
                Some(p) if !p.children.contains(&task.name) => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::AsymmetricEdge,
                        format!(
                            "Task '{}' lists parent '{}' which does not list it as child",
                            task.name, parent
                        ),
                    ))
                }
                Some(_) => {}
            }
        }
        for child in &task.children {
            match by_name.get(child.as_str()) {
                None => errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTask,
                    format!("Task '{}' references unknown child '{}'", task.name, child),
                )),
                Some(c) if !c.parents.contains(&task.name) => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::AsymmetricEdge,
                        format!(
                            "Task '{}' lists child '{}' which does not list it as parent",
                            task.name, child
                        ),
                    ))
                }
                Some(_) => {}
            }
        }
    }

    if let Some(cycle_err) = detect_cycles(app) {
        errors.push(cycle_err);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects cycles in the dependency graph using DFS.
///
/// # Algorithm
/// If a back-edge is found (visiting a node currently in the recursion
/// stack), a cycle exists. Both parent and child lists contribute edges so
/// that a cycle is caught even when the lists are asymmetric.
fn detect_cycles(app: &Application) -> Option<ValidationError> {
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    for task in app.tasks() {
        for child in &task.children {
            adj.entry(task.name.as_str()).or_default().push(child.as_str());
        }
        for parent in &task.parents {
            adj.entry(parent.as_str()).or_default().push(task.name.as_str());
        }
    }

    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();

    for task in app.tasks() {
        let node = task.name.as_str();
        if !visited.contains(node) && has_cycle_dfs(node, &adj, &mut visited, &mut in_stack) {
            return Some(ValidationError::new(
                ValidationErrorKind::CyclicDependency,
                format!("Circular dependency detected involving task '{node}'"),
            ));
        }
    }

    None
}

fn has_cycle_dfs<'a>(
    node: &'a str,
    adj: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    in_stack: &mut HashSet<&'a str>,
) -> bool {
    visited.insert(node);
    in_stack.insert(node);

    if let Some(neighbors) = adj.get(node) {
        for &next in neighbors {
            if in_stack.contains(next) {
                return true; // Back edge → cycle
            }
            if !visited.contains(next) && has_cycle_dfs(next, adj, visited, in_stack) {
                return true;
            }
        }
    }

    in_stack.remove(node);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;

    #[test]
    fn test_valid_chain() {
        let app = Application::from_edges("chain", &["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        assert!(validate_application(&app).is_ok());
    }

    #[test]
    fn test_multiple_entries() {
        let app = Application::from_edges(
            "fan-in",
            &["cam1", "cam2", "merge"],
            &[("cam1", "merge"), ("cam2", "merge")],
        );
        assert!(validate_application(&app).is_ok());
    }

    #[test]
    fn test_empty_graph() {
        let errors = validate_application(&Application::new("empty")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::EmptyGraph);
    }

    #[test]
    fn test_duplicate_task_name() {
        let app = Application::new("dup")
            .with_task(Task::new("A"))
            .with_task(Task::new("A"));
        let errors = validate_application(&app).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_unknown_reference() {
        let app = Application::new("bad").with_task(Task::new("A").with_child("ghost"));
        let errors = validate_application(&app).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::UnknownTask));
    }

    #[test]
    fn test_asymmetric_edge() {
        let app = Application::new("asym")
            .with_task(Task::new("A").with_child("B"))
            .with_task(Task::new("B"));
        let errors = validate_application(&app).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::AsymmetricEdge));
    }

    #[test]
    fn test_cyclic_dependency() {
        let app = Application::from_edges(
            "cycle",
            &["A", "B", "C"],
            &[("A", "B"), ("B", "C"), ("C", "A")],
        );
        let errors = validate_application(&app).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::CyclicDependency));
    }

    #[test]
    fn test_multiple_errors() {
        let app = Application::new("many")
            .with_task(Task::new("A").with_parent("ghost"))
            .with_task(Task::new("A"));
        let errors = validate_application(&app).unwrap_err();
        assert!(errors.len() >= 2);
    }
}
