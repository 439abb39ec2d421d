//! Task and application (task graph) model.
//!
//! An application is a DAG of tasks. Each task names its parents (tasks
//! whose output it consumes) and children (tasks that consume its output).
//! The graph is immutable once loaded; the scheduler only reads it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};

/// A single task (compute kernel invocation) in an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task name within the application.
    pub name: String,
    /// Numeric id, assigned in insertion order by [`Application`].
    pub id: usize,
    /// Names of tasks that must complete before this one starts.
    pub parents: Vec<String>,
    /// Names of tasks that consume this task's output.
    pub children: Vec<String>,
}

impl Task {
    /// Creates a task with no dependencies.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: 0,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Adds a parent task.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// Adds a child task.
    pub fn with_child(mut self, child: impl Into<String>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Whether this task has no parents.
    pub fn is_entry(&self) -> bool {
        self.parents.is_empty()
    }

    /// Whether this task has no children.
    pub fn is_exit(&self) -> bool {
        self.children.is_empty()
    }
}

/// An application: a named DAG of tasks.
///
/// Tasks are kept in insertion order; `Task::id` equals the position.
/// Decision vectors index tasks by this order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ApplicationRecord")]
pub struct Application {
    /// Application name (key for profiling weights).
    pub name: String,
    /// Tasks in insertion order.
    tasks: Vec<Task>,
    /// task name → position in `tasks`.
    #[serde(skip)]
    index: HashMap<String, usize>,
}

/// Wire form of [`Application`]; the name index is rebuilt on load.
#[derive(Deserialize)]
struct ApplicationRecord {
    name: String,
    tasks: Vec<Task>,
}

impl From<ApplicationRecord> for Application {
    fn from(record: ApplicationRecord) -> Self {
        record
            .tasks
            .into_iter()
            .fold(Self::new(record.name), Self::with_task)
    }
}

impl Application {
    /// Creates an empty application.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Builds an application from task names and `(parent, child)` edges.
    ///
    /// Parent and child lists are filled symmetrically.
    pub fn from_edges(
        name: impl Into<String>,
        tasks: &[&str],
        edges: &[(&str, &str)],
    ) -> Self {
        let mut app = Self::new(name);
        for &task in tasks {
            app = app.with_task(Task::new(task));
        }
        for &(parent, child) in edges {
            if let Some(&i) = app.index.get(parent) {
                app.tasks[i].children.push(child.to_string());
            }
            if let Some(&i) = app.index.get(child) {
                app.tasks[i].parents.push(parent.to_string());
            }
        }
        app
    }

    /// Adds a task, assigning its numeric id.
    ///
    /// A task with an already-registered name is still appended so that
    /// validation can report the duplicate.
    pub fn with_task(mut self, mut task: Task) -> Self {
        task.id = self.tasks.len();
        self.index.entry(task.name.clone()).or_insert(task.id);
        self.tasks.push(task);
        self
    }

    /// Tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the application has no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Looks up a task by name.
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.position(name).map(|i| &self.tasks[i])
    }

    /// Position (numeric id) of a task by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Tasks without parents.
    pub fn entry_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.is_entry()).collect()
    }

    /// Tasks without children.
    pub fn exit_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.is_exit()).collect()
    }

    /// All `(parent, child)` edges as task positions, derived from child lists.
    ///
    /// References to unknown tasks are skipped.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges = Vec::new();
        for task in &self.tasks {
            for child in &task.children {
                if let Some(c) = self.position(child) {
                    edges.push((task.id, c));
                }
            }
        }
        edges
    }

    /// Tasks grouped by name, for lookups where order does not matter.
    pub fn by_name(&self) -> BTreeMap<&str, &Task> {
        self.tasks.iter().map(|t| (t.name.as_str(), t)).collect()
    }

    /// Topological order of task positions (Kahn's algorithm).
    ///
    /// Returns `None` if the graph contains a cycle.
    pub fn topological_order(&self) -> Option<Vec<usize>> {
        let n = self.tasks.len();
        let mut in_degree = vec![0usize; n];
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (p, c) in self.edges() {
            in_degree[c] += 1;
            successors[p].push(c);
        }

        let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(i) = queue.pop_front() {
            order.push(i);
            for &s in &successors[i] {
                in_degree[s] -= 1;
                if in_degree[s] == 0 {
                    queue.push_back(s);
                }
            }
        }

        (order.len() == n).then_some(order)
    }
}
