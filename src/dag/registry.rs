// src/dag/registry.rs

//! Named tasks and their prerequisites.
//!
//! The registry is built once at startup and then shared (behind an `Arc`)
//! by the scheduler, which only needs names and edges, and the executor,
//! which looks actions up by name.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::actions::BuildAction;
use crate::engine::TaskName;
use crate::errors::{Result, SiteBuildError};

/// A registered task.
///
/// `action` is `None` for composite tasks such as `build`, which exist only
/// to pull in their prerequisites.
#[derive(Clone)]
pub struct Task {
    pub name: TaskName,
    pub prerequisites: Vec<TaskName>,
    pub action: Option<Arc<dyn BuildAction>>,
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("prerequisites", &self.prerequisites)
            .field("composite", &self.action.is_none())
            .finish()
    }
}

/// Mapping from task name to task, in registration order.
#[derive(Debug, Default, Clone)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    index: HashMap<TaskName, usize>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task. Fails if `name` is already registered.
    ///
    /// Prerequisites may name tasks registered later; [`validate`](Self::validate)
    /// checks that they all resolve.
    pub fn register<N, I, S>(
        &mut self,
        name: N,
        prerequisites: I,
        action: Option<Arc<dyn BuildAction>>,
    ) -> Result<()>
    where
        N: Into<TaskName>,
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(SiteBuildError::DuplicateTask(format!(
                "task '{name}' is already registered"
            )));
        }

        self.index.insert(name.clone(), self.tasks.len());
        self.tasks.push(Task {
            name,
            prerequisites: prerequisites.into_iter().map(Into::into).collect(),
            action,
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.index.get(name).map(|&i| &self.tasks[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Tasks in registration order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Check that every prerequisite is registered and that the graph is
    /// acyclic.
    pub fn validate(&self) -> Result<()> {
        self.validate_prerequisites()?;
        self.validate_dag()?;
        Ok(())
    }

    fn validate_prerequisites(&self) -> Result<()> {
        for task in &self.tasks {
            for dep in &task.prerequisites {
                if dep == &task.name {
                    return Err(SiteBuildError::ConfigError(format!(
                        "task '{}' cannot depend on itself",
                        task.name
                    )));
                }
                if !self.contains(dep) {
                    return Err(SiteBuildError::ConfigError(format!(
                        "task '{}' has unknown dependency '{}'",
                        task.name, dep
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_dag(&self) -> Result<()> {
        // Edge direction: prerequisite -> task.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for task in &self.tasks {
            graph.add_node(task.name.as_str());
        }
        for task in &self.tasks {
            for dep in &task.prerequisites {
                graph.add_edge(dep.as_str(), task.name.as_str(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => Err(SiteBuildError::DagCycle(format!(
                "dependency cycle involving task '{}'",
                cycle.node_id()
            ))),
        }
    }

    /// Expand `name` into the ordered list of tasks to execute: prerequisites
    /// first (depth-first, in declaration order), each task at most once.
    pub fn resolve(&self, name: &str) -> Result<Vec<&Task>> {
        let mut order = Vec::new();
        let mut done = HashSet::new();
        let mut visiting = Vec::new();
        self.visit(name, &mut visiting, &mut done, &mut order)?;
        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        name: &str,
        visiting: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
        order: &mut Vec<&'a Task>,
    ) -> Result<()> {
        if done.contains(name) {
            return Ok(());
        }

        let task = self
            .get(name)
            .ok_or_else(|| SiteBuildError::TaskNotFound(name.to_string()))?;

        if let Some(pos) = visiting.iter().position(|v| *v == task.name) {
            let mut path: Vec<&str> = visiting[pos..].to_vec();
            path.push(task.name.as_str());
            return Err(SiteBuildError::DagCycle(format!(
                "dependency cycle: {}",
                path.join(" -> ")
            )));
        }

        visiting.push(task.name.as_str());
        for dep in &task.prerequisites {
            self.visit(dep, visiting, done, order)?;
        }
        visiting.pop();

        done.insert(task.name.as_str());
        order.push(task);
        Ok(())
    }
}
