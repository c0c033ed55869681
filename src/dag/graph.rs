// src/dag/graph.rs

use std::collections::BTreeMap;

use crate::dag::registry::TaskRegistry;
use crate::engine::TaskName;

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone)]
struct DagNode {
    /// Direct prerequisites: tasks that must succeed before this one can run.
    deps: Vec<TaskName>,
    /// Direct dependents: tasks that list this one as a prerequisite.
    dependents: Vec<TaskName>,
}

/// Adjacency view of a [`TaskRegistry`], keyed by task name.
///
/// Acyclicity and resolvable references are checked by
/// [`TaskRegistry::validate`]; this type only stores edges for scheduling.
#[derive(Debug, Clone)]
pub struct DagGraph {
    nodes: BTreeMap<TaskName, DagNode>,
}

impl DagGraph {
    pub fn from_registry(registry: &TaskRegistry) -> Self {
        let mut nodes: BTreeMap<TaskName, DagNode> = registry
            .tasks()
            .map(|task| {
                (
                    task.name.clone(),
                    DagNode {
                        deps: task.prerequisites.clone(),
                        dependents: Vec::new(),
                    },
                )
            })
            .collect();

        for task in registry.tasks() {
            for dep in &task.prerequisites {
                if let Some(dep_node) = nodes.get_mut(dep) {
                    dep_node.dependents.push(task.name.clone());
                }
            }
        }

        Self { nodes }
    }

    /// Return all task names (sorted).
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    /// Immediate prerequisites of a task.
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }
}
