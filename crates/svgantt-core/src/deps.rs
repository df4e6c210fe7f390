//! Reverse dependency index
//!
//! Tasks declare the tasks they depend on. Dragging a task has to move
//! everything that (transitively) depends on it, so the index stores the
//! edges reversed: dependency -> dependents.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::task::ResolvedTask;
use crate::TaskId;

/// Mapping from a task to the tasks that declare it as a dependency
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DependencyIndex {
    dependents: HashMap<TaskId, Vec<TaskId>>,
}

impl DependencyIndex {
    /// Build the index from resolved tasks.
    ///
    /// Dependencies on unknown ids are kept: they simply never appear as a
    /// task, so no connector is drawn for them.
    pub fn build(tasks: &[ResolvedTask]) -> Self {
        let mut dependents: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
        for task in tasks {
            for dep in &task.dependencies {
                let entry = dependents.entry(dep.clone()).or_default();
                if !entry.contains(&task.id) {
                    entry.push(task.id.clone());
                }
            }
        }
        Self { dependents }
    }

    /// Direct dependents of `id`, in task order
    pub fn dependents_of(&self, id: &str) -> &[TaskId] {
        self.dependents.get(id).map_or(&[], Vec::as_slice)
    }

    /// All tasks transitively depending on `id`, breadth-first, without `id`.
    ///
    /// Terminates on cyclic graphs: every id is expanded at most once.
    pub fn descendants(&self, id: &str) -> Vec<TaskId> {
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(id);

        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(id);

        let mut result = Vec::new();
        while let Some(current) = queue.pop_front() {
            for next in self.dependents_of(current) {
                if visited.insert(next.as_str()) {
                    result.push(next.clone());
                    queue.push_back(next.as_str());
                }
            }
        }
        result
    }

    /// Number of tasks with at least one dependent
    pub fn len(&self) -> usize {
        self.dependents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Task, TaskResolver};
    use pretty_assertions::assert_eq;

    fn index(tasks: Vec<Task>) -> DependencyIndex {
        TaskResolver::new().resolve(&tasks).dependencies
    }

    #[test]
    fn dependents_are_reversed_edges() {
        let idx = index(vec![
            Task::new("a"),
            Task::new("b").depends_on("a"),
            Task::new("c").depends_on("a"),
        ]);
        assert_eq!(idx.dependents_of("a"), ["b".to_string(), "c".to_string()]);
        assert!(idx.dependents_of("b").is_empty());
    }

    #[test]
    fn descendants_are_transitive_and_exclude_self() {
        let idx = index(vec![
            Task::new("a"),
            Task::new("b").depends_on("a"),
            Task::new("c").depends_on("b"),
            Task::new("d").depends_on("c").depends_on("a"),
        ]);
        assert_eq!(idx.descendants("a"), vec!["b", "d", "c"]);
        assert_eq!(idx.descendants("c"), vec!["d"]);
        assert!(idx.descendants("d").is_empty());
    }

    #[test]
    fn descendants_terminate_on_cycles() {
        let idx = index(vec![
            Task::new("a").depends_on("c"),
            Task::new("b").depends_on("a"),
            Task::new("c").depends_on("b"),
        ]);
        assert_eq!(idx.descendants("a"), vec!["b", "c"]);
    }

    #[test]
    fn unknown_dependencies_are_indexed_but_harmless() {
        let idx = index(vec![Task::new("a").depends_on("ghost")]);
        assert_eq!(idx.dependents_of("ghost"), ["a".to_string()]);
        assert_eq!(idx.descendants("ghost"), vec!["a"]);
    }
}
