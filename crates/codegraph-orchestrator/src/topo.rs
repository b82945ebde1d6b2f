//! Dependency topological sort for a phase's plugin list: an explicit
//! dependency declaration on each plugin that the orchestrator uses to
//! topologically sort and detect cycles.

use codegraph_core::{CodeGraphError, Result};
use std::collections::{HashMap, HashSet, VecDeque};

/// Orders `names` so that every name appears after all of its dependencies
/// (as reported by `deps_of`), using Kahn's algorithm. Dependencies outside
/// `names` are ignored — a plugin isn't required to enable everything it
/// could theoretically run after. Returns `CodeGraphError::Plugin` on a
/// cycle.
pub fn topo_sort(names: &[String], deps_of: impl Fn(&str) -> Vec<String>) -> Result<Vec<String>> {
    let present: HashSet<&str> = names.iter().map(String::as_str).collect();
    let mut in_degree: HashMap<&str, usize> = names.iter().map(|n| (n.as_str(), 0)).collect();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for name in names {
        for dep in deps_of(name) {
            if !present.contains(dep.as_str()) {
                continue;
            }
            *in_degree.get_mut(name.as_str()).unwrap() += 1;
            dependents.entry(names.iter().find(|n| **n == dep).unwrap().as_str()).or_default().push(name.as_str());
        }
    }

    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(&name, _)| name)
        .collect();
    // Deterministic ordering: process zero-in-degree nodes in the caller's
    // original order rather than hashmap iteration order.
    let order_index: HashMap<&str, usize> = names.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();
    let mut queue: Vec<&str> = queue.drain(..).collect();
    queue.sort_by_key(|n| order_index[n]);
    let mut queue: VecDeque<&str> = queue.into();

    let mut sorted = Vec::with_capacity(names.len());
    while let Some(name) = queue.pop_front() {
        sorted.push(name.to_string());
        if let Some(next) = dependents.get(name) {
            let mut newly_ready = Vec::new();
            for &dependent in next {
                let deg = in_degree.get_mut(dependent).unwrap();
                *deg -= 1;
                if *deg == 0 {
                    newly_ready.push(dependent);
                }
            }
            newly_ready.sort_by_key(|n| order_index[n]);
            for n in newly_ready {
                queue.push_back(n);
            }
        }
    }

    if sorted.len() != names.len() {
        return Err(CodeGraphError::Plugin(format!(
            "cycle detected among plugins: {}",
            names.join(", ")
        )));
    }

    Ok(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn independent_plugins_keep_input_order() {
        let names = vec!["A".to_string(), "B".to_string()];
        let sorted = topo_sort(&names, |_| vec![]).unwrap();
        assert_eq!(sorted, names);
    }

    #[test]
    fn dependency_runs_before_dependent() {
        let names = vec!["InstanceOfResolver".to_string(), "ImportExportLinker".to_string()];
        let sorted = topo_sort(&names, |n| {
            if n == "InstanceOfResolver" {
                vec!["ImportExportLinker".to_string()]
            } else {
                vec![]
            }
        })
        .unwrap();
        assert_eq!(sorted, vec!["ImportExportLinker".to_string(), "InstanceOfResolver".to_string()]);
    }

    #[test]
    fn cycle_is_rejected() {
        let names = vec!["A".to_string(), "B".to_string()];
        let err = topo_sort(&names, |n| {
            if n == "A" {
                vec!["B".to_string()]
            } else {
                vec!["A".to_string()]
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }
}
