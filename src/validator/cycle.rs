//! Built-in cycle detector: classical DFS with recursion-stack tracking,
//! producing a structured `cyclePath`/`involvedEdges`/`cycleLength`
//! payload (spec §4.5).

use super::{ErrorType, ValidationError, ValidationResult, Validator};
use crate::config::{Config, Edge};
use std::collections::{HashMap, HashSet};

pub struct CycleValidator;

impl Validator for CycleValidator {
    fn name(&self) -> &str {
        "cycle-detector"
    }

    fn priority(&self) -> u32 {
        10
    }

    fn fail_fast(&self) -> bool {
        true
    }

    fn description(&self) -> &str {
        "Detects cycles in a workflow's non-terminal subgraph via DFS"
    }

    fn validate(&self, config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();
        for (workflow_name, workflow) in &config.workflows {
            if let Some(error) = detect_cycle(workflow_name, &workflow.edges) {
                result.errors.push(error);
            }
        }
        result
    }
}

/// Adjacency ignoring terminal targets (`SUCCESS`/`FAILURE`), preserving
/// declaration order per edge's source step.
fn adjacency(edges: &[Edge]) -> HashMap<&str, Vec<&Edge>> {
    let mut map: HashMap<&str, Vec<&Edge>> = HashMap::new();
    for edge in edges {
        if edge.is_terminal_target() {
            continue;
        }
        map.entry(edge.from.as_str()).or_default().push(edge);
    }
    map
}

fn detect_cycle(workflow_name: &str, edges: &[Edge]) -> Option<ValidationError> {
    let graph = adjacency(edges);
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = Vec::new();
    let mut on_stack: HashSet<&str> = HashSet::new();

    let mut nodes: Vec<&str> = graph.keys().copied().collect();
    nodes.sort();

    for &start in &nodes {
        if visited.contains(start) {
            continue;
        }
        if let Some(cycle) = dfs(start, &graph, &mut visited, &mut on_stack, &mut stack) {
            return Some(build_error(workflow_name, &cycle, &graph));
        }
    }
    None
}

fn dfs<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, Vec<&'a Edge>>,
    visited: &mut HashSet<&'a str>,
    on_stack: &mut HashSet<&'a str>,
    stack: &mut Vec<&'a str>,
) -> Option<Vec<&'a str>> {
    visited.insert(node);
    on_stack.insert(node);
    stack.push(node);

    if let Some(outgoing) = graph.get(node) {
        for edge in outgoing {
            let next = edge.to.as_str();
            if on_stack.contains(next) {
                let start = stack.iter().position(|&n| n == next).unwrap_or(0);
                let mut cycle: Vec<&str> = stack[start..].to_vec();
                cycle.push(next);
                return Some(cycle);
            }
            if !visited.contains(next) {
                if let Some(cycle) = dfs(next, graph, visited, on_stack, stack) {
                    return Some(cycle);
                }
            }
        }
    }

    stack.pop();
    on_stack.remove(node);
    None
}

fn build_error(
    workflow_name: &str,
    cycle: &[&str],
    graph: &HashMap<&str, Vec<&Edge>>,
) -> ValidationError {
    let cycle_path = cycle.join(" -> ");
    let involved_edges: Vec<String> = cycle
        .windows(2)
        .map(|pair| {
            let (from, to) = (pair[0], pair[1]);
            let guard = graph
                .get(from)
                .and_then(|edges| edges.iter().find(|e| e.to == to))
                .and_then(|e| e.guard.as_deref());
            match guard {
                Some(g) => format!("{from} \u{2192} {to} [guard: {g}]"),
                None => format!("{from} \u{2192} {to}"),
            }
        })
        .collect();

    ValidationError::new(
        ErrorType::CycleDetected,
        format!("Circular dependency detected in workflow '{workflow_name}': {cycle_path}"),
    )
    .with_workflow(workflow_name)
    .with_detail("cyclePath", cycle_path)
    .with_detail("involvedEdges", involved_edges.join(", "))
    .with_detail("cycleLength", cycle.len().to_string())
}
