//! Deterministic textual workflow report (spec §6): steps, guards,
//! transitions, a tree rendering with cycle markers, and reachability.

use crate::config::{Config, Workflow, FAILURE, SUCCESS};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub workflow_name: String,
    pub steps: Vec<String>,
    pub guards: Vec<String>,
    pub transitions: Vec<String>,
    pub tree: String,
    pub dead_ends: Vec<String>,
    pub unreachable_steps: Vec<String>,
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "workflow: {}", self.workflow_name)?;
        writeln!(f, "steps:")?;
        for step in &self.steps {
            writeln!(f, "  - {step}")?;
        }
        writeln!(f, "guards:")?;
        for guard in &self.guards {
            writeln!(f, "  - {guard}")?;
        }
        writeln!(f, "transitions:")?;
        for transition in &self.transitions {
            writeln!(f, "  - {transition}")?;
        }
        writeln!(f, "tree:")?;
        for line in self.tree.lines() {
            writeln!(f, "  {line}")?;
        }
        writeln!(f, "dead_ends:")?;
        for step in &self.dead_ends {
            writeln!(f, "  - {step}")?;
        }
        writeln!(f, "unreachable_steps:")?;
        for step in &self.unreachable_steps {
            writeln!(f, "  - {step}")?;
        }
        Ok(())
    }
}

pub fn build_report(workflow_name: &str, workflow: &Workflow, config: &Config) -> AnalysisReport {
    let mut steps: BTreeSet<String> = BTreeSet::new();
    steps.insert(workflow.root.clone());
    for edge in &workflow.edges {
        steps.insert(edge.from.clone());
        if !edge.is_terminal_target() {
            steps.insert(edge.to.clone());
        }
    }

    let mut guards: BTreeSet<String> = BTreeSet::new();
    for edge in &workflow.edges {
        if let Some(guard) = &edge.guard {
            guards.insert(guard.clone());
        }
    }
    for step_name in &steps {
        if let Some(def) = config.step(step_name) {
            guards.extend(def.guards.iter().cloned());
        }
    }

    let transitions: Vec<String> = workflow
        .edges
        .iter()
        .map(|edge| match &edge.guard {
            Some(guard) => format!("{} -> {} [guard: {}]", edge.from, edge.to, guard),
            None => format!("{} -> {}", edge.from, edge.to),
        })
        .collect();

    let (graph, index_of) = build_graph(workflow);
    let reachable = reachable_from(&graph, &index_of, &workflow.root);

    let unreachable_steps: Vec<String> = config
        .steps
        .keys()
        .filter(|name| !reachable.contains(*name))
        .cloned()
        .collect();

    let dead_ends: Vec<String> = steps
        .iter()
        .filter(|name| {
            name.as_str() != SUCCESS
                && name.as_str() != FAILURE
                && reachable.contains(*name)
                && workflow.outgoing(name).next().is_none()
        })
        .cloned()
        .collect();

    let tree = render_tree(workflow);

    AnalysisReport {
        workflow_name: workflow_name.to_string(),
        steps: steps.into_iter().collect(),
        guards: guards.into_iter().collect(),
        transitions,
        tree,
        dead_ends,
        unreachable_steps,
    }
}

fn build_graph(workflow: &Workflow) -> (DiGraph<String, ()>, HashMap<String, NodeIndex>) {
    let mut graph = DiGraph::new();
    let mut index_of: HashMap<String, NodeIndex> = HashMap::new();

    let node_index =
        |graph: &mut DiGraph<String, ()>, index_of: &mut HashMap<String, NodeIndex>, name: &str| {
            *index_of
                .entry(name.to_string())
                .or_insert_with(|| graph.add_node(name.to_string()))
        };

    node_index(&mut graph, &mut index_of, &workflow.root);
    for edge in &workflow.edges {
        let from = node_index(&mut graph, &mut index_of, &edge.from);
        let to = node_index(&mut graph, &mut index_of, &edge.to);
        graph.add_edge(from, to, ());
    }

    (graph, index_of)
}

fn reachable_from(
    graph: &DiGraph<String, ()>,
    index_of: &HashMap<String, NodeIndex>,
    root: &str,
) -> BTreeSet<String> {
    let mut reachable = BTreeSet::new();
    let Some(&start) = index_of.get(root) else {
        return reachable;
    };
    let mut dfs = Dfs::new(graph, start);
    while let Some(node) = dfs.next(graph) {
        reachable.insert(graph[node].clone());
    }
    reachable
}

/// Indented tree from `root`; a node already on the current path prints
/// with a `(cycle)` marker and is not expanded further. A node reached
/// again off-path (shared sub-tree) is printed once but not re-expanded,
/// keeping the report finite and deterministic.
fn render_tree(workflow: &Workflow) -> String {
    let mut out = String::new();
    let mut expanded: BTreeSet<String> = BTreeSet::new();
    let mut path: Vec<String> = Vec::new();
    render_node(
        workflow,
        &workflow.root,
        0,
        &mut path,
        &mut expanded,
        &mut out,
    );
    out
}

fn render_node(
    workflow: &Workflow,
    node: &str,
    depth: usize,
    path: &mut Vec<String>,
    expanded: &mut BTreeSet<String>,
    out: &mut String,
) {
    let indent = "  ".repeat(depth);
    if path.iter().any(|n| n == node) {
        out.push_str(&format!("{indent}{node} (cycle)\n"));
        return;
    }
    if node == SUCCESS || node == FAILURE {
        out.push_str(&format!("{indent}{node}\n"));
        return;
    }
    if !expanded.insert(node.to_string()) {
        out.push_str(&format!("{indent}{node} (see above)\n"));
        return;
    }

    out.push_str(&format!("{indent}{node}\n"));
    path.push(node.to_string());
    for edge in workflow.outgoing(node) {
        render_node(workflow, &edge.to, depth + 1, path, expanded, out);
    }
    path.pop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn reports_dead_end_and_unreachable_step() {
        let yaml = r#"
steps:
  a:
    type: A
  b:
    type: B
  orphan:
    type: Orphan
workflows:
  w:
    root: a
    edges:
      - from: a
        to: b
"#;
        let config = Config::from_str(yaml).unwrap();
        let workflow = config.workflow("w").unwrap();
        let report = build_report("w", workflow, &config);

        assert!(report.dead_ends.contains(&"b".to_string()));
        assert!(report.unreachable_steps.contains(&"orphan".to_string()));
    }

    #[test]
    fn tree_marks_cycle_without_infinite_recursion() {
        let yaml = r#"
workflows:
  w:
    root: a
    edges:
      - from: a
        to: b
      - from: b
        to: a
"#;
        let config = Config::from_str(yaml).unwrap();
        let workflow = config.workflow("w").unwrap();
        let report = build_report("w", workflow, &config);

        assert!(report.tree.contains("(cycle)"));
    }
}
