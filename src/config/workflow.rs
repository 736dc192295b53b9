//! Workflow definition (spec §3): a named root plus an ordered edge list.

use super::edge::Edge;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Workflow {
    pub root: String,
    pub edges: Vec<Edge>,
}

impl Workflow {
    /// Outgoing edges from `step`, in declaration order (spec §3 invariant).
    pub fn outgoing<'a>(&'a self, step: &str) -> impl Iterator<Item = &'a Edge> + 'a {
        let step = step.to_string();
        self.edges.iter().filter(move |e| e.from == step)
    }
}
