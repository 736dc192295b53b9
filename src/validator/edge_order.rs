//! Built-in edge-ordering rules (spec §4.5): per source step with more
//! than one outgoing edge, at most one may be unguarded, and it must be
//! the last of that step's outgoing edges.

use super::{ErrorType, ValidationError, ValidationResult, Validator};
use crate::config::Config;
use std::collections::HashMap;

pub struct EdgeOrderValidator;

impl Validator for EdgeOrderValidator {
    fn name(&self) -> &str {
        "edge-order"
    }

    fn priority(&self) -> u32 {
        20
    }

    fn fail_fast(&self) -> bool {
        true
    }

    fn description(&self) -> &str {
        "Checks that at most one unguarded outgoing edge exists per step, and that it is last"
    }

    fn validate(&self, config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();
        for (workflow_name, workflow) in &config.workflows {
            let mut by_source: HashMap<&str, Vec<usize>> = HashMap::new();
            for (idx, edge) in workflow.edges.iter().enumerate() {
                by_source.entry(edge.from.as_str()).or_default().push(idx);
            }

            let mut sources: Vec<&str> = by_source.keys().copied().collect();
            sources.sort_unstable();

            for source in sources {
                let indices = &by_source[source];
                if indices.len() < 2 {
                    continue;
                }
                let unguarded: Vec<usize> = indices
                    .iter()
                    .copied()
                    .filter(|&i| !workflow.edges[i].is_guarded())
                    .collect();

                if unguarded.len() > 1 {
                    let listing = unguarded
                        .iter()
                        .map(|&i| {
                            format!(
                                "{} -> {} (index {i})",
                                workflow.edges[i].from, workflow.edges[i].to
                            )
                        })
                        .collect::<Vec<_>>()
                        .join(", ");
                    result.errors.push(
                        ValidationError::new(
                            ErrorType::MultipleUnguardedEdges,
                            format!(
                                "step '{source}' has multiple unguarded outgoing edges: {listing}"
                            ),
                        )
                        .with_workflow(workflow_name)
                        .with_detail("step", source)
                        .with_detail("unguardedEdges", listing),
                    );
                    continue;
                }

                if let Some(&unguarded_idx) = unguarded.first() {
                    let max_index = *indices.iter().max().unwrap();
                    if unguarded_idx != max_index {
                        let followers = indices
                            .iter()
                            .copied()
                            .filter(|&i| i > unguarded_idx)
                            .map(|i| {
                                format!(
                                    "{} -> {} (index {i})",
                                    workflow.edges[i].from, workflow.edges[i].to
                                )
                            })
                            .collect::<Vec<_>>()
                            .join(", ");
                        let misplaced = format!(
                            "{} -> {} (index {unguarded_idx})",
                            workflow.edges[unguarded_idx].from, workflow.edges[unguarded_idx].to
                        );
                        result.errors.push(
                            ValidationError::new(
                                ErrorType::UnguardedEdgeNotLast,
                                format!(
                                    "step '{source}': unguarded edge {misplaced} is not last; guarded edges follow it: {followers}"
                                ),
                            )
                            .with_workflow(workflow_name)
                            .with_detail("step", source)
                            .with_detail("unguardedEdge", misplaced)
                            .with_detail("followingGuardedEdges", followers),
                        );
                    }
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn unguarded_not_last_is_flagged() {
        let yaml = r#"
workflows:
  w:
    root: process
    edges:
      - from: process
        to: notify
      - from: process
        to: audit
        guard: G
"#;
        let config = Config::from_str(yaml).unwrap();
        let result = EdgeOrderValidator.validate(&config);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].error_type, ErrorType::UnguardedEdgeNotLast);
        assert_eq!(result.errors[0].details.get("step").unwrap(), "process");
    }

    #[test]
    fn multiple_unguarded_edges_is_flagged() {
        let yaml = r#"
workflows:
  w:
    root: p
    edges:
      - from: p
        to: a
      - from: p
        to: b
"#;
        let config = Config::from_str(yaml).unwrap();
        let result = EdgeOrderValidator.validate(&config);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            result.errors[0].error_type,
            ErrorType::MultipleUnguardedEdges
        );
    }

    #[test]
    fn multiple_violating_sources_report_in_sorted_order() {
        let yaml = r#"
workflows:
  w:
    root: zeta
    edges:
      - from: zeta
        to: a
      - from: zeta
        to: b
      - from: alpha
        to: a
      - from: alpha
        to: b
"#;
        let config = Config::from_str(yaml).unwrap();
        let result = EdgeOrderValidator.validate(&config);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].details.get("step").unwrap(), "alpha");
        assert_eq!(result.errors[1].details.get("step").unwrap(), "zeta");
    }

    #[test]
    fn guarded_then_trailing_unguarded_is_valid() {
        let yaml = r#"
workflows:
  w:
    root: p
    edges:
      - from: p
        to: premium
        guard: VIP
      - from: p
        to: standard
"#;
        let config = Config::from_str(yaml).unwrap();
        let result = EdgeOrderValidator.validate(&config);
        assert!(result.is_valid());
    }
}
