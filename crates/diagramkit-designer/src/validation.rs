//! Connection validation applied before an edge is committed.

use std::fmt;
use std::sync::Arc;

use diagramkit_core::{DiagramError, DiagramResult};
use indexmap::IndexMap;

use crate::document::Document;
use crate::model::{Edge, Node};

/// Custom rule: `(source, target, source_port, target_port)`, returning a
/// reason on rejection.
pub type ConnectionRule =
    Arc<dyn Fn(&Node, &Node, Option<&str>, Option<&str>) -> Result<(), String> + Send + Sync>;

/// Rules a new connection must pass. All rules run, so a rejection lists
/// every reason at once.
#[derive(Clone)]
pub struct ConnectionValidator {
    pub reject_self_loops: bool,
    pub reject_duplicates: bool,
    rules: IndexMap<String, ConnectionRule>,
}

impl Default for ConnectionValidator {
    fn default() -> Self {
        Self {
            reject_self_loops: true,
            reject_duplicates: true,
            rules: IndexMap::new(),
        }
    }
}

impl fmt::Debug for ConnectionValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionValidator")
            .field("reject_self_loops", &self.reject_self_loops)
            .field("reject_duplicates", &self.reject_duplicates)
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ConnectionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts everything.
    pub fn permissive() -> Self {
        Self {
            reject_self_loops: false,
            reject_duplicates: false,
            rules: IndexMap::new(),
        }
    }

    /// Adds or replaces the rule called `name`.
    pub fn add_rule<F>(&mut self, name: impl Into<String>, rule: F)
    where
        F: Fn(&Node, &Node, Option<&str>, Option<&str>) -> Result<(), String>
            + Send
            + Sync
            + 'static,
    {
        self.rules.insert(name.into(), Arc::new(rule));
    }

    pub fn remove_rule(&mut self, name: &str) -> bool {
        self.rules.shift_remove(name).is_some()
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Checks `candidate` against `doc`. Endpoints must exist; the
    /// candidate's own id is ignored by the duplicate check.
    pub fn validate(&self, doc: &Document, candidate: &Edge) -> DiagramResult<()> {
        let source = doc.require_node(&candidate.source_id)?;
        let target = doc.require_node(&candidate.target_id)?;
        let mut reasons = Vec::new();

        if self.reject_self_loops && candidate.is_self_loop() {
            reasons.push("Cannot connect node to itself".to_string());
        }

        if self.reject_duplicates
            && doc
                .outgoing_edges(&candidate.source_id)
                .iter()
                .any(|e| e.id != candidate.id && e.connects_same_as(candidate))
        {
            reasons.push("Connection already exists".to_string());
        }

        for (name, rule) in &self.rules {
            if let Err(reason) = rule(
                source,
                target,
                candidate.source_port_id.as_deref(),
                candidate.target_port_id.as_deref(),
            ) {
                tracing::debug!("Connection rule '{}' failed: {}", name, reason);
                reasons.push(reason);
            }
        }

        if reasons.is_empty() {
            Ok(())
        } else {
            tracing::warn!(
                "Rejected connection {} -> {}: {}",
                candidate.source_id,
                candidate.target_id,
                reasons.join("; ")
            );
            Err(DiagramError::ConnectionRejected { reasons })
        }
    }
}

#[cfg(test)]
mod tests {
    use diagramkit_core::EventBus;

    use super::*;
    use crate::model::{EdgeOverrides, NodeOverrides};
    use crate::shape_registry::ShapeRegistry;

    fn setup() -> (Document, Node, Node) {
        let mut doc = Document::new(Arc::new(ShapeRegistry::builtin()), Arc::new(EventBus::new()));
        let a = doc.create_node("rect", 0.0, 0.0, NodeOverrides::new()).unwrap();
        let b = doc
            .create_node("decision", 200.0, 0.0, NodeOverrides::new())
            .unwrap();
        (doc, a, b)
    }

    fn reasons(err: DiagramError) -> Vec<String> {
        match err {
            DiagramError::ConnectionRejected { reasons } => reasons,
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_self_loop_rejected_by_default() {
        let (doc, a, _) = setup();
        let edge = doc.prepare_edge(&a.id, &a.id, EdgeOverrides::new()).unwrap();

        let err = ConnectionValidator::new().validate(&doc, &edge).unwrap_err();
        assert_eq!(reasons(err), vec!["Cannot connect node to itself"]);
        assert!(ConnectionValidator::permissive().validate(&doc, &edge).is_ok());
    }

    #[test]
    fn test_duplicate_rejected() {
        let (mut doc, a, b) = setup();
        let overrides = EdgeOverrides::new().with_ports(Some("right"), Some("left"));
        doc.create_edge(&a.id, &b.id, overrides.clone()).unwrap();

        let same = doc.prepare_edge(&a.id, &b.id, overrides).unwrap();
        assert!(ConnectionValidator::new().validate(&doc, &same).is_err());

        let other_port = doc
            .prepare_edge(&a.id, &b.id, EdgeOverrides::new().with_ports(Some("bottom"), Some("left")))
            .unwrap();
        assert!(ConnectionValidator::new().validate(&doc, &other_port).is_ok());
    }

    #[test]
    fn test_custom_rules_collect_all_reasons() {
        let (doc, a, _) = setup();
        let mut validator = ConnectionValidator::new();
        validator.add_rule("no-decision-source", |source, _, _, _| {
            if source.shape_type == "decision" {
                Err("Decisions cannot start connections".to_string())
            } else {
                Ok(())
            }
        });
        validator.add_rule("ports-required", |_, _, sp, tp| match (sp, tp) {
            (Some(_), Some(_)) => Ok(()),
            _ => Err("Both ports are required".to_string()),
        });
        assert_eq!(
            validator.rule_names().collect::<Vec<_>>(),
            vec!["no-decision-source", "ports-required"]
        );

        let edge = doc.prepare_edge(&a.id, &a.id, EdgeOverrides::new()).unwrap();
        let err = validator.validate(&doc, &edge).unwrap_err();
        assert_eq!(
            reasons(err),
            vec!["Cannot connect node to itself", "Both ports are required"]
        );

        assert!(validator.remove_rule("ports-required"));
        assert!(!validator.remove_rule("ports-required"));
    }

    #[test]
    fn test_missing_endpoint_is_not_found() {
        let (doc, a, _) = setup();
        let mut edge = doc.prepare_edge(&a.id, &a.id, EdgeOverrides::new()).unwrap();
        edge.target_id = "ghost".into();
        assert!(ConnectionValidator::new()
            .validate(&doc, &edge)
            .unwrap_err()
            .is_not_found());
    }
}
