//! Set-based registry of facts, inferencers and heuristics for agent backends.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

pub trait Inferencer: Send + Sync {
    /// Registry key. Two inferencers with the same name are the same inferencer.
    fn name(&self) -> &str;
    fn infer(&self, input: &str) -> Option<String>;
}

pub trait Backend {
    fn process(&self, conversation_id: &str, user_input: &str) -> Option<String>;
    fn load_all(&mut self) -> anyhow::Result<()>;

    fn add_fact(&mut self, fact: &str);
    fn add_inferencer(&mut self, inferencer: Arc<dyn Inferencer>);
    fn add_heuristic(&mut self, heuristic: &str);

    fn list_facts(&self) -> Vec<&str>;
    fn list_inferencers(&self) -> Vec<Arc<dyn Inferencer>>;
    fn list_heuristics(&self) -> Vec<&str>;

    fn select_facts(&self, criteria: &str) -> Vec<&str>;
    fn select_inferencers(&self, criteria: &str) -> Vec<Arc<dyn Inferencer>>;
    fn select_heuristics(&self, criteria: &str) -> Vec<&str>;
}

/// Loads nothing on its own and selects everything; content arrives through the `add_*` methods.
#[derive(Default, Clone)]
pub struct BaseBackend {
    facts: BTreeSet<String>,
    inferencers: BTreeMap<String, Arc<dyn Inferencer>>,
    heuristics: BTreeSet<String>,
}

impl BaseBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for BaseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseBackend")
            .field("facts", &self.facts)
            .field("inferencers", &self.inferencers.keys().collect::<Vec<_>>())
            .field("heuristics", &self.heuristics)
            .finish()
    }
}

impl Backend for BaseBackend {
    fn process(&self, _conversation_id: &str, _user_input: &str) -> Option<String> {
        None
    }

    fn load_all(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn add_fact(&mut self, fact: &str) {
        self.facts.insert(fact.to_string());
    }

    fn add_inferencer(&mut self, inferencer: Arc<dyn Inferencer>) {
        self.inferencers
            .insert(inferencer.name().to_string(), inferencer);
    }

    fn add_heuristic(&mut self, heuristic: &str) {
        self.heuristics.insert(heuristic.to_string());
    }

    fn list_facts(&self) -> Vec<&str> {
        self.facts.iter().map(String::as_str).collect()
    }

    fn list_inferencers(&self) -> Vec<Arc<dyn Inferencer>> {
        self.inferencers.values().cloned().collect()
    }

    fn list_heuristics(&self) -> Vec<&str> {
        self.heuristics.iter().map(String::as_str).collect()
    }

    fn select_facts(&self, _criteria: &str) -> Vec<&str> {
        self.list_facts()
    }

    fn select_inferencers(&self, _criteria: &str) -> Vec<Arc<dyn Inferencer>> {
        self.list_inferencers()
    }

    fn select_heuristics(&self, _criteria: &str) -> Vec<&str> {
        self.list_heuristics()
    }
}
