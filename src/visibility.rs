use std::collections::HashMap;

/// Per-team visibility. Teams without an entry are visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityStore {
    flags: HashMap<u32, bool>,
}

impl VisibilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, team_id: u32) -> bool {
        self.flags.get(&team_id).copied().unwrap_or(true)
    }

    /// Flips the flag and returns the new value.
    pub fn toggle(&mut self, team_id: u32) -> bool {
        let next = !self.is_visible(team_id);
        self.flags.insert(team_id, next);
        next
    }

    pub fn set(&mut self, team_id: u32, visible: bool) {
        self.flags.insert(team_id, visible);
    }

    pub fn ensure(&mut self, team_id: u32) -> bool {
        if self.flags.contains_key(&team_id) {
            return false;
        }
        self.flags.insert(team_id, true);
        true
    }

    pub fn hidden_count(&self) -> usize {
        self.flags.values().filter(|v| !**v).count()
    }

    pub fn entries(&self) -> &HashMap<u32, bool> {
        &self.flags
    }
}
