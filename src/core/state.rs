/// Navigation state: current node pointer, back-history, and variables.

use rustc_hash::FxHashMap;

/// Where the player is in a script and what they have done to get there.
///
/// `current` may be empty (no current node) or name a node that is not in
/// the loaded script; the state itself never consults the script.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameState {
    current: String,
    history: Vec<String>,
    variables: FxHashMap<String, i32>,
    history_limit: Option<usize>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A state whose history keeps at most `limit` entries, dropping the
    /// oldest first.
    pub fn with_history_limit(limit: Option<usize>) -> Self {
        Self {
            history_limit: limit,
            ..Self::default()
        }
    }

    pub fn current_node_id(&self) -> &str {
        &self.current
    }

    pub fn has_current(&self) -> bool {
        !self.current.is_empty()
    }

    pub fn set_current(&mut self, id: impl Into<String>) {
        self.current = id.into();
    }

    /// Move to `id`, recording the node being left (if any) on the history.
    pub fn advance_to(&mut self, id: impl Into<String>) {
        if self.has_current() {
            let previous = std::mem::take(&mut self.current);
            self.push_history(previous);
        }
        self.current = id.into();
    }

    pub fn push_history(&mut self, id: impl Into<String>) {
        self.history.push(id.into());
        if let Some(limit) = self.history_limit {
            if self.history.len() > limit {
                let excess = self.history.len() - limit;
                self.history.drain(..excess);
            }
        }
    }

    pub fn pop_history(&mut self) -> Option<String> {
        self.history.pop()
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// History entries, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: i32) {
        self.variables.insert(name.into(), value);
    }

    /// The value of `name`, or 0 if it was never set.
    pub fn get_variable(&self, name: &str) -> i32 {
        self.variables.get(name).copied().unwrap_or(0)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn variables(&self) -> &FxHashMap<String, i32> {
        &self.variables
    }

    /// Replace history and variables wholesale; used when restoring a save.
    pub(crate) fn replace(
        &mut self,
        current: Option<String>,
        variables: FxHashMap<String, i32>,
        history: Vec<String>,
    ) {
        if let Some(current) = current {
            self.current = current;
        }
        self.variables = variables;
        self.history.clear();
        for id in history {
            self.push_history(id);
        }
    }

    /// Clear the current node, history, and variables. The history limit is kept.
    pub fn reset(&mut self) {
        self.current.clear();
        self.history.clear();
        self.variables.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let state = GameState::new();
        assert_eq!(state.current_node_id(), "");
        assert!(!state.has_current());
        assert!(!state.can_go_back());
        assert!(state.variables().is_empty());
    }

    #[test]
    fn first_advance_pushes_nothing() {
        let mut state = GameState::new();
        state.advance_to("a");
        assert_eq!(state.current_node_id(), "a");
        assert!(state.history().is_empty());

        state.advance_to("b");
        assert_eq!(state.current_node_id(), "b");
        assert_eq!(state.history(), ["a".to_string()]);
    }

    #[test]
    fn pop_history_is_lifo() {
        let mut state = GameState::new();
        state.push_history("a");
        state.push_history("b");
        assert_eq!(state.pop_history().as_deref(), Some("b"));
        assert_eq!(state.pop_history().as_deref(), Some("a"));
        assert_eq!(state.pop_history(), None);
    }

    #[test]
    fn history_limit_drops_oldest() {
        let mut state = GameState::with_history_limit(Some(2));
        for id in ["a", "b", "c", "d"] {
            state.advance_to(id);
        }
        assert_eq!(state.history(), ["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn zero_history_limit_disables_back() {
        let mut state = GameState::with_history_limit(Some(0));
        state.advance_to("a");
        state.advance_to("b");
        assert!(!state.can_go_back());
    }

    #[test]
    fn variables_default_to_zero() {
        let mut state = GameState::new();
        assert_eq!(state.get_variable("gold"), 0);
        assert!(!state.has_variable("gold"));
        state.set_variable("gold", 10);
        state.set_variable("gold", -3);
        assert_eq!(state.get_variable("gold"), -3);
        assert!(state.has_variable("gold"));
    }

    #[test]
    fn reset_clears_everything_but_limit() {
        let mut state = GameState::with_history_limit(Some(1));
        state.advance_to("a");
        state.advance_to("b");
        state.set_variable("x", 1);
        state.reset();
        assert_eq!(state, GameState::with_history_limit(Some(1)));
    }

    #[test]
    fn replace_keeps_current_when_none() {
        let mut state = GameState::new();
        state.set_current("here");
        state.set_variable("old", 1);
        state.replace(None, FxHashMap::default(), vec!["x".to_string()]);
        assert_eq!(state.current_node_id(), "here");
        assert!(!state.has_variable("old"));
        assert_eq!(state.history(), ["x".to_string()]);
    }
}
