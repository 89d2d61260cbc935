/// The engine: one loaded script plus the navigation state walking it.
///
/// Lifecycle is `Uninitialized → Ready → Uninitialized` via `init` and
/// `shutdown`. While not ready, every fallible operation returns
/// `NavigationError::NotReady` and every reader returns its neutral value.

use std::path::Path;
use thiserror::Error;

use crate::core::audio::{self, AudioCue, AudioSink};
use crate::core::config::{ConfigError, EngineConfig};
use crate::core::save::{self, StateError};
use crate::core::script::{DanglingReference, Script, ScriptError};
use crate::core::state::GameState;
use crate::schema::node::DialogueNode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("engine is not initialized")]
    NotReady,
    #[error("no node with id '{0}'")]
    UnknownNode(String),
    #[error("there is no current node")]
    NoCurrentNode,
    #[error("choice {index} out of range (node has {count} choices)")]
    ChoiceOutOfRange { index: usize, count: usize },
    #[error("current node has no next node")]
    NoNext,
    #[error("history is empty")]
    HistoryEmpty,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("navigation error: {0}")]
    Navigation(#[from] NavigationError),
    #[error("script error: {0}")]
    Script(#[from] ScriptError),
    #[error("save state error: {0}")]
    State(#[from] StateError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// The top-level engine. Build a ready engine with `AvgEngine::builder()`,
/// or create one with `AvgEngine::new()` and call `init`.
#[derive(Debug, Clone)]
pub struct AvgEngine {
    script: Script,
    state: GameState,
    config: EngineConfig,
    ready: bool,
}

/// Builder for constructing a ready `AvgEngine`.
#[derive(Debug, Default)]
pub struct AvgEngineBuilder {
    config: Option<EngineConfig>,
    config_path: Option<String>,
    script: Option<Script>,
    script_path: Option<String>,
}

impl Default for AvgEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AvgEngine {
    /// An uninitialized engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// An uninitialized engine with the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            script: Script::default(),
            state: GameState::with_history_limit(config.history_limit),
            config,
            ready: false,
        }
    }

    pub fn builder() -> AvgEngineBuilder {
        AvgEngineBuilder::default()
    }

    /// Enter the ready state. Calling it again is harmless.
    pub fn init(&mut self) {
        self.ready = true;
    }

    /// Drop the loaded script and all navigation state, and leave the ready state.
    pub fn shutdown(&mut self) {
        if !self.ready {
            return;
        }
        self.script = Script::default();
        self.state = GameState::with_history_limit(self.config.history_limit);
        self.ready = false;
        log::debug!("engine shut down");
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    fn ensure_ready(&self) -> Result<(), NavigationError> {
        if self.ready {
            Ok(())
        } else {
            Err(NavigationError::NotReady)
        }
    }

    /// Parse and install a script. On failure the previous script and
    /// state are left as they were.
    pub fn load_script(&mut self, input: &str) -> Result<(), EngineError> {
        self.ensure_ready()?;
        let script = Script::parse(input).inspect_err(|e| {
            log::warn!("rejected script: {e}");
        })?;
        self.install_script(script);
        Ok(())
    }

    pub fn load_script_file(&mut self, path: &Path) -> Result<(), EngineError> {
        self.ensure_ready()?;
        let script = Script::load_from_file(path)?;
        self.install_script(script);
        Ok(())
    }

    /// Replace the loaded script. If no node is current yet, the script's
    /// entry node becomes current.
    fn install_script(&mut self, script: Script) {
        if !self.state.has_current() {
            if let Some(entry) = script.entry() {
                self.state.set_current(entry);
            }
        }
        if self.config.validate_on_load {
            for dangling in script.dangling_references() {
                log::warn!("{dangling}");
            }
        }
        self.script = script;
    }

    /// Move to `id`, pushing the node being left onto the history.
    pub fn goto_node(&mut self, id: &str) -> Result<(), NavigationError> {
        self.ensure_ready()?;
        if !self.script.contains(id) {
            log::warn!("goto: unknown node '{id}'");
            return Err(NavigationError::UnknownNode(id.to_string()));
        }
        log::debug!("goto: '{}' -> '{id}'", self.state.current_node_id());
        self.state.advance_to(id);
        Ok(())
    }

    /// Follow choice `index` of the current node.
    pub fn select_choice(&mut self, index: usize) -> Result<(), NavigationError> {
        self.ensure_ready()?;
        let node = self.current_node().ok_or(NavigationError::NoCurrentNode)?;
        let target = node
            .choice(index)
            .map(|choice| choice.next.clone())
            .ok_or(NavigationError::ChoiceOutOfRange {
                index,
                count: node.choices.len(),
            })?;
        self.goto_node(&target)
    }

    /// Follow the current node's `next` link.
    pub fn advance(&mut self) -> Result<(), NavigationError> {
        self.ensure_ready()?;
        let node = self.current_node().ok_or(NavigationError::NoCurrentNode)?;
        if !node.has_next() {
            return Err(NavigationError::NoNext);
        }
        let target = node.next.clone();
        self.goto_node(&target)
    }

    /// Return to the most recently left node. This does not itself record
    /// history, so it cannot be undone by another `go_back`.
    pub fn go_back(&mut self) -> Result<(), NavigationError> {
        self.ensure_ready()?;
        let previous = self
            .state
            .pop_history()
            .ok_or(NavigationError::HistoryEmpty)?;
        log::debug!("back: '{}' -> '{previous}'", self.state.current_node_id());
        self.state.set_current(previous);
        Ok(())
    }

    pub fn can_go_back(&self) -> bool {
        self.ready && self.state.can_go_back()
    }

    /// The current node, if one is set and exists in the loaded script.
    pub fn current_node(&self) -> Option<&DialogueNode> {
        if !self.ready {
            return None;
        }
        self.script.node(self.state.current_node_id())
    }

    /// The current node id; empty when none is set or the engine is not ready.
    pub fn current_node_id(&self) -> &str {
        if self.ready {
            self.state.current_node_id()
        } else {
            ""
        }
    }

    pub fn set_variable(&mut self, name: &str, value: i32) -> Result<(), NavigationError> {
        self.ensure_ready()?;
        self.state.set_variable(name, value);
        Ok(())
    }

    pub fn get_variable(&self, name: &str) -> i32 {
        if self.ready {
            self.state.get_variable(name)
        } else {
            0
        }
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.ready && self.state.has_variable(name)
    }

    pub fn save_state(&self) -> Result<String, NavigationError> {
        self.ensure_ready()?;
        Ok(save::serialize(&self.state))
    }

    /// Restore navigation state from `save_state` output. The loaded script
    /// is not consulted, so restored ids need not exist in it.
    pub fn load_state(&mut self, input: &str) -> Result<(), EngineError> {
        self.ensure_ready()?;
        save::deserialize(input, &mut self.state).inspect_err(|e| {
            log::warn!("rejected save state: {e}");
        })?;
        Ok(())
    }

    /// Clear the current node, history, and variables. The script stays loaded.
    pub fn reset(&mut self) -> Result<(), NavigationError> {
        self.ensure_ready()?;
        self.state.reset();
        Ok(())
    }

    /// Audio cues for the current node. Navigation never plays these on its
    /// own; the host asks for them after a transition.
    pub fn audio_cues(&self) -> Vec<AudioCue> {
        self.current_node().map(audio::cues_for).unwrap_or_default()
    }

    /// Send the current node's audio cues to `sink`.
    pub fn trigger_audio(&self, sink: &mut dyn AudioSink) {
        audio::dispatch(&self.audio_cues(), sink);
    }

    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        self.script.dangling_references()
    }
}

impl AvgEngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the configuration from a RON file (overrides `config`).
    pub fn config_path(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    /// Provide a parsed script directly.
    pub fn script(mut self, script: Script) -> Self {
        self.script = Some(script);
        self
    }

    /// Load the script from a file (overrides `script`).
    pub fn script_path(mut self, path: &str) -> Self {
        self.script_path = Some(path.to_string());
        self
    }

    pub fn build(self) -> Result<AvgEngine, EngineError> {
        let config = match self.config_path {
            Some(ref path) => EngineConfig::load_from_ron(Path::new(path))?,
            None => self.config.unwrap_or_default(),
        };

        let script = match self.script_path {
            Some(ref path) => Some(Script::load_from_file(Path::new(path))?),
            None => self.script,
        };

        let mut engine = AvgEngine::with_config(config);
        engine.init();
        if let Some(script) = script {
            engine.install_script(script);
        }
        Ok(engine)
    }
}
