//! WASM bindings for avg-engine. Each `AvgEngine` object on the JS side owns
//! its own engine; the host creates, drives, and drops it.

use wasm_bindgen::prelude::*;

use avg_engine::core::script::{DanglingReference, Script};
use avg_engine::schema::node::{Choice, DialogueNode};
use avg_engine::AvgEngine as Engine;

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct LintFinding {
    from: String,
    choice: Option<usize>,
    target: String,
    message: String,
}

impl From<&DanglingReference> for LintFinding {
    fn from(d: &DanglingReference) -> Self {
        LintFinding {
            from: d.from.clone(),
            choice: d.choice,
            target: d.target.clone(),
            message: d.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// AvgEngine: the exported handle
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct AvgEngine {
    engine: Engine,
}

impl Default for AvgEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl AvgEngine {
    /// Create an uninitialized engine. Call `init` before anything else.
    #[wasm_bindgen(constructor)]
    pub fn new() -> AvgEngine {
        AvgEngine {
            engine: Engine::new(),
        }
    }

    /// Create a ready engine with `script` already loaded.
    pub fn with_script(script: &str) -> Result<AvgEngine, JsError> {
        let script = Script::parse(script)
            .map_err(|e| JsError::new(&format!("Script parse error: {e}")))?;
        let engine = Engine::builder()
            .script(script)
            .build()
            .map_err(|e| JsError::new(&format!("Engine build error: {e}")))?;
        Ok(AvgEngine { engine })
    }

    pub fn init(&mut self) -> bool {
        self.engine.init();
        true
    }

    pub fn shutdown(&mut self) {
        self.engine.shutdown();
    }

    /// No-op when the engine is not ready.
    pub fn reset(&mut self) {
        self.engine.reset().ok();
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_ready()
    }

    pub fn load_script(&mut self, script: &str) -> bool {
        self.engine.load_script(script).is_ok()
    }

    // --- Navigation ---

    pub fn goto_node(&mut self, id: &str) -> bool {
        self.engine.goto_node(id).is_ok()
    }

    /// Follow choice `index` of the current node. Negative indices fail.
    pub fn select_choice(&mut self, index: i32) -> bool {
        match usize::try_from(index) {
            Ok(index) => self.engine.select_choice(index).is_ok(),
            Err(_) => false,
        }
    }

    pub fn advance(&mut self) -> bool {
        self.engine.advance().is_ok()
    }

    pub fn go_back(&mut self) -> bool {
        self.engine.go_back().is_ok()
    }

    pub fn can_go_back(&self) -> bool {
        self.engine.can_go_back()
    }

    // --- Current node readers ---

    pub fn current_node_id(&self) -> String {
        self.engine.current_node_id().to_string()
    }

    /// "dialogue", "choice", "scene", "end", or "unknown" when there is no current node.
    pub fn node_type(&self) -> String {
        self.engine
            .current_node()
            .map_or("unknown", |node| node.kind.name())
            .to_string()
    }

    pub fn speaker(&self) -> String {
        self.field(|node| &node.speaker)
    }

    pub fn text(&self) -> String {
        self.field(|node| &node.text)
    }

    pub fn next_node_id(&self) -> String {
        self.field(|node| &node.next)
    }

    pub fn choice_count(&self) -> i32 {
        self.engine
            .current_node()
            .map_or(0, |node| i32::try_from(node.choices.len()).unwrap_or(i32::MAX))
    }

    pub fn choice_text(&self, index: i32) -> String {
        self.choice_field(index, |choice| &choice.text)
    }

    pub fn choice_next(&self, index: i32) -> String {
        self.choice_field(index, |choice| &choice.next)
    }

    pub fn background(&self) -> String {
        self.field(|node| &node.background)
    }

    pub fn character(&self) -> String {
        self.field(|node| &node.character)
    }

    pub fn expression(&self) -> String {
        self.field(|node| &node.expression)
    }

    pub fn bgm(&self) -> String {
        self.field(|node| &node.bgm)
    }

    pub fn sound_effect(&self) -> String {
        self.field(|node| &node.sound_effect)
    }

    /// The whole current node as JSON, or `null` when there is none.
    pub fn current_node_json(&self) -> String {
        serde_json::to_string(&self.engine.current_node()).unwrap_or_else(|_| "null".to_string())
    }

    // --- Variables and saves ---

    /// No-op when the engine is not ready.
    pub fn set_variable(&mut self, name: &str, value: i32) {
        self.engine.set_variable(name, value).ok();
    }

    pub fn get_variable(&self, name: &str) -> i32 {
        self.engine.get_variable(name)
    }

    /// Serialized navigation state, or an empty string when not ready.
    pub fn save_state(&self) -> String {
        self.engine.save_state().unwrap_or_default()
    }

    pub fn load_state(&mut self, state: &str) -> bool {
        self.engine.load_state(state).is_ok()
    }

    // --- Host helpers ---

    /// JSON array of audio cues for the current node, bgm first. The host
    /// plays them after a transition.
    pub fn audio_cues(&self) -> String {
        serde_json::to_string(&self.engine.audio_cues()).unwrap_or_else(|_| "[]".to_string())
    }

    /// JSON array of dangling `next`/choice references in the loaded script.
    pub fn lint(&self) -> String {
        let findings: Vec<LintFinding> = self
            .engine
            .dangling_references()
            .iter()
            .map(LintFinding::from)
            .collect();
        serde_json::to_string(&findings).unwrap_or_else(|_| "[]".to_string())
    }
}

// Private helpers
impl AvgEngine {
    fn field(&self, get: impl Fn(&DialogueNode) -> &String) -> String {
        self.engine
            .current_node()
            .map(|node| get(node).clone())
            .unwrap_or_default()
    }

    fn choice_field(&self, index: i32, get: impl Fn(&Choice) -> &String) -> String {
        let Ok(index) = usize::try_from(index) else {
            return String::new();
        };
        self.engine
            .current_node()
            .and_then(|node| node.choice(index))
            .map(|choice| get(choice).clone())
            .unwrap_or_default()
    }
}
