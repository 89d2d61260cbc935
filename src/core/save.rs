/// Save-state codec. Writes a `GameState` as a small JSON-shaped document
/// and restores it through the same document parser scripts use.
///
/// Shape: `{"currentNode":"<id>","variables":{"<name>":<int>,...},"history":["<id>",...]}`

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::core::document::{Document, ParseError};
use crate::core::path::parse_int_prefix;
use crate::core::state::GameState;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("malformed save data: {0}")]
    Parse(#[from] ParseError),
}

/// Serialize the navigation state.
///
/// Variables are written in key order so equal states produce equal text.
pub fn serialize(state: &GameState) -> String {
    let mut out = String::from("{\"currentNode\":");
    write_string(&mut out, state.current_node_id());

    out.push_str(",\"variables\":{");
    let mut names: Vec<&String> = state.variables().keys().collect();
    names.sort();
    for (i, name) in names.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(&mut out, name);
        out.push(':');
        out.push_str(&state.get_variable(name).to_string());
    }

    out.push_str("},\"history\":[");
    for (i, id) in state.history().iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(&mut out, id);
    }
    out.push_str("]}");
    out
}

/// Restore `state` from serialized text.
///
/// The current node is only overwritten when the save names one; variables
/// and history are always replaced, and empty history entries are dropped.
/// On error `state` is left untouched.
pub fn deserialize(input: &str, state: &mut GameState) -> Result<(), StateError> {
    let doc = Document::parse(input)?;

    let current = match doc.get_string("currentNode") {
        "" => None,
        id => Some(id.to_string()),
    };

    // Names are read from the entries themselves; they may contain `.` or `[`
    let variables: FxHashMap<String, i32> = match doc.get("variables") {
        Some(Document::Object(entries)) => entries
            .iter()
            .filter(|(_, value)| value.has_leaves())
            .map(|(name, value)| {
                let text = value.scalar_text().unwrap_or_default();
                (name.clone(), parse_int_prefix(text))
            })
            .collect(),
        _ => FxHashMap::default(),
    };

    let history: Vec<String> = (0..doc.get_array_size("history"))
        .map(|i| doc.get_string(&format!("history[{i}]")))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();

    log::debug!(
        "restoring state: current {:?}, {} variables, {} history entries",
        current,
        variables.len(),
        history.len()
    );
    state.replace(current, variables, history);
    Ok(())
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            other => out.push(other),
        }
    }
    out.push('"');
}
