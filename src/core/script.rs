/// Script loading: builds the node table from a parsed document.

use rustc_hash::FxHashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::document::{Document, ParseError};
use crate::schema::node::{Choice, DialogueNode, NodeType};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("malformed script: {0}")]
    Parse(#[from] ParseError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A link from a node to an id that names no node in the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Node holding the link.
    pub from: String,
    /// `None` for the node's `next` field, `Some(i)` for choice `i`.
    pub choice: Option<usize>,
    /// The id that could not be resolved.
    pub target: String,
}

impl std::fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.choice {
            Some(i) => write!(
                f,
                "node '{}' choice {} points at missing node '{}'",
                self.from, i, self.target
            ),
            None => write!(
                f,
                "node '{}' next points at missing node '{}'",
                self.from, self.target
            ),
        }
    }
}

/// A loaded dialogue graph: every node keyed by id, plus the entry node.
///
/// Links between nodes are not checked at load time; an unresolved `next`
/// or choice target only fails when navigation tries to follow it.
#[derive(Debug, Clone, Default)]
pub struct Script {
    nodes: FxHashMap<String, DialogueNode>,
    /// Ids in the order they first appeared in the `nodes` array.
    order: Vec<String>,
    entry: Option<String>,
}

impl Script {
    /// Load a script from a JSON-shaped file.
    pub fn load_from_file(path: &Path) -> Result<Script, ScriptError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a script document of the shape `{"nodes": [ {...}, ... ]}`.
    ///
    /// A document with no `nodes` array is a valid, empty script. A later
    /// node with the same id replaces the earlier one.
    pub fn parse(input: &str) -> Result<Script, ScriptError> {
        let doc = Document::parse(input)?;
        let mut script = Script::default();

        let count = doc.get_array_size("nodes");
        for i in 0..count {
            let node = read_node(&doc, &format!("nodes[{i}]"));
            if i == 0 && !node.id.is_empty() {
                script.entry = Some(node.id.clone());
            }
            script.insert(node);
        }

        log::debug!(
            "loaded script: {} nodes, entry {:?}",
            script.len(),
            script.entry
        );
        Ok(script)
    }

    /// Add a node, replacing any node with the same id.
    pub fn insert(&mut self, node: DialogueNode) {
        if !self.nodes.contains_key(&node.id) {
            self.order.push(node.id.clone());
        }
        self.nodes.insert(node.id.clone(), node);
    }

    pub fn node(&self, id: &str) -> Option<&DialogueNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Id of the first node in the script's `nodes` array.
    pub fn entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in first-appearance order.
    pub fn nodes(&self) -> impl Iterator<Item = &DialogueNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Every `next` or choice target that names no node in this script.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut found = Vec::new();
        for node in self.nodes() {
            if node.has_next() && !self.contains(&node.next) {
                found.push(DanglingReference {
                    from: node.id.clone(),
                    choice: None,
                    target: node.next.clone(),
                });
            }
            for (i, choice) in node.choices.iter().enumerate() {
                if !self.contains(&choice.next) {
                    found.push(DanglingReference {
                        from: node.id.clone(),
                        choice: Some(i),
                        target: choice.next.clone(),
                    });
                }
            }
        }
        found
    }
}

fn read_node(doc: &Document, key: &str) -> DialogueNode {
    let field = |name: &str| doc.get_string(&format!("{key}.{name}")).to_string();

    let choices_key = format!("{key}.choices");
    let choices = (0..doc.get_array_size(&choices_key))
        .map(|j| {
            let choice_key = format!("{choices_key}[{j}]");
            Choice {
                text: doc.get_string(&format!("{choice_key}.text")).to_string(),
                next: doc.get_string(&format!("{choice_key}.next")).to_string(),
            }
        })
        .collect();

    DialogueNode {
        id: field("id"),
        kind: NodeType::from_type_field(&field("type")),
        speaker: field("speaker"),
        text: field("text"),
        next: field("next"),
        choices,
        background: field("background"),
        character: field("character"),
        expression: field("expression"),
        bgm: field("bgm"),
        sound_effect: field("se"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{"nodes":[
        {"id":"n1","type":"dialogue","text":"Hello","next":"n2"},
        {"id":"n2","type":"end"}
    ]}"#;

    #[test]
    fn parse_minimal_script() {
        let script = Script::parse(MINIMAL).unwrap();
        assert_eq!(script.len(), 2);
        assert_eq!(script.entry(), Some("n1"));

        let n1 = script.node("n1").unwrap();
        assert_eq!(n1.kind, NodeType::Dialogue);
        assert_eq!(n1.text, "Hello");
        assert_eq!(n1.next, "n2");
        assert_eq!(script.node("n2").unwrap().kind, NodeType::End);
        assert!(script.node("n3").is_none());
    }

    #[test]
    fn parse_all_fields() {
        let script = Script::parse(
            r#"{"nodes":[{
                "id":"s1","type":"scene","speaker":"Mia","text":"...",
                "next":"s2","background":"hall.png","character":"mia",
                "expression":"smile","bgm":"theme.ogg","se":"door.wav",
                "choices":[{"text":"Wave","next":"s3"}]
            }]}"#,
        )
        .unwrap();
        let node = script.node("s1").unwrap();
        assert_eq!(node.kind, NodeType::Scene);
        assert_eq!(node.speaker, "Mia");
        assert_eq!(node.background, "hall.png");
        assert_eq!(node.character, "mia");
        assert_eq!(node.expression, "smile");
        assert_eq!(node.bgm, "theme.ogg");
        assert_eq!(node.sound_effect, "door.wav");
        // Any kind may carry choices
        assert_eq!(node.choices, vec![Choice::new("Wave", "s3")]);
    }

    #[test]
    fn unknown_type_is_dialogue() {
        let script = Script::parse(r#"{"nodes":[{"id":"x","type":"montage"}]}"#).unwrap();
        assert_eq!(script.node("x").unwrap().kind, NodeType::Dialogue);
    }

    #[test]
    fn duplicate_ids_last_write_wins() {
        let script = Script::parse(
            r#"{"nodes":[{"id":"a","text":"first"},{"id":"b"},{"id":"a","text":"second"}]}"#,
        )
        .unwrap();
        assert_eq!(script.len(), 2);
        assert_eq!(script.node("a").unwrap().text, "second");
        let ids: Vec<&str> = script.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn empty_script_has_no_entry() {
        let script = Script::parse(r#"{"nodes":[]}"#).unwrap();
        assert!(script.is_empty());
        assert_eq!(script.entry(), None);

        let script = Script::parse(r#"{"title":"nothing here"}"#).unwrap();
        assert!(script.is_empty());
    }

    #[test]
    fn malformed_script_fails() {
        assert!(matches!(
            Script::parse(r#"{"nodes":[{"id":"a"}"#),
            Err(ScriptError::Parse(_))
        ));
        assert!(matches!(
            Script::parse("nodes"),
            Err(ScriptError::Parse(ParseError::ExpectedObject { .. }))
        ));
    }

    #[test]
    fn dangling_references_reported() {
        let script = Script::parse(
            r#"{"nodes":[
                {"id":"a","next":"b"},
                {"id":"b","next":"zzz","choices":[{"text":"ok","next":"a"},{"text":"bad","next":"nowhere"}]}
            ]}"#,
        )
        .unwrap();
        let dangling = script.dangling_references();
        assert_eq!(
            dangling,
            vec![
                DanglingReference {
                    from: "b".to_string(),
                    choice: None,
                    target: "zzz".to_string(),
                },
                DanglingReference {
                    from: "b".to_string(),
                    choice: Some(1),
                    target: "nowhere".to_string(),
                },
            ]
        );
        assert_eq!(
            dangling[1].to_string(),
            "node 'b' choice 1 points at missing node 'nowhere'"
        );
    }

    #[test]
    fn connected_script_has_no_dangling_references() {
        let script = Script::parse(MINIMAL).unwrap();
        assert!(script.dangling_references().is_empty());
    }

    #[test]
    fn load_fixture_from_file() {
        let script = Script::load_from_file(Path::new("tests/fixtures/prologue.json")).unwrap();
        assert_eq!(script.entry(), Some("intro"));
        assert!(script.dangling_references().is_empty());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        assert!(matches!(
            Script::load_from_file(Path::new("tests/fixtures/does_not_exist.json")),
            Err(ScriptError::Io(_))
        ));
    }
}
