use serde::{Deserialize, Serialize};

/// The role a node plays in a script.
///
/// The kind is advisory: any node may carry choices, scene fields, or a
/// `next` link regardless of its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    #[default]
    Dialogue,
    Choice,
    Scene,
    End,
}

impl NodeType {
    /// Map a script `type` field to a node kind. Anything unrecognised,
    /// including an absent field, is treated as dialogue.
    pub fn from_type_field(s: &str) -> Self {
        match s {
            "dialogue" => Self::Dialogue,
            "choice" => Self::Choice,
            "scene" => Self::Scene,
            "end" => Self::End,
            _ => Self::Dialogue,
        }
    }

    /// The script spelling of this kind: "dialogue", "choice", "scene", "end".
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dialogue => "dialogue",
            Self::Choice => "choice",
            Self::Scene => "scene",
            Self::End => "end",
        }
    }
}

/// A labelled branch from one node to another node's id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    pub next: String,
}

impl Choice {
    pub fn new(text: impl Into<String>, next: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            next: next.into(),
        }
    }
}

/// A single addressable unit of a script: a line, a choice point, a scene
/// directive, or a terminator.
///
/// Empty strings mean "not set" for every textual field. An empty `next`
/// means the node has no automatic successor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DialogueNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeType,
    pub speaker: String,
    pub text: String,
    pub next: String,
    pub choices: Vec<Choice>,
    pub background: String,
    pub character: String,
    pub expression: String,
    pub bgm: String,
    #[serde(rename = "soundEffect")]
    pub sound_effect: String,
}

impl DialogueNode {
    pub fn new(id: impl Into<String>, kind: NodeType) -> Self {
        Self {
            id: id.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn has_next(&self) -> bool {
        !self.next.is_empty()
    }

    pub fn choice(&self, index: usize) -> Option<&Choice> {
        self.choices.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_field_mapping() {
        assert_eq!(NodeType::from_type_field("dialogue"), NodeType::Dialogue);
        assert_eq!(NodeType::from_type_field("choice"), NodeType::Choice);
        assert_eq!(NodeType::from_type_field("scene"), NodeType::Scene);
        assert_eq!(NodeType::from_type_field("end"), NodeType::End);
    }

    #[test]
    fn unknown_type_defaults_to_dialogue() {
        assert_eq!(NodeType::from_type_field("cutscene"), NodeType::Dialogue);
        assert_eq!(NodeType::from_type_field(""), NodeType::Dialogue);
        // Matching is exact, not case-insensitive
        assert_eq!(NodeType::from_type_field("End"), NodeType::Dialogue);
    }

    #[test]
    fn name_matches_type_field() {
        for kind in [
            NodeType::Dialogue,
            NodeType::Choice,
            NodeType::Scene,
            NodeType::End,
        ] {
            assert_eq!(NodeType::from_type_field(kind.name()), kind);
        }
    }

    #[test]
    fn node_defaults() {
        let node = DialogueNode::new("n1", NodeType::Scene);
        assert_eq!(node.id, "n1");
        assert_eq!(node.kind, NodeType::Scene);
        assert!(!node.has_next());
        assert!(node.choices.is_empty());
        assert!(node.choice(0).is_none());
        assert!(node.bgm.is_empty());
    }

    #[test]
    fn ron_round_trip() {
        let mut node = DialogueNode::new("c1", NodeType::Choice);
        node.text = "Which way?".to_string();
        node.choices.push(Choice::new("Left", "nA"));
        let serialized = ron::to_string(&node).unwrap();
        let deserialized: DialogueNode = ron::from_str(&serialized).unwrap();
        assert_eq!(deserialized, node);
    }
}
