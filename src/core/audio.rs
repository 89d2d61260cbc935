/// Audio cues derived from a node's scene fields.

use serde::Serialize;

use crate::schema::node::DialogueNode;

/// Something the host's audio layer should play for the current node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AudioCue {
    PlayBgm { name: String, looped: bool },
    PlaySe { name: String },
}

/// Receiver for audio cues. Implemented by the host's audio layer.
pub trait AudioSink {
    fn play_bgm(&mut self, name: &str, looped: bool);
    fn play_se(&mut self, name: &str);
}

/// Cues for `node`: background music first (always looped), then the sound effect.
pub fn cues_for(node: &DialogueNode) -> Vec<AudioCue> {
    let mut cues = Vec::new();
    if !node.bgm.is_empty() {
        cues.push(AudioCue::PlayBgm {
            name: node.bgm.clone(),
            looped: true,
        });
    }
    if !node.sound_effect.is_empty() {
        cues.push(AudioCue::PlaySe {
            name: node.sound_effect.clone(),
        });
    }
    cues
}

/// Deliver `cues` to `sink` in order.
pub fn dispatch(cues: &[AudioCue], sink: &mut dyn AudioSink) {
    for cue in cues {
        match cue {
            AudioCue::PlayBgm { name, looped } => sink.play_bgm(name, *looped),
            AudioCue::PlaySe { name } => sink.play_se(name),
        }
    }
}
