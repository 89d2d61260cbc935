/// Prologue example: walks the station prologue script end to end.
///
/// Takes the first branch, saves halfway, goes back to try the other branch,
/// then restores the save.
///
/// Run with: cargo run --example prologue

use avg_engine::core::audio::AudioSink;
use avg_engine::core::script::Script;
use avg_engine::AvgEngine;

const PROLOGUE: &str = include_str!("../tests/fixtures/prologue.json");

struct PrintAudio;

impl AudioSink for PrintAudio {
    fn play_bgm(&mut self, name: &str, looped: bool) {
        println!("    ♪ bgm {name} (loop: {looped})");
    }

    fn play_se(&mut self, name: &str) {
        println!("    ♪ se {name}");
    }
}

fn main() {
    let script = Script::parse(PROLOGUE).expect("Failed to parse prologue script");
    let mut engine = AvgEngine::builder()
        .script(script)
        .build()
        .expect("Failed to build engine");

    println!("=== Prologue ===\n");

    // Walk until the first choice
    narrate(&engine);
    while engine.advance().is_ok() {
        narrate(&engine);
    }

    // Stay with Aoi, and remember it
    engine.set_variable("affection", 1).expect("engine is ready");
    engine.select_choice(0).expect("Failed to take first choice");
    narrate(&engine);
    let save = engine.save_state().expect("engine is ready");
    println!("\n[saved] {save}\n");

    // Rewind and take the other road
    engine.go_back().expect("Failed to go back");
    engine.select_choice(1).expect("Failed to take second choice");
    narrate(&engine);
    engine.advance().expect("Failed to reach the ending");
    narrate(&engine);

    // Restore the save
    engine.load_state(&save).expect("Failed to restore save");
    println!(
        "\n[restored] at '{}', affection = {}",
        engine.current_node_id(),
        engine.get_variable("affection")
    );
}

fn narrate(engine: &AvgEngine) {
    let Some(node) = engine.current_node() else {
        return;
    };
    engine.trigger_audio(&mut PrintAudio);
    if node.speaker.is_empty() {
        println!("  {}", node.text);
    } else {
        println!("  {}: {}", node.speaker, node.text);
    }
    for (i, choice) in node.choices.iter().enumerate() {
        println!("    {}) {}", i + 1, choice.text);
    }
}
