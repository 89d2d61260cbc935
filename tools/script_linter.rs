/// Script Linter: loads dialogue scripts and reports links to missing nodes.
///
/// Usage: script_linter <script.json>...

use avg_engine::core::script::Script;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: script_linter <script.json>...");
        process::exit(0);
    }

    let mut errors = 0;
    let mut warnings = 0;

    for path in &args[1..] {
        println!("=== {} ===", path);
        let script = match Script::load_from_file(Path::new(path)) {
            Ok(script) => script,
            Err(e) => {
                println!("ERROR: {}", e);
                errors += 1;
                continue;
            }
        };

        println!(
            "  {} nodes, entry {}",
            script.len(),
            script.entry().unwrap_or("(none)")
        );

        let dangling = script.dangling_references();
        if dangling.is_empty() {
            println!("  All links resolve.");
        }
        for finding in &dangling {
            println!("WARNING: {}", finding);
        }
        warnings += dangling.len();
    }

    println!("\nSummary: {} errors, {} dangling references", errors, warnings);

    if errors == 0 && warnings == 0 {
        process::exit(0);
    } else {
        process::exit(1);
    }
}
