/// Player: interactive console walk through a dialogue script.
///
/// Usage: player <script.json> [--config <engine.ron>]
///
/// Commands:
///   look                 show the current node
///   next                 follow the current node's next link
///   choose <n>           take choice n (0-based)
///   goto <id>            jump to a node
///   back                 return to the previous node
///   set <name> <value>   set a variable
///   get <name>           print a variable
///   save                 print the save text
///   load <text>          restore from save text
///   reset                clear position, history, and variables
///   help                 list commands
///   quit                 exit

use avg_engine::core::audio::AudioSink;
use avg_engine::AvgEngine;
use std::io::{self, BufRead, Write};

/// Prints audio cues instead of playing them.
struct ConsoleAudio;

impl AudioSink for ConsoleAudio {
    fn play_bgm(&mut self, name: &str, looped: bool) {
        println!("  [bgm] {}{}", name, if looped { " (loop)" } else { "" });
    }

    fn play_se(&mut self, name: &str) {
        println!("  [se] {}", name);
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let script_path = args[1].clone();
    let mut config_path = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut builder = AvgEngine::builder().script_path(&script_path);
    if let Some(ref path) = config_path {
        builder = builder.config_path(path);
    }
    let mut engine = match builder.build() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!("Loaded {} nodes from {}", engine.script().len(), script_path);
    println!("Type 'help' for commands.\n");
    show(&engine);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("player> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd.to_lowercase(), rest.trim()),
            None => (line.to_lowercase(), ""),
        };

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => print_help(),
            "look" | "l" => show(&engine),
            "next" | "n" => match engine.advance() {
                Ok(()) => show(&engine),
                Err(e) => println!("ERROR: {}", e),
            },
            "choose" | "c" => match rest.parse::<usize>() {
                Ok(index) => match engine.select_choice(index) {
                    Ok(()) => show(&engine),
                    Err(e) => println!("ERROR: {}", e),
                },
                Err(_) => println!("Usage: choose <n>"),
            },
            "goto" => {
                if rest.is_empty() {
                    println!("Usage: goto <id>");
                    continue;
                }
                match engine.goto_node(rest) {
                    Ok(()) => show(&engine),
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "back" | "b" => match engine.go_back() {
                Ok(()) => show(&engine),
                Err(e) => println!("ERROR: {}", e),
            },
            "set" => {
                let parts: Vec<&str> = rest.split_whitespace().collect();
                let value = parts.get(1).and_then(|v| v.parse::<i32>().ok());
                match (parts.first(), value) {
                    (Some(name), Some(value)) if parts.len() == 2 => {
                        match engine.set_variable(name, value) {
                            Ok(()) => println!("{} = {}", name, value),
                            Err(e) => println!("ERROR: {}", e),
                        }
                    }
                    _ => println!("Usage: set <name> <value>"),
                }
            }
            "get" => {
                if rest.is_empty() {
                    println!("Usage: get <name>");
                } else if engine.has_variable(rest) {
                    println!("{} = {}", rest, engine.get_variable(rest));
                } else {
                    println!("{} is not set (reads as 0)", rest);
                }
            }
            "save" => match engine.save_state() {
                Ok(text) => println!("{}", text),
                Err(e) => println!("ERROR: {}", e),
            },
            "load" => match engine.load_state(rest) {
                Ok(()) => {
                    println!("State restored.");
                    show(&engine);
                }
                Err(e) => println!("ERROR: {}", e),
            },
            "reset" => match engine.reset() {
                Ok(()) => println!("State cleared. Use 'goto <id>' to start again."),
                Err(e) => println!("ERROR: {}", e),
            },
            _ => {
                println!("Unknown command: {}. Type 'help' for commands.", cmd);
            }
        }
    }
}

fn show(engine: &AvgEngine) {
    let Some(node) = engine.current_node() else {
        if engine.current_node_id().is_empty() {
            println!("(no current node)");
        } else {
            println!("(current node '{}' is not in the script)", engine.current_node_id());
        }
        return;
    };

    println!("\n[{}] {}", node.kind.name(), node.id);
    if !node.background.is_empty() {
        println!("  background: {}", node.background);
    }
    if !node.character.is_empty() {
        let expression = if node.expression.is_empty() {
            String::new()
        } else {
            format!(" ({})", node.expression)
        };
        println!("  character: {}{}", node.character, expression);
    }
    engine.trigger_audio(&mut ConsoleAudio);

    if node.speaker.is_empty() {
        println!("{}", node.text);
    } else {
        println!("{}: {}", node.speaker, node.text);
    }

    for (i, choice) in node.choices.iter().enumerate() {
        println!("  {}) {}", i, choice.text);
    }
    if node.has_next() {
        println!("  (next: {})", node.next);
    } else if node.choices.is_empty() {
        println!("  (no way forward)");
    }
    println!();
}

fn print_usage() {
    println!("Usage: player <script.json> [--config <engine.ron>]");
}

fn print_help() {
    println!("Commands:");
    println!("  look                 show the current node");
    println!("  next                 follow the current node's next link");
    println!("  choose <n>           take choice n (0-based)");
    println!("  goto <id>            jump to a node");
    println!("  back                 return to the previous node");
    println!("  set <name> <value>   set a variable");
    println!("  get <name>           print a variable");
    println!("  save                 print the save text");
    println!("  load <text>          restore from save text");
    println!("  reset                clear position, history, and variables");
    println!("  help                 list commands");
    println!("  quit                 exit");
}
