//! Skillet CLI and REPL
//!
//! Usage:
//!   skillet run <file.skl>   - Execute a Skillet file
//!   skillet repl             - Start interactive REPL
//!   skillet help             - Show help message

use std::env;
use std::fs;
use std::io;
use std::process;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use skillet::{Interpreter, Lexer, Parser, Reporter, VERSION};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        return;
    }

    match args[1].as_str() {
        "run" => {
            if args.len() < 3 {
                eprintln!("{}: missing file argument", "error".red());
                eprintln!("Usage: skillet run <file.skl>");
                process::exit(64);
            }
            run_file(&args[2]);
        }
        "repl" => run_repl(),
        "help" | "--help" | "-h" => print_help(),
        "version" | "--version" | "-v" => println!("Skillet {}", VERSION),
        _ => {
            // Assume it's a file
            if args[1].ends_with(".skl") {
                run_file(&args[1]);
            } else {
                eprintln!("{}: unknown command '{}'", "error".red(), args[1]);
                print_help();
                process::exit(64);
            }
        }
    }
}

fn print_help() {
    println!("{}", "Skillet".cyan().bold());
    println!("A small scripting language with typed variables");
    println!("{} {}\n", "Version".cyan(), VERSION);
    println!("{}", "USAGE:".yellow());
    println!("  skillet run <file.skl>   Execute a Skillet file");
    println!("  skillet repl             Start interactive REPL");
    println!("  skillet help             Show this help message");
    println!("  skillet version          Show version\n");
    println!("{}", "EXAMPLES:".yellow());
    println!("  skillet run scripts/hello.skl");
    println!("  skillet repl\n");
    println!("{}", "LANGUAGE FEATURES:".yellow());
    println!("  int x = 10;               Typed variable");
    println!("  array<int> a = {{1, 2}};   Array with element type");
    println!("  print a[0];               Bounds-checked access");
    println!("  for (int n : a) {{ print n; }}");
    println!("  int add(int x, int y) {{ return x + y; }}");
}

fn run_file(path: &str) {
    let source = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{}: cannot read file '{}': {}", "error".red(), path, e);
            process::exit(64);
        }
    };

    let result = skillet::run(&source);

    for diagnostic in &result.diagnostics {
        eprintln!("{}", diagnostic.to_string().red());
    }

    process::exit(result.status.exit_code());
}

fn run_repl() {
    println!(
        "{} {} - {}",
        "Skillet".cyan().bold(),
        VERSION.cyan(),
        "typed scripts, checked as they run".dimmed()
    );
    println!("Type {} to exit, {} for help\n", "exit".yellow(), "help".yellow());

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("{}: cannot start REPL: {}", "error".red(), e);
            process::exit(1);
        }
    };

    // Globals persist across REPL lines.
    let mut stdout = io::stdout();
    let mut interpreter = Interpreter::new(&mut stdout);

    loop {
        match rl.readline(&format!("{} ", "skl>".green().bold())) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match line {
                    "exit" | "quit" => {
                        println!("{}", "Goodbye!".cyan());
                        break;
                    }
                    "help" => {
                        print_repl_help();
                        continue;
                    }
                    _ => {}
                }

                let mut reporter = Reporter::new();
                let tokens = Lexer::new(line, &mut reporter).tokenize();
                let statements = Parser::new(tokens, &mut reporter).parse();

                if reporter.had_error() {
                    for diagnostic in reporter.diagnostics() {
                        eprintln!("{}", diagnostic.to_string().red());
                    }
                    continue;
                }

                if let Err(error) = interpreter.interpret(&statements) {
                    eprintln!("{}", error.to_string().red());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".cyan());
                break;
            }
            Err(err) => {
                eprintln!("{}: {:?}", "error".red(), err);
                break;
            }
        }
    }
}

fn print_repl_help() {
    println!("{}", "REPL Commands:".yellow());
    println!("  exit, quit   Exit the REPL");
    println!("  help         Show this help\n");
    println!("{}", "Language Examples:".yellow());
    println!("  int x = 10;");
    println!("  x = x + 1;");
    println!("  array<string> names = {{\"ada\", \"grace\"}};");
    println!("  for (string n : names) {{ print n; }}");
    println!("  int double(int n) {{ return n * 2; }}");
    println!("  print double(x);");
}
