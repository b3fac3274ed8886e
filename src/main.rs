//! CLI tool to inspect logging templates in C# sources.

use std::path::Path;
use std::process::ExitCode;

use logtemplate_rs::{
    Config, Position, Range, TextDocument, find_brace_match, find_call_ranges, highlight_document,
    parse_expression, parse_template, read_document,
};

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn usage() -> ExitCode {
    eprintln!("Usage: logtemplate <command> [args...]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  highlight <files...>        Print classified template regions");
    eprintln!("  calls <files...>            Print template-bearing call ranges");
    eprintln!("  braces <file> <line> <col>  Print the brace matching a position");
    eprintln!("  template <text>             Parse a message template");
    eprintln!("  expr <text>                 Classify an expression template");
    eprintln!();
    eprintln!("Lines and columns are 1-based.");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  logtemplate highlight Program.cs");
    eprintln!("  logtemplate braces Program.cs 12 31");
    eprintln!("  logtemplate template \"User {{Name}} logged in\"");
    ExitCode::from(2)
}

/// 1-based `line:col` for display.
fn at(pos: Position) -> String {
    format!("{}:{}", pos.line + 1, pos.character + 1)
}

fn span(range: Range) -> String {
    format!("{}-{}", at(range.start), at(range.end))
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 || args[1] == "--help" || args[1] == "-h" {
        return usage();
    }

    let command = args[1].as_str();
    let rest = &args[2..];
    let config = Config::default();

    match command {
        "highlight" => for_each_file(rest, |path, doc| {
            for template in highlight_document(doc, &config) {
                println!(
                    "{path}:{} {:?} {:?} {:?}",
                    span(template.range),
                    template.flavor,
                    template.kind,
                    template.content
                );
                for region in &template.regions {
                    println!("  {} {}", span(region.range), region.classification);
                }
            }
        }),
        "calls" => for_each_file(rest, |path, doc| {
            for call in find_call_ranges(doc, &config) {
                println!("{path}:{}", span(call.range()));
            }
        }),
        "braces" => braces(rest, &config),
        "template" => {
            for prop in parse_template(&rest[0]) {
                println!(
                    "{}..{} {:?} {} alignment={} format={}",
                    prop.start_index,
                    prop.end_index,
                    prop.kind,
                    prop.name,
                    prop.alignment.as_deref().unwrap_or("-"),
                    prop.format_specifier.as_deref().unwrap_or("-")
                );
            }
            ExitCode::SUCCESS
        }
        "expr" => {
            for region in parse_expression(&rest[0]) {
                println!(
                    "{}..{} {}",
                    region.start_index, region.end_index, region.classification
                );
            }
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {command}");
            ExitCode::from(2)
        }
    }
}

fn for_each_file(files: &[String], mut run: impl FnMut(&str, &dyn TextDocument)) -> ExitCode {
    let mut had_error = false;

    for path in files {
        match read_document(Path::new(path)) {
            Ok(doc) => run(path, &doc),
            Err(e) => {
                eprintln!("{e}");
                had_error = true;
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn braces(args: &[String], config: &Config) -> ExitCode {
    let [path, line, col] = args else {
        eprintln!("Error: braces needs <file> <line> <col>");
        return ExitCode::from(2);
    };
    let (Ok(line), Ok(col)) = (line.parse::<usize>(), col.parse::<usize>()) else {
        eprintln!("Error: line and column must be numbers");
        return ExitCode::from(2);
    };
    if line == 0 || col == 0 {
        eprintln!("Error: line and column are 1-based");
        return ExitCode::from(2);
    }

    let doc = match read_document(Path::new(path)) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match find_brace_match(&doc, Position::new(line - 1, col - 1), config) {
        Some(pair) => {
            println!("{} {}", at(pair.open.start), at(pair.close.start));
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("{path}: no matching brace at {line}:{col}");
            ExitCode::FAILURE
        }
    }
}
