//! muppet: evaluate health-check rules from a file or stdin.
//!
//! Usage: `muppet [RULES_FILE]` (`-` or no argument reads stdin).
//!
//! Prints a JSON array of results to stdout. Lines that fail to parse or
//! build are reported on stderr and skipped. Exit code reflects the worst
//! status: 0 OK, 1 WARN, 2 ERROR, 3 when the rules cannot be read.

use std::fs::File;
use std::io::{BufReader, stdin};

use muppet::config::Config;
use muppet::eval::worst_status;
use muppet::{Muppet, ParseError, ParsedRules, Status};

const EXIT_UNREADABLE: i32 = 3;

fn read_rules(path: Option<&str>) -> Result<ParsedRules, ParseError> {
    match path {
        Some(p) if p != "-" => muppet::parse::parse_reader(BufReader::new(File::open(p)?)),
        _ => muppet::parse::parse_reader(stdin().lock()),
    }
}

fn exit_code(status: Status) -> i32 {
    match status {
        Status::Ok => 0,
        Status::Warn => 1,
        Status::Error => 2,
    }
}

fn main() {
    let config = Config::load();
    muppet::logging::init(config.log_level());

    let path = std::env::args().nth(1);
    let parsed = match read_rules(path.as_deref()) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("muppet: {e}");
            std::process::exit(EXIT_UNREADABLE);
        }
    };
    for e in &parsed.errors {
        eprintln!("muppet: {e}");
    }

    let facade = Muppet::from_config(&config);
    let mut engine = facade.new_rules_engine();
    for e in engine.add_rules(parsed) {
        eprintln!("muppet: {e}");
    }

    let results = engine.evaluate_rules();
    if let Some(log_path) = config.results_log_path() {
        muppet::logging::record_results(&log_path, &results);
    }

    match serde_json::to_string_pretty(&results) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("muppet: cannot serialize results: {e}");
            std::process::exit(EXIT_UNREADABLE);
        }
    }

    std::process::exit(exit_code(worst_status(&results)));
}
