//! # sectional demo application
//!
//! A sample CLI that declares its configuration as sections and gets its
//! command-line flags for free. It exists to demonstrate and manually verify
//! sectional's features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example sectional_demo -- --host 0.0.0.0
//! cargo run --example sectional_demo -- --help
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                   | How to exercise it                                                  |
//! |---------------------------|---------------------------------------------------------------------|
//! | Required flag             | `cargo run --example sectional_demo` (fails: `--host` missing)      |
//! | Section merge             | `--port` defaults to 8080 (the app's override of the base 3000)     |
//! | Extra flag spellings      | `-H 0.0.0.0 -p 9000`                                                |
//! | Closed set                | `--host x --color purple` (rejected)                                |
//! | Toggle                    | `--host x -v`                                                       |
//! | Multi-value flag          | `--host x --tags alpha beta`                                        |
//! | Ignored tokens            | `--host x --not-ours 1 stray`                                       |
//! | Debug logging             | `RUST_LOG=sectional=trace cargo run --example sectional_demo -- --host x` |

mod config;

use sectional::check_required;
use tracing_subscriber::EnvFilter;

use config::DemoConfig;

fn ansi_color_code(name: &str) -> &str {
    match name {
        "red" => "\x1b[31m",
        "green" => "\x1b[32m",
        "yellow" => "\x1b[33m",
        "blue" => "\x1b[34m",
        "magenta" => "\x1b[35m",
        "cyan" => "\x1b[36m",
        "white" => "\x1b[37m",
        _ => "\x1b[0m",
    }
}

const RESET: &str = "\x1b[0m";

fn echo_all(entries: &[(String, String)], typed: &DemoConfig) {
    let color = ansi_color_code(&typed.display.color);

    if typed.display.verbose {
        println!(
            "{color}[verbose] Serving {}:{} with up to {} connections{RESET}",
            typed.server.host, typed.server.port, typed.server.max_connections
        );
        if let Some(tags) = &typed.display.tags {
            println!("{color}[verbose] tags: {}{RESET}", tags.join(", "));
        }
        println!();
    }

    if typed.display.format == "plain" {
        for (key, value) in entries {
            println!("{key}={value}");
        }
    } else {
        let max_key_len = entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in entries {
            println!("{color}{key:<max_key_len$}{RESET}  {value}");
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let registry = config::registry().unwrap_or_else(|e| {
        eprintln!("Invalid configuration schema:\n{e}");
        std::process::exit(2);
    });

    let resolved = registry.parse_args().unwrap_or_else(|e| {
        eprintln!("Invalid configuration schema:\n{e}");
        std::process::exit(2);
    });

    if let Err(e) = check_required(&resolved, true) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let typed: DemoConfig = resolved.extract().unwrap_or_else(|e| {
        eprintln!("Failed to load config:\n{e}");
        std::process::exit(1);
    });

    echo_all(&resolved.entries(), &typed);
}
