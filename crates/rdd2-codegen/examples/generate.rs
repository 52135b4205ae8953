//! Control Law Generation
//!
//! Derives every rdd2 control law and writes `rdd2.c` / `rdd2.h`.
//!
//! Usage: `cargo run --example generate -- [destination] [config.json]`
//!
//! The destination defaults to `gen`. Without a config file the default gains
//! are used.

use std::path::PathBuf;
use std::process::ExitCode;

use rdd2_codegen::{generate_laws, LawRegistry};
use rdd2_core::LawConfig;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let destination = PathBuf::from(args.next().unwrap_or_else(|| "gen".to_string()));

    let config = match args.next() {
        Some(path) => match LawConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("failed to load {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => LawConfig::default(),
    };

    println!("=== rdd2 control law generation ===\n");

    match LawRegistry::derive_all(&config) {
        Ok(registry) => {
            for law in registry.iter() {
                println!(
                    "  {:<24} {} in, {} out, {} instructions",
                    law.name(),
                    law.n_in(),
                    law.n_out(),
                    law.tape().len()
                );
            }
        }
        Err(err) => {
            eprintln!("derivation failed: {err}");
            return ExitCode::FAILURE;
        }
    }

    match generate_laws(&config, &destination) {
        Ok(paths) => {
            println!();
            for path in paths {
                println!("wrote {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("generation failed: {err}");
            ExitCode::FAILURE
        }
    }
}
