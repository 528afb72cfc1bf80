use std::io::Read;
use std::process::exit;

use lattice::{cli, render_to_file, Options};

fn main() {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("lattice: {e}");
            eprintln!("Usage: lattice [-I <dir>]... <template>...");
            eprintln!("Try 'lattice --help' for more information.");
            exit(1);
        }
    };

    if args.help {
        help();
        return;
    }

    // ── Root value from standard input ────────────────────────────────────────
    let mut input = String::new();
    if std::io::stdin().read_to_string(&mut input).is_err() {
        eprintln!("lattice: failed to read standard input");
        exit(2);
    }

    let root: serde_json::Value = match serde_json::from_str(&input) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("lattice: failed to parse JSON: {e}");
            exit(3);
        }
    };

    // ── Render each template in order ─────────────────────────────────────────
    let mut opts = Options::default();
    if !args.search.is_empty() {
        opts.search = Some(args.search.clone());
    }

    let stdout = std::io::stdout();
    for path in &args.templates {
        let src = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("lattice: failed to read '{}': {e}", path.display());
                exit(2);
            }
        };

        let mut out = stdout.lock();
        if let Err(err) = render_to_file(&src, &root, &mut out, &opts) {
            let file = err
                .file
                .clone()
                .unwrap_or_else(|| path.display().to_string());
            eprintln!(
                "{} error: {} ({}:{})",
                err.code.name(),
                err.message,
                file,
                err.line
            );
            exit(4);
        }
    }
}

fn help() {
    println!("Usage: lattice [-I <dir>]... <template>...");
    println!("Format templates using JSON parsed from standard input.");
    println!("Multiple templates are rendered to standard output in order.");
    println!();
    println!("Options:");
    println!("  -I <dir>   add a directory to the include search path");
    println!("  --help     show this help page");
    println!();
    println!("Exit status:");
    println!("  0    completed successfully");
    println!("  1    argument error");
    println!("  2    IO error");
    println!("  3    JSON parsing error");
    println!("  4    templating error");
}
