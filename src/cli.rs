//! Command-line argument parsing.
//!
//! Usage:
//!   lattice [-I <dir>]... <template>...
//!
//! Reads JSON from standard input and renders each template to standard
//! output in order.

use std::path::PathBuf;

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Templates to render, in order.
    pub templates: Vec<PathBuf>,
    /// Include search directories (`-I <dir>`).
    pub search: Vec<PathBuf>,
    /// `--help` was given.
    pub help: bool,
}

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(&raw[1..])
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            i += 1;
            args.templates
                .extend(argv[i..].iter().map(PathBuf::from));
            break;
        }

        if arg == "--help" {
            args.help = true;
            i += 1;
            continue;
        }

        if let Some(rest) = arg.strip_prefix("-I") {
            if !rest.is_empty() {
                // Embedded: -I<dir>
                args.search.push(PathBuf::from(rest));
            } else if i + 1 < argv.len() {
                // Separate: -I <dir>
                i += 1;
                args.search.push(PathBuf::from(&argv[i]));
            } else {
                return Err("option -I requires a directory".into());
            }
            i += 1;
            continue;
        }

        if arg.starts_with('-') && arg != "-" {
            return Err(format!("unknown option '{arg}'"));
        }

        args.templates.push(PathBuf::from(arg));
        i += 1;
    }

    if args.templates.is_empty() && !args.help {
        return Err("missing template operand".into());
    }

    Ok(args)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
