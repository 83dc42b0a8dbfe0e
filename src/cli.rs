use std::path::PathBuf;

use clap::Parser;
use sexp_runtime::Backend;

/// Reads S-expressions and writes them back in canonical form.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Options {
    /// Loads a file to use as input.
    #[arg(short, long)]
    pub load: Option<PathBuf>,

    /// Starts a repl session.
    #[arg(short, long)]
    pub repl: bool,

    /// Logs collections, releases and syntax errors.
    #[arg(short, long)]
    pub debug: bool,

    /// Uses the manual allocator instead of the tracing one.
    #[arg(long)]
    pub manual: bool,

    /// Heap allocates every symbol instead of packing short names.
    #[arg(long)]
    pub long_symbols: bool,
}

impl Options {
    pub fn log_level(&self) -> log::LevelFilter {
        if self.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        }
    }

    pub fn universe(&self) -> sexp_runtime::Options {
        sexp_runtime::Options {
            backend: if self.manual {
                Backend::Manual
            } else {
                Backend::Tracing
            },
            compact_symbols: !self.long_symbols,
        }
    }
}
