use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration JSON")]
    #[diagnostic(code(nirimgr::config::parse_error))]
    ParseError {
        #[source_code]
        src: String,
        #[label("here")]
        span: miette::SourceSpan,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(nirimgr::config::invalid))]
    Invalid { message: String },

    #[error("No configuration file found (searched: {})", format_paths(.searched))]
    #[diagnostic(
        code(nirimgr::config::not_found),
        help("pass --config <path> or create ~/.config/nirimgr/config.json")
    )]
    NotFound { searched: Vec<PathBuf> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
