use std::path::PathBuf;

use clap::Parser;

/// Command line options. There is no configuration file.
#[derive(Debug, Clone, Parser)]
#[command(name = "treepad", version, about = "A small terminal text editor with a file tree")]
pub struct Config {
    /// File to open at startup
    pub file: Option<PathBuf>,

    /// Directory shown at the top of the file tree [default: working directory]
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Initial font size
    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u16).range(1..))]
    pub font_size: u16,

    /// Maximum number of undo steps kept; unbounded when omitted
    #[arg(long)]
    pub max_undo: Option<usize>,

    /// Write tracing output to this file (filter with RUST_LOG)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// The tree root as an absolute path.
    pub fn root_dir(&self) -> PathBuf {
        let root = self
            .root
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        std::path::absolute(&root).unwrap_or(root)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: None,
            root: None,
            font_size: 12,
            max_undo: None,
            log_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let config = Config::parse_from([
            "treepad",
            "notes.txt",
            "--root",
            "/tmp",
            "--font-size",
            "16",
            "--max-undo",
            "50",
        ]);
        assert_eq!(config.file, Some(PathBuf::from("notes.txt")));
        assert_eq!(config.root_dir(), PathBuf::from("/tmp"));
        assert_eq!(config.font_size, 16);
        assert_eq!(config.max_undo, Some(50));
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn font_size_must_be_positive() {
        assert!(Config::try_parse_from(["treepad", "--font-size", "0"]).is_err());
    }

    #[test]
    fn defaults_match_parser_defaults() {
        let parsed = Config::parse_from(["treepad"]);
        let default = Config::default();
        assert_eq!(parsed.font_size, default.font_size);
        assert_eq!(parsed.max_undo, default.max_undo);
        assert_eq!(parsed.file, default.file);
    }

    #[test]
    fn relative_root_becomes_absolute() {
        let config = Config::parse_from(["treepad", "--root", "some/dir"]);
        let root = config.root_dir();
        assert!(root.is_absolute());
        assert!(root.ends_with("some/dir"));
    }
}
