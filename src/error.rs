use std::fmt;

/// Editing failures that are not worth telling the user about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditError {
    EmptyHistory,
    NoSelection,
    EmptyClipboard,
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::EmptyHistory => write!(f, "nothing to undo or redo"),
            EditError::NoSelection => write!(f, "no text selected"),
            EditError::EmptyClipboard => write!(f, "clipboard is empty"),
        }
    }
}

impl std::error::Error for EditError {}
