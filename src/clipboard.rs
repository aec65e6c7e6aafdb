use tracing::debug;

use crate::error::EditError;

/// System clipboard with an in-process register as fallback.
pub struct Clipboard {
    system: Option<arboard::Clipboard>,
    register: Option<String>,
}

impl Clipboard {
    pub fn new() -> Self {
        let system = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(err) => {
                debug!(error = %err, "system clipboard unavailable, using internal register");
                None
            }
        };
        Self { system, register: None }
    }

    pub fn in_memory() -> Self {
        Self { system: None, register: None }
    }

    pub fn copy(&mut self, text: &str) {
        if let Some(system) = self.system.as_mut() {
            if let Err(err) = system.set_text(text.to_owned()) {
                debug!(error = %err, "failed to set system clipboard");
            }
        }
        self.register = Some(text.to_owned());
    }

    pub fn paste(&mut self) -> Result<String, EditError> {
        let from_system = self.system.as_mut().and_then(|system| system.get_text().ok());
        from_system
            .or_else(|| self.register.clone())
            .filter(|text| !text.is_empty())
            .ok_or(EditError::EmptyClipboard)
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}
