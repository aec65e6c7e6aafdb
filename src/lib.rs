pub mod buffer;
pub mod clipboard;
pub mod config;
pub mod dialog;
pub mod editor;
pub mod error;
pub mod history;
mod key_handler;
pub mod logging;
pub mod mode;
pub mod syntax;
pub mod tree;
pub mod ui;

use std::io;

use anyhow::Result;
use crossterm::{
    cursor::SetCursorStyle,
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};

use clipboard::Clipboard;
use config::Config;
use editor::Editor;

/// Asks the terminal to report Ctrl+punctuation as distinct keys. Without
/// this, Ctrl+= arrives as a plain `=`.
fn enable_keyboard_enhancement(stdout: &mut io::Stdout) -> bool {
    match supports_keyboard_enhancement() {
        Ok(true) => {
            let flags = KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES;
            match execute!(stdout, PushKeyboardEnhancementFlags(flags)) {
                Ok(()) => {
                    tracing::debug!(?flags, "keyboard enhancement enabled");
                    true
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to enable keyboard enhancement");
                    false
                }
            }
        }
        Ok(false) => {
            tracing::info!("keyboard enhancement not supported by terminal");
            false
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to query keyboard enhancement support");
            false
        }
    }
}

pub async fn run(config: Config) -> Result<()> {
    // build the editor before touching the terminal so startup errors print normally
    let mut editor = Editor::new(&config, Clipboard::new())?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    let keyboard_enhanced = enable_keyboard_enhancement(&mut stdout);
    let mut terminal = {
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend)?
    };

    let res = editor.run(&mut terminal).await;

    // restore terminal
    if keyboard_enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        SetCursorStyle::DefaultUserShape
    )?;
    terminal.show_cursor()?;

    res
}
