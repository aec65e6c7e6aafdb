use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::SetTitle,
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tracing::{debug, info, warn};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::buffer::Buffer;
use crate::clipboard::Clipboard;
use crate::config::Config;
use crate::dialog::{Dialog, MenuItem, Message, MessageKind, Prompt, PromptKind};
use crate::error::EditError;
use crate::mode::Mode;
use crate::syntax::Highlighter;
use crate::tree::{FileTree, TreeRow};
use crate::ui::style::UiStyle;

pub const APP_NAME: &str = "treepad";

pub struct Editor {
    pub buffer: Buffer,
    pub tree: FileTree,
    pub tree_rows: Vec<TreeRow>,
    pub highlighter: Highlighter,
    pub clipboard: Clipboard,
    pub mode: Mode,
    pub dialog: Option<Dialog>,
    pub search_matches: Vec<Range<usize>>,
    pub font_size: u16,
    pub root_path: PathBuf,
    pub title: String,
    pub tree_width: u16,
    pub tree_scroll_pos: usize,
    pub selected_item_index: usize,
    pub scroll_offset_col: usize,
    pub should_exit: bool,
    pub style: UiStyle,
}

impl Editor {
    pub fn new(config: &Config, clipboard: Clipboard) -> Result<Self> {
        let root_path = config.root_dir();
        let mut editor = Editor {
            buffer: Buffer::new(config.max_undo),
            tree: FileTree::new(),
            tree_rows: Vec::new(),
            highlighter: Highlighter::new()?,
            clipboard,
            mode: Mode::Tree,
            dialog: None,
            search_matches: Vec::new(),
            font_size: config.font_size.max(1),
            root_path,
            title: APP_NAME.to_string(),
            tree_width: 30,
            tree_scroll_pos: 0,
            selected_item_index: 0,
            scroll_offset_col: 0,
            should_exit: false,
            style: UiStyle::new(),
        };
        editor.populate_tree();
        if let Some(file) = &config.file {
            editor.load_file(file);
        }
        Ok(editor)
    }

    pub async fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut shown_title = String::new();

        loop {
            if self.should_exit {
                return Ok(());
            }
            if self.title != shown_title {
                execute!(terminal.backend_mut(), SetTitle(&self.title))?;
                shown_title = self.title.clone();
            }

            self.update_scroll_offsets(terminal.size()?);
            terminal.draw(|f| self.ui(f))?;

            match event_stream.next().await {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => self.handle_key(key),
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err.into()),
                None => return Ok(()),
            }
        }
    }

    // ---- file tree ----

    pub fn populate_tree(&mut self) {
        self.tree.initialize(&self.root_path);
        self.selected_item_index = 0;
        self.tree_scroll_pos = 0;
        self.refresh_tree_rows();
    }

    pub fn refresh_tree_rows(&mut self) {
        self.tree_rows = self.tree.visible_rows();
        self.selected_item_index = self
            .selected_item_index
            .min(self.tree_rows.len().saturating_sub(1));
    }

    fn selected_address(&self) -> Option<Vec<usize>> {
        self.tree_rows
            .get(self.selected_item_index)
            .map(|row| row.address.clone())
    }

    pub fn tree_move(&mut self, down: bool) {
        self.selected_item_index = if down {
            (self.selected_item_index + 1).min(self.tree_rows.len().saturating_sub(1))
        } else {
            self.selected_item_index.saturating_sub(1)
        };
    }

    pub fn tree_expand(&mut self) {
        if let Some(address) = self.selected_address() {
            if self.tree.expand(&address) {
                self.refresh_tree_rows();
            }
        }
    }

    pub fn tree_collapse(&mut self) {
        if let Some(address) = self.selected_address() {
            self.tree.collapse(&address);
            self.refresh_tree_rows();
        }
    }

    /// Enter on a tree row: toggles a directory, loads a file.
    pub fn tree_activate(&mut self) {
        let Some(row) = self.tree_rows.get(self.selected_item_index).cloned() else {
            return;
        };
        if row.is_directory {
            if row.expanded {
                self.tree_collapse();
            } else {
                self.tree_expand();
            }
            return;
        }
        let Some(path) = self.tree.select(&row.address).map(Path::to_path_buf) else {
            return;
        };
        if self.load_file(&path) {
            self.mode = Mode::Insert;
        }
    }

    fn reveal_in_tree(&mut self, path: &Path) {
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let Some(address) = self.tree.locate(&path) else {
            return;
        };
        if let Some(index) = self.tree_rows.iter().position(|row| row.address == address) {
            self.selected_item_index = index;
        }
    }

    // ---- files ----

    /// Makes `path` the active buffer. On failure the user sees an error and
    /// the current buffer stays as it was.
    pub fn load_file(&mut self, path: &Path) -> bool {
        match self.buffer.load_file(path) {
            Ok(()) => {
                info!(path = %path.display(), "opened file");
                self.search_matches.clear();
                self.scroll_offset_col = 0;
                self.title = format!("{APP_NAME} - {}", path.display());
                self.highlight_syntax();
                self.reveal_in_tree(path);
                true
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(path = %path.display(), error = %reason, "open failed");
                self.show_message(MessageKind::Error, format!("Cannot open file: {reason}"));
                false
            }
        }
    }

    pub fn open_file(&mut self) {
        let start = format!("{}{}", self.root_path.display(), std::path::MAIN_SEPARATOR);
        self.dialog = Some(Dialog::Prompt(Prompt::new(PromptKind::Open, start)));
    }

    /// Writes to the buffer's file, or asks for one when it has none.
    pub fn save_file(&mut self) {
        match self.buffer.filename.clone() {
            Some(path) => {
                self.write_file(&path);
            }
            None => self.save_file_as(),
        }
    }

    pub fn save_file_as(&mut self) {
        let start = match &self.buffer.filename {
            Some(path) => path.display().to_string(),
            None => format!("{}{}", self.root_path.display(), std::path::MAIN_SEPARATOR),
        };
        self.dialog = Some(Dialog::Prompt(Prompt::new(PromptKind::SaveAs, start)));
    }

    pub fn write_file(&mut self, path: &Path) -> bool {
        match self.buffer.save_to(path) {
            Ok(()) => {
                info!(path = %path.display(), bytes = self.buffer.text().len(), "saved file");
                self.title = format!("{APP_NAME} - {}", path.display());
                self.show_message(MessageKind::Info, "File saved.");
                true
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(path = %path.display(), error = %reason, "save failed");
                self.show_message(MessageKind::Error, format!("Cannot save file: {reason}"));
                false
            }
        }
    }

    // ---- editing ----

    pub fn highlight_syntax(&mut self) {
        self.highlighter.refresh(self.buffer.text());
    }

    pub fn text_changed(&mut self) {
        self.search_matches.clear();
    }

    fn ignore(result: Result<(), EditError>, action: &str) {
        if let Err(err) = result {
            debug!(action, error = %err, "ignored");
        }
    }

    pub fn undo(&mut self) {
        let result = self.buffer.undo();
        if result.is_ok() {
            self.text_changed();
        }
        Self::ignore(result, "undo");
    }

    pub fn redo(&mut self) {
        let result = self.buffer.redo();
        if result.is_ok() {
            self.text_changed();
        }
        Self::ignore(result, "redo");
    }

    pub fn copy(&mut self) {
        let result = self.buffer.selected_text().map(|text| text.to_owned());
        Self::ignore(result.map(|text| self.clipboard.copy(&text)), "copy");
    }

    pub fn cut(&mut self) {
        let result = self.buffer.delete_selection().map(|text| {
            self.clipboard.copy(&text);
            self.text_changed();
        });
        Self::ignore(result, "cut");
    }

    pub fn paste(&mut self) {
        let result = self.clipboard.paste().map(|text| {
            self.buffer.insert_str(&text);
            self.text_changed();
            self.highlight_syntax();
        });
        Self::ignore(result, "paste");
    }

    pub fn delete_line(&mut self) {
        self.buffer.delete_line();
        self.text_changed();
    }

    pub fn find_text(&mut self) {
        self.dialog = Some(Dialog::Prompt(Prompt::new(PromptKind::Find, "")));
    }

    pub fn replace_text(&mut self) {
        self.dialog = Some(Dialog::Prompt(Prompt::new(PromptKind::ReplaceFind, "")));
    }

    pub fn find(&mut self, query: &str) {
        self.search_matches = self.buffer.find_all(query);
        debug!(query, matches = self.search_matches.len(), "find");
    }

    pub fn replace(&mut self, find: &str, with: &str) {
        let count = self.buffer.replace_all(find, with);
        self.text_changed();
        self.highlight_syntax();
        self.show_message(
            MessageKind::Info,
            format!("Replaced all occurrences of '{find}' with '{with}' ({count})."),
        );
    }

    pub fn increase_font_size(&mut self) {
        self.font_size = self.font_size.saturating_add(1);
    }

    pub fn decrease_font_size(&mut self) {
        if self.font_size > 1 {
            self.font_size -= 1;
        }
    }

    // ---- dialogs ----

    pub fn show_message(&mut self, kind: MessageKind, text: impl Into<String>) {
        self.dialog = Some(Dialog::Message(Message { kind, text: text.into() }));
    }

    pub fn open_menu(&mut self) {
        self.dialog = Some(Dialog::Menu { selected: 0 });
    }

    pub fn activate_menu_item(&mut self, item: MenuItem) {
        self.dialog = None;
        match item {
            MenuItem::Open => self.open_file(),
            MenuItem::Save => self.save_file(),
            MenuItem::SaveAs => self.save_file_as(),
            MenuItem::LargerFont => self.increase_font_size(),
            MenuItem::SmallerFont => self.decrease_font_size(),
            MenuItem::Quit => self.should_exit = true,
        }
    }

    /// Empty input cancels.
    pub fn submit_prompt(&mut self, prompt: Prompt) {
        self.dialog = None;
        let input = prompt.input;
        match prompt.kind {
            PromptKind::Open => {
                if !input.is_empty() {
                    self.load_file(Path::new(&input));
                }
            }
            PromptKind::SaveAs => {
                if !input.is_empty() {
                    self.write_file(&with_default_extension(&input));
                }
            }
            PromptKind::Find => {
                if !input.is_empty() {
                    self.find(&input);
                }
            }
            PromptKind::ReplaceFind => {
                if !input.is_empty() {
                    self.dialog = Some(Dialog::Prompt(Prompt::new(
                        PromptKind::ReplaceWith { find: input },
                        "",
                    )));
                }
            }
            PromptKind::ReplaceWith { find } => self.replace(&find, &input),
        }
    }

    // ---- viewport ----

    fn update_scroll_offsets(&mut self, term_size: Rect) {
        let panes = self.layout(term_size);
        let text_area = panes.text;

        let tree_height = panes.tree.height.saturating_sub(1) as usize;
        if self.selected_item_index < self.tree_scroll_pos {
            self.tree_scroll_pos = self.selected_item_index;
        }
        if tree_height > 0 && self.selected_item_index >= self.tree_scroll_pos + tree_height {
            self.tree_scroll_pos = self.selected_item_index + 1 - tree_height;
        }

        let (row, col) = self.buffer.cursor_position();
        let gutter = self.gutter_width();
        let content_width = text_area.width.saturating_sub(gutter) as usize;
        let pre_cursor_width = self
            .buffer
            .lines()
            .nth(row)
            .map(|(_, line)| {
                let pre_cursor_text: String = line.graphemes(true).take(col).collect();
                UnicodeWidthStr::width(pre_cursor_text.as_str())
            })
            .unwrap_or(0);
        if pre_cursor_width < self.scroll_offset_col {
            self.scroll_offset_col = pre_cursor_width;
        }
        if content_width > 0 && pre_cursor_width >= self.scroll_offset_col + content_width {
            self.scroll_offset_col = pre_cursor_width + 1 - content_width;
        }

        let editor_height = text_area.height as usize;
        if row < self.buffer.top_row {
            self.buffer.top_row = row;
        }
        if editor_height > 0 && row >= self.buffer.top_row + editor_height {
            self.buffer.top_row = row + 1 - editor_height;
        }
    }

    pub fn gutter_width(&self) -> u16 {
        (self.buffer.line_count().to_string().len() + 2) as u16
    }

    pub fn mode_str(&self) -> &str {
        match self.mode {
            Mode::Tree => "TREE",
            Mode::Insert => "EDIT",
        }
    }
}

fn with_default_extension(input: &str) -> PathBuf {
    let mut path = PathBuf::from(input);
    if path.extension().is_none() {
        path.set_extension("txt");
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn editor_in(root: &Path) -> Editor {
        let config = Config { root: Some(root.to_path_buf()), ..Config::default() };
        Editor::new(&config, Clipboard::in_memory()).unwrap()
    }

    #[test]
    fn save_without_path_asks_for_one() {
        let dir = tempdir().unwrap();
        let mut editor = editor_in(dir.path());
        editor.buffer.insert_str("draft");
        editor.save_file();

        match &editor.dialog {
            Some(Dialog::Prompt(prompt)) => assert_eq!(prompt.kind, PromptKind::SaveAs),
            other => panic!("expected save-as prompt, got {other:?}"),
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn failed_load_keeps_buffer_and_reports() {
        let dir = tempdir().unwrap();
        let mut editor = editor_in(dir.path());
        editor.buffer.insert_str("precious");

        assert!(!editor.load_file(&dir.path().join("missing.txt")));
        assert_eq!(editor.buffer.text(), "precious");
        assert!(editor.buffer.filename.is_none());
        assert!(matches!(
            editor.dialog,
            Some(Dialog::Message(Message { kind: MessageKind::Error, .. }))
        ));
    }

    #[test]
    fn paste_with_empty_clipboard_changes_nothing() {
        let dir = tempdir().unwrap();
        let mut editor = editor_in(dir.path());
        editor.buffer.insert_str("abc");
        editor.paste();
        assert_eq!(editor.buffer.text(), "abc");
        assert!(editor.dialog.is_none());
    }

    #[test]
    fn undo_with_empty_history_changes_nothing() {
        let dir = tempdir().unwrap();
        let mut editor = editor_in(dir.path());
        editor.undo();
        editor.redo();
        assert_eq!(editor.buffer.text(), "");
        assert!(editor.dialog.is_none());
    }

    #[test]
    fn copy_without_selection_is_ignored() {
        let dir = tempdir().unwrap();
        let mut editor = editor_in(dir.path());
        editor.buffer.insert_str("abc");
        editor.copy();
        editor.cut();
        assert_eq!(editor.buffer.text(), "abc");
        assert_eq!(editor.clipboard.paste(), Err(EditError::EmptyClipboard));
    }

    #[test]
    fn cut_and_paste_moves_text() {
        let dir = tempdir().unwrap();
        let mut editor = editor_in(dir.path());
        editor.buffer.insert_str("hello world");
        editor.buffer.move_line_start(false);
        for _ in 0..6 {
            editor.buffer.move_right(true);
        }
        editor.cut();
        assert_eq!(editor.buffer.text(), "world");
        editor.buffer.move_line_end(false);
        editor.paste();
        assert_eq!(editor.buffer.text(), "worldhello ");
    }

    #[test]
    fn font_size_never_drops_below_one() {
        let dir = tempdir().unwrap();
        let mut editor = editor_in(dir.path());
        editor.font_size = 2;
        editor.decrease_font_size();
        editor.decrease_font_size();
        assert_eq!(editor.font_size, 1);
        editor.increase_font_size();
        assert_eq!(editor.font_size, 2);
    }

    #[test]
    fn replace_flow_goes_through_two_prompts() {
        let dir = tempdir().unwrap();
        let mut editor = editor_in(dir.path());
        editor.buffer.insert_str("a-a");

        editor.submit_prompt(Prompt::new(PromptKind::ReplaceFind, "a"));
        let Some(Dialog::Prompt(second)) = editor.dialog.clone() else {
            panic!("expected replacement prompt");
        };
        assert_eq!(second.kind, PromptKind::ReplaceWith { find: "a".into() });

        editor.submit_prompt(Prompt { input: "b".into(), ..second });
        assert_eq!(editor.buffer.text(), "b-b");
        assert!(matches!(
            editor.dialog,
            Some(Dialog::Message(Message { kind: MessageKind::Info, .. }))
        ));
    }

    #[test]
    fn selecting_a_tree_file_loads_it() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.py"), "x = 1\n").unwrap();
        let mut editor = editor_in(dir.path());

        editor.tree_move(true);
        editor.tree_activate();
        assert_eq!(editor.buffer.text(), "x = 1\n");
        assert_eq!(editor.mode, Mode::Insert);
        assert!(!editor.highlighter.spans().is_empty());
        assert!(editor.title.ends_with("main.py"));
    }

    #[test]
    fn loading_a_listed_file_selects_its_row() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        let mut editor = editor_in(dir.path());

        assert!(editor.load_file(&dir.path().join("b.txt")));
        assert_eq!(editor.selected_item_index, 2);
    }

    #[test]
    fn save_as_adds_txt_when_extension_missing() {
        let dir = tempdir().unwrap();
        let mut editor = editor_in(dir.path());
        editor.buffer.insert_str("notes");

        let bare = dir.path().join("notes");
        editor.submit_prompt(Prompt::new(PromptKind::SaveAs, bare.display().to_string()));
        assert_eq!(fs::read_to_string(dir.path().join("notes.txt")).unwrap(), "notes");
        assert!(!bare.exists());

        let script = dir.path().join("run.py");
        editor.submit_prompt(Prompt::new(PromptKind::SaveAs, script.display().to_string()));
        assert_eq!(editor.buffer.filename.as_deref(), Some(script.as_path()));
    }

    #[test]
    fn relative_paths_resolve_against_working_directory() {
        let config = Config { root: Some(PathBuf::from(".")), ..Config::default() };
        let mut editor = Editor::new(&config, Clipboard::in_memory()).unwrap();
        assert!(editor.root_path.is_absolute());
        assert!(editor.tree.node(&[0]).unwrap().path.is_absolute());

        // cargo runs tests from the package root
        assert!(editor.load_file(Path::new("Cargo.toml")));
        assert_eq!(editor.tree_rows[editor.selected_item_index].label, "Cargo.toml");
    }

    #[test]
    fn menu_adjusts_font_size() {
        let dir = tempdir().unwrap();
        let mut editor = editor_in(dir.path());
        let start = editor.font_size;
        editor.activate_menu_item(MenuItem::LargerFont);
        assert_eq!(editor.font_size, start + 1);
        editor.activate_menu_item(MenuItem::SmallerFont);
        assert_eq!(editor.font_size, start);
    }
}
