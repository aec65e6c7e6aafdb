use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::dialog::{Dialog, MenuItem};
use crate::editor::Editor;
use crate::mode::Mode;

impl Editor {
    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.dialog.is_some() {
            self.handle_dialog_key(key);
            return;
        }
        if self.handle_shortcut(key) {
            return;
        }
        match self.mode {
            Mode::Tree => self.handle_tree_view_key(key.code),
            Mode::Insert => {
                self.handle_insert_mode_key(key);
                self.highlight_syntax();
            }
        }
    }

    fn handle_shortcut(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::F(10) => {
                self.open_menu();
                return true;
            }
            KeyCode::F(12) => {
                self.save_file_as();
                return true;
            }
            _ => {}
        }

        let KeyCode::Char(c) = key.code else {
            return false;
        };

        // Alt variants work on terminals that cannot report Ctrl+punctuation
        if key.modifiers.contains(KeyModifiers::ALT) {
            match c {
                '+' | '=' => self.increase_font_size(),
                '-' | '_' => self.decrease_font_size(),
                _ => return false,
            }
            return true;
        }
        if !key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }

        match c.to_ascii_lowercase() {
            'o' => self.open_file(),
            's' => self.save_file(),
            'w' => self.save_file_as(),
            'q' => self.should_exit = true,
            'z' => self.undo(),
            'y' => self.redo(),
            'c' => self.copy(),
            'x' => self.cut(),
            'v' => self.paste(),
            'a' => self.buffer.select_all(),
            'k' => self.delete_line(),
            'f' => self.find_text(),
            'r' => self.replace_text(),
            '+' | '=' => self.increase_font_size(),
            // legacy terminals send Ctrl+- as 0x1F, which decodes as Ctrl+7
            '-' | '_' | '7' => self.decrease_font_size(),
            _ => return false,
        }
        self.highlight_syntax();
        true
    }

    fn handle_insert_mode_key(&mut self, key: KeyEvent) {
        let extend = key.modifiers.contains(KeyModifiers::SHIFT);
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let buffer = &mut self.buffer;

        match key.code {
            KeyCode::Esc => {
                buffer.clear_selection();
                self.mode = Mode::Tree;
            }
            KeyCode::Left => buffer.move_left(extend),
            KeyCode::Right => buffer.move_right(extend),
            KeyCode::Up => buffer.move_up(extend),
            KeyCode::Down => buffer.move_down(extend),
            KeyCode::Home if ctrl => buffer.move_buffer_start(extend),
            KeyCode::End if ctrl => buffer.move_buffer_end(extend),
            KeyCode::Home => buffer.move_line_start(extend),
            KeyCode::End => buffer.move_line_end(extend),
            KeyCode::Enter => {
                buffer.newline();
                self.text_changed();
            }
            KeyCode::Tab => {
                buffer.insert_str("    ");
                self.text_changed();
            }
            KeyCode::Backspace => {
                buffer.backspace();
                self.text_changed();
            }
            KeyCode::Delete => {
                buffer.delete_forward();
                self.text_changed();
            }
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                buffer.insert_char(c);
                self.text_changed();
            }
            _ => {}
        }
    }

    pub fn handle_tree_view_key(&mut self, key_code: KeyCode) {
        match key_code {
            KeyCode::Char('j') | KeyCode::Down => self.tree_move(true),
            KeyCode::Char('k') | KeyCode::Up => self.tree_move(false),
            KeyCode::Char('l') | KeyCode::Right => self.tree_expand(),
            KeyCode::Char('h') | KeyCode::Left => self.tree_collapse(),
            KeyCode::Enter => self.tree_activate(),
            KeyCode::Tab | KeyCode::Esc => self.mode = Mode::Insert,
            _ => {}
        }
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        let Some(dialog) = self.dialog.take() else {
            return;
        };
        match dialog {
            Dialog::Message(_) => {}
            Dialog::Menu { selected } => match key.code {
                KeyCode::Up => {
                    self.dialog = Some(Dialog::Menu { selected: selected.saturating_sub(1) });
                }
                KeyCode::Down => {
                    let last = MenuItem::ALL.len() - 1;
                    self.dialog = Some(Dialog::Menu { selected: (selected + 1).min(last) });
                }
                KeyCode::Enter => {
                    if let Some(&item) = MenuItem::ALL.get(selected) {
                        self.activate_menu_item(item);
                    }
                }
                KeyCode::Esc | KeyCode::F(10) => {}
                _ => self.dialog = Some(Dialog::Menu { selected }),
            },
            Dialog::Prompt(mut prompt) => match key.code {
                KeyCode::Enter => {
                    self.submit_prompt(prompt);
                    self.highlight_syntax();
                }
                KeyCode::Esc => {}
                KeyCode::Backspace => {
                    prompt.input.pop();
                    self.dialog = Some(Dialog::Prompt(prompt));
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    prompt.input.push(c);
                    self.dialog = Some(Dialog::Prompt(prompt));
                }
                _ => self.dialog = Some(Dialog::Prompt(prompt)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::Clipboard;
    use crate::config::Config;
    use crate::dialog::PromptKind;
    use crossterm::event::KeyEvent;
    use std::fs;
    use tempfile::tempdir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(editor: &mut Editor, text: &str) {
        for c in text.chars() {
            let code = if c == '\n' { KeyCode::Enter } else { KeyCode::Char(c) };
            editor.handle_key(key(code));
        }
    }

    fn editor_in(root: &std::path::Path) -> Editor {
        let config = Config { root: Some(root.to_path_buf()), ..Config::default() };
        let mut editor = Editor::new(&config, Clipboard::in_memory()).unwrap();
        editor.mode = Mode::Insert;
        editor
    }

    #[test]
    fn typing_rehighlights_after_every_key() {
        let dir = tempdir().unwrap();
        let mut editor = editor_in(dir.path());
        type_text(&mut editor, "# comment\nx = 1");
        assert_eq!(editor.buffer.text(), "# comment\nx = 1");
        assert!(!editor.highlighter.spans().is_empty());
    }

    #[test]
    fn ctrl_s_on_unsaved_buffer_opens_save_as() {
        let dir = tempdir().unwrap();
        let mut editor = editor_in(dir.path());
        type_text(&mut editor, "new");
        editor.handle_key(ctrl('s'));
        assert!(matches!(
            &editor.dialog,
            Some(Dialog::Prompt(p)) if p.kind == PromptKind::SaveAs
        ));
    }

    #[test]
    fn save_as_prompt_writes_the_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("out.txt");
        let mut editor = editor_in(dir.path());
        type_text(&mut editor, "body");

        editor.handle_key(KeyEvent::new(KeyCode::F(12), KeyModifiers::NONE));
        if let Some(Dialog::Prompt(prompt)) = editor.dialog.as_mut() {
            prompt.input = target.display().to_string();
        }
        editor.handle_key(key(KeyCode::Enter));

        assert_eq!(fs::read_to_string(&target).unwrap(), "body");
        assert_eq!(editor.buffer.filename.as_deref(), Some(target.as_path()));
        assert!(!editor.buffer.modified);

        // the "saved" message swallows the next key
        editor.handle_key(key(KeyCode::Char('z')));
        assert!(editor.dialog.is_none());
        assert_eq!(editor.buffer.text(), "body");
    }

    #[test]
    fn undo_redo_shortcuts() {
        let dir = tempdir().unwrap();
        let mut editor = editor_in(dir.path());
        type_text(&mut editor, "abc");
        editor.handle_key(ctrl('z'));
        assert_eq!(editor.buffer.text(), "");
        editor.handle_key(ctrl('z'));
        assert_eq!(editor.buffer.text(), "");
        editor.handle_key(ctrl('y'));
        assert_eq!(editor.buffer.text(), "abc");
    }

    #[test]
    fn find_prompt_marks_matches_until_next_edit() {
        let dir = tempdir().unwrap();
        let mut editor = editor_in(dir.path());
        type_text(&mut editor, "ab ab");
        editor.handle_key(ctrl('f'));
        type_text(&mut editor, "ab");
        editor.handle_key(key(KeyCode::Enter));
        assert_eq!(editor.search_matches, vec![0..2, 3..5]);

        type_text(&mut editor, "!");
        assert!(editor.search_matches.is_empty());
    }

    #[test]
    fn select_all_then_cut_empties_buffer() {
        let dir = tempdir().unwrap();
        let mut editor = editor_in(dir.path());
        type_text(&mut editor, "one\ntwo");
        editor.handle_key(ctrl('a'));
        editor.handle_key(ctrl('x'));
        assert_eq!(editor.buffer.text(), "");
        editor.handle_key(ctrl('v'));
        assert_eq!(editor.buffer.text(), "one\ntwo");
    }

    #[test]
    fn font_size_keys_with_and_without_keyboard_enhancement() {
        let dir = tempdir().unwrap();
        let mut editor = editor_in(dir.path());
        let start = editor.font_size;

        editor.handle_key(ctrl('='));
        editor.handle_key(KeyEvent::new(KeyCode::Char('='), KeyModifiers::ALT));
        assert_eq!(editor.font_size, start + 2);

        editor.handle_key(ctrl('7'));
        editor.handle_key(ctrl('-'));
        editor.handle_key(KeyEvent::new(KeyCode::Char('-'), KeyModifiers::ALT));
        assert_eq!(editor.font_size, start - 1);
        assert_eq!(editor.buffer.text(), "");
    }

    #[test]
    fn escape_cancels_prompt() {
        let dir = tempdir().unwrap();
        let mut editor = editor_in(dir.path());
        editor.handle_key(ctrl('o'));
        assert!(editor.dialog.is_some());
        editor.handle_key(key(KeyCode::Esc));
        assert!(editor.dialog.is_none());
        assert_eq!(editor.mode, Mode::Insert);
    }

    #[test]
    fn menu_quit_sets_exit_flag() {
        let dir = tempdir().unwrap();
        let mut editor = editor_in(dir.path());
        editor.handle_key(KeyEvent::new(KeyCode::F(10), KeyModifiers::NONE));
        for _ in 0..10 {
            editor.handle_key(key(KeyCode::Down));
        }
        editor.handle_key(key(KeyCode::Enter));
        assert!(editor.should_exit);
    }

    #[test]
    fn tree_keys_expand_and_collapse() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("pkg")).unwrap();
        fs::write(dir.path().join("pkg").join("mod.py"), "").unwrap();
        let mut editor = editor_in(dir.path());
        editor.mode = Mode::Tree;

        editor.handle_key(key(KeyCode::Down));
        editor.handle_key(key(KeyCode::Right));
        assert_eq!(editor.tree_rows.len(), 3);
        editor.handle_key(key(KeyCode::Left));
        assert_eq!(editor.tree_rows.len(), 2);
        editor.handle_key(key(KeyCode::Tab));
        assert_eq!(editor.mode, Mode::Insert);
    }
}
