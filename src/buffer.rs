use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::EditError;
use crate::history::{Delta, UndoHistory};

// cursor and anchor are byte offsets on grapheme boundaries
pub struct Buffer {
    pub filename: Option<PathBuf>,
    pub modified: bool,
    pub top_row: usize,
    text: String,
    cursor: usize,
    anchor: Option<usize>,
    history: UndoHistory,
}

impl Buffer {
    pub fn new(max_undo: Option<usize>) -> Buffer {
        Buffer {
            filename: None,
            modified: false,
            top_row: 0,
            text: String::new(),
            cursor: 0,
            anchor: None,
            history: UndoHistory::new(max_undo),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replaces the content with the file at `path`. Nothing changes when the
    /// file cannot be read as UTF-8.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        self.text = content;
        self.filename = Some(path.to_path_buf());
        self.cursor = 0;
        self.anchor = None;
        self.top_row = 0;
        self.history.clear();
        self.modified = false;
        Ok(())
    }

    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.text)
            .with_context(|| format!("failed to write {}", path.display()))?;
        self.filename = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Lines with their start offsets. A `\r` before the `\n` belongs to the
    /// line break, not the line.
    pub fn lines(&self) -> impl Iterator<Item = (usize, &str)> {
        let len = self.text.len();
        let mut start = 0;
        self.text.split('\n').map(move |line| {
            let line_start = start;
            start += line.len() + 1;
            let terminated = line_start + line.len() < len;
            let line = match line.strip_suffix('\r') {
                Some(stripped) if terminated => stripped,
                _ => line,
            };
            (line_start, line)
        })
    }

    /// Cursor position as (row, grapheme column).
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let row = before.matches('\n').count();
        let line_start = self.line_start(self.cursor);
        let col = self.text[line_start..self.cursor].graphemes(true).count();
        (row, col)
    }

    fn line_start(&self, offset: usize) -> usize {
        self.text[..offset].rfind('\n').map_or(0, |i| i + 1)
    }

    fn line_end(&self, offset: usize) -> usize {
        match self.text[offset..].find('\n') {
            Some(i) if self.text[offset..offset + i].ends_with('\r') => offset + i - 1,
            Some(i) => offset + i,
            None => self.text.len(),
        }
    }

    fn prev_boundary(&self, offset: usize) -> usize {
        self.text[..offset]
            .grapheme_indices(true)
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self, offset: usize) -> usize {
        self.text[offset..]
            .graphemes(true)
            .next()
            .map_or(offset, |g| offset + g.len())
    }

    fn clamp_to_boundary(&self, mut offset: usize) -> usize {
        offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }

    // ---- selection ----

    pub fn selection(&self) -> Option<Range<usize>> {
        let anchor = self.anchor?;
        let range = anchor.min(self.cursor)..anchor.max(self.cursor);
        (!range.is_empty()).then_some(range)
    }

    pub fn selected_text(&self) -> Result<&str, EditError> {
        self.selection()
            .map(|range| &self.text[range])
            .ok_or(EditError::NoSelection)
    }

    pub fn select_all(&mut self) {
        self.anchor = Some(0);
        self.cursor = self.text.len();
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    pub fn delete_selection(&mut self) -> Result<String, EditError> {
        let range = self.selection().ok_or(EditError::NoSelection)?;
        let removed = self.text[range.clone()].to_string();
        self.apply(Delta::delete(range.start, removed.clone()));
        self.cursor = range.start;
        self.anchor = None;
        Ok(removed)
    }

    // ---- cursor movement ----

    fn begin_move(&mut self, extend: bool) {
        if !extend {
            self.anchor = None;
        } else if self.anchor.is_none() {
            self.anchor = Some(self.cursor);
        }
    }

    pub fn move_left(&mut self, extend: bool) {
        self.begin_move(extend);
        self.cursor = self.prev_boundary(self.cursor);
    }

    pub fn move_right(&mut self, extend: bool) {
        self.begin_move(extend);
        self.cursor = self.next_boundary(self.cursor);
    }

    pub fn move_up(&mut self, extend: bool) {
        self.begin_move(extend);
        let (row, col) = self.cursor_position();
        if row == 0 {
            self.cursor = 0;
        } else {
            self.cursor = self.offset_at(row - 1, col);
        }
    }

    pub fn move_down(&mut self, extend: bool) {
        self.begin_move(extend);
        let (row, col) = self.cursor_position();
        if row + 1 >= self.line_count() {
            self.cursor = self.text.len();
        } else {
            self.cursor = self.offset_at(row + 1, col);
        }
    }

    pub fn move_line_start(&mut self, extend: bool) {
        self.begin_move(extend);
        self.cursor = self.line_start(self.cursor);
    }

    pub fn move_line_end(&mut self, extend: bool) {
        self.begin_move(extend);
        self.cursor = self.line_end(self.cursor);
    }

    pub fn move_buffer_start(&mut self, extend: bool) {
        self.begin_move(extend);
        self.cursor = 0;
    }

    pub fn move_buffer_end(&mut self, extend: bool) {
        self.begin_move(extend);
        self.cursor = self.text.len();
    }

    fn offset_at(&self, row: usize, col: usize) -> usize {
        let Some((start, line)) = self.lines().nth(row) else {
            return self.text.len();
        };
        line.grapheme_indices(true)
            .nth(col)
            .map_or(start + line.len(), |(i, _)| start + i)
    }

    // ---- editing ----

    fn apply(&mut self, delta: Delta) {
        delta.apply(&mut self.text);
        self.history.record(delta, self.cursor);
        self.modified = true;
    }

    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        let _ = self.delete_selection();
        let at = self.cursor;
        self.apply(Delta::insert(at, s));
        self.cursor = at + s.len();
    }

    pub fn insert_char(&mut self, c: char) {
        let mut tmp = [0; 4];
        self.insert_str(c.encode_utf8(&mut tmp));
    }

    pub fn newline(&mut self) {
        self.insert_str("\n");
    }

    pub fn backspace(&mut self) {
        if self.delete_selection().is_ok() || self.cursor == 0 {
            return;
        }
        let start = self.prev_boundary(self.cursor);
        let removed = self.text[start..self.cursor].to_string();
        self.apply(Delta::delete(start, removed));
        self.cursor = start;
    }

    pub fn delete_forward(&mut self) {
        if self.delete_selection().is_ok() || self.cursor == self.text.len() {
            return;
        }
        let end = self.next_boundary(self.cursor);
        let removed = self.text[self.cursor..end].to_string();
        self.apply(Delta::delete(self.cursor, removed));
    }

    /// Empties the cursor's line but keeps its line break.
    pub fn delete_line(&mut self) {
        self.anchor = None;
        let start = self.line_start(self.cursor);
        let end = self.line_end(self.cursor);
        if start < end {
            let removed = self.text[start..end].to_string();
            self.history.separator();
            self.apply(Delta::delete(start, removed));
        }
        self.cursor = start;
        self.history.separator();
    }

    pub fn undo(&mut self) -> Result<(), EditError> {
        let cursor = self.history.undo(&mut self.text).ok_or(EditError::EmptyHistory)?;
        self.after_history_step(cursor);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), EditError> {
        let cursor = self.history.redo(&mut self.text).ok_or(EditError::EmptyHistory)?;
        self.after_history_step(cursor);
        Ok(())
    }

    fn after_history_step(&mut self, cursor: usize) {
        self.cursor = self.clamp_to_boundary(cursor);
        self.anchor = None;
        self.modified = true;
    }

    // ---- search ----

    pub fn find_all(&self, query: &str) -> Vec<Range<usize>> {
        if query.is_empty() {
            return Vec::new();
        }
        self.text
            .match_indices(query)
            .map(|(i, m)| i..i + m.len())
            .collect()
    }

    /// Replaces every occurrence of `find` in one undo step. Returns how many
    /// were replaced.
    pub fn replace_all(&mut self, find: &str, with: &str) -> usize {
        let matches = self.find_all(find);
        if matches.is_empty() {
            return 0;
        }

        let mut deltas = Vec::with_capacity(matches.len());
        let mut shift: isize = 0;
        for range in &matches {
            let offset = (range.start as isize + shift) as usize;
            let delta = Delta::replace(offset, find, with);
            delta.apply(&mut self.text);
            deltas.push(delta);
            shift += with.len() as isize - find.len() as isize;
        }
        self.history.record_group(deltas, self.cursor);

        self.anchor = None;
        self.cursor = self.clamp_to_boundary(self.cursor);
        self.modified = true;
        matches.len()
    }
}
