pub mod style;

use std::ops::Range;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap},
    Frame,
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::dialog::{Dialog, MenuItem, MessageKind};
use crate::editor::Editor;
use crate::mode::Mode;

const KEY_HINTS: &str =
    " ^O open  ^S save  F12 save as  ^Q quit  F10 menu  ^F find  ^R replace  ^K delete line  Alt+=/- font  Tab/Esc switch pane";

pub struct PaneLayout {
    pub tree: Rect,
    pub separator: Rect,
    pub text: Rect,
    pub status: Rect,
    pub hints: Rect,
}

fn in_ranges(ranges: &[Range<usize>], offset: usize) -> bool {
    ranges.iter().any(|r| r.contains(&offset))
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

impl Editor {
    pub fn layout(&self, area: Rect) -> PaneLayout {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1), Constraint::Length(1)])
            .split(area);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(self.tree_width),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(rows[0]);
        PaneLayout {
            tree: columns[0],
            separator: columns[1],
            text: columns[2],
            status: rows[1],
            hints: rows[2],
        }
    }

    pub fn draw_tree_view(&self, f: &mut Frame, area: Rect) {
        let tree_block = Block::default()
            .title("Files")
            .padding(Padding::horizontal(1));
        let inner_area = tree_block.inner(area);
        let mut lines = Vec::new();

        for (i, row) in self.tree_rows.iter().enumerate().skip(self.tree_scroll_pos) {
            if i >= self.tree_scroll_pos + inner_area.height as usize {
                break;
            }
            let indicator = match (row.is_directory, row.expanded) {
                (true, true) => "[-]",
                (true, false) => "[+]",
                (false, _) => "   ",
            };
            let indent = "  ".repeat(row.depth);
            let mut line = Line::from(format!("{indent}{indicator}{}", row.label));
            if row.is_directory {
                line = line.style(self.style.tree_directory);
            }
            if i == self.selected_item_index && self.mode == Mode::Tree {
                line = line.patch_style(self.style.tree_selected);
            }
            lines.push(line);
        }
        let paragraph = Paragraph::new(lines).block(tree_block);
        f.render_widget(paragraph, area);
    }

    fn draw_text_view(&self, f: &mut Frame, area: Rect) {
        let gutter = self.gutter_width();
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(gutter), Constraint::Min(0)])
            .split(area);

        let text = self.buffer.text();
        let painted = self.highlighter.paint(text.len());
        let selection: Vec<Range<usize>> = self.buffer.selection().into_iter().collect();

        let mut numbers = Vec::new();
        let mut content = Vec::new();
        for (row, (line_start, line)) in self
            .buffer
            .lines()
            .enumerate()
            .skip(self.buffer.top_row)
            .take(area.height as usize)
        {
            let number = format!("{:>width$} ", row + 1, width = gutter as usize - 1);
            numbers.push(Line::from(Span::styled(number, self.style.line_number)));

            let mut spans: Vec<Span> = Vec::new();
            let mut run = String::new();
            let mut run_style = Style::default();
            for (i, grapheme) in line.grapheme_indices(true) {
                let offset = line_start + i;
                let mut style = painted[offset]
                    .map(|s| self.style.syntax(s))
                    .unwrap_or_default();
                if in_ranges(&self.search_matches, offset) {
                    style = style.patch(self.style.search_match);
                }
                if in_ranges(&selection, offset) {
                    style = style.patch(self.style.selection);
                }
                if style != run_style && !run.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut run), run_style));
                }
                run_style = style;
                run.push_str(grapheme);
            }
            if !run.is_empty() {
                spans.push(Span::styled(run, run_style));
            }
            content.push(Line::from(spans));
        }

        f.render_widget(Paragraph::new(numbers), chunks[0]);
        f.render_widget(
            Paragraph::new(content).scroll((0, self.scroll_offset_col as u16)),
            chunks[1],
        );

        if self.mode == Mode::Insert && self.dialog.is_none() {
            let (row, col) = self.buffer.cursor_position();
            let pre_cursor_text: String = self
                .buffer
                .lines()
                .nth(row)
                .map(|(_, line)| line.graphemes(true).take(col).collect())
                .unwrap_or_default();
            let pre_cursor_width = UnicodeWidthStr::width(pre_cursor_text.as_str());
            let cursor_x = chunks[1].x
                + (pre_cursor_width as u16).saturating_sub(self.scroll_offset_col as u16);
            let cursor_y = area.y + (row as u16).saturating_sub(self.buffer.top_row as u16);
            f.set_cursor(cursor_x, cursor_y);
        }
    }

    fn draw_status_bar(&self, f: &mut Frame, panes: &PaneLayout) {
        let filename = self
            .buffer
            .filename
            .as_ref()
            .map_or("[No Name]".to_string(), |p| p.display().to_string());
        let modified_str = if self.buffer.modified { "[+]" } else { "" };
        let status_left = format!("-- {} -- {} {}", self.mode_str(), filename, modified_str);
        let (row, col) = self.buffer.cursor_position();
        let status_right = format!("font {}  {}:{} ", self.font_size, row + 1, col + 1);
        let padding = (panes.status.width as usize)
            .saturating_sub(status_left.width() + status_right.width());

        let status_bar = Paragraph::new(Line::from(vec![
            Span::raw(status_left),
            Span::raw(" ".repeat(padding)),
            Span::raw(status_right),
        ]))
        .style(
            Style::default()
                .fg(self.style.status_bar_foreground)
                .bg(self.style.status_bar_background),
        );
        f.render_widget(status_bar, panes.status);
        f.render_widget(Paragraph::new(KEY_HINTS).style(self.style.line_number), panes.hints);
    }

    fn draw_dialog(&self, f: &mut Frame, area: Rect) {
        let Some(dialog) = &self.dialog else {
            return;
        };
        match dialog {
            Dialog::Prompt(prompt) => {
                let rect = centered_rect(60, 5, area);
                let block = Block::default()
                    .title(prompt.title())
                    .borders(Borders::ALL)
                    .border_style(self.style.dialog_border);
                let inner = block.inner(rect);
                let body = Paragraph::new(vec![
                    Line::from(prompt.label()),
                    Line::from(prompt.input.as_str()),
                ])
                .block(block);
                f.render_widget(Clear, rect);
                f.render_widget(body, rect);

                let input_width = prompt.input.width() as u16;
                let cursor_x = (inner.x + input_width).min(inner.right().saturating_sub(1));
                f.set_cursor(cursor_x, inner.y + 1);
            }
            Dialog::Message(message) => {
                let rect = centered_rect(60, 7, area);
                let border_style = match message.kind {
                    MessageKind::Info => self.style.dialog_border,
                    MessageKind::Error => self.style.error_border,
                };
                let block = Block::default()
                    .title(message.title())
                    .borders(Borders::ALL)
                    .border_style(border_style);
                let body = Paragraph::new(vec![
                    Line::from(message.text.as_str()),
                    Line::from(""),
                    Line::from(Span::styled("press any key", self.style.line_number)),
                ])
                .wrap(Wrap { trim: true })
                .block(block);
                f.render_widget(Clear, rect);
                f.render_widget(body, rect);
            }
            Dialog::Menu { selected } => {
                let rect = Rect::new(area.x, area.y, 26, MenuItem::ALL.len() as u16 + 2)
                    .intersection(area);
                let lines: Vec<Line> = MenuItem::ALL
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let line = Line::from(item.label());
                        if i == *selected {
                            line.style(self.style.tree_selected)
                        } else {
                            line
                        }
                    })
                    .collect();
                let block = Block::default()
                    .title("File")
                    .borders(Borders::ALL)
                    .border_style(self.style.dialog_border);
                f.render_widget(Clear, rect);
                f.render_widget(Paragraph::new(lines).block(block), rect);
            }
        }
    }

    pub fn ui(&self, f: &mut Frame) {
        let panes = self.layout(f.size());

        self.draw_tree_view(f, panes.tree);
        let separator_area = panes.separator;
        for y in separator_area.y..separator_area.bottom() {
            f.buffer_mut().get_mut(separator_area.x, y).set_symbol("│");
        }

        self.draw_text_view(f, panes.text);
        self.draw_status_bar(f, &panes);
        self.draw_dialog(f, f.size());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::Clipboard;
    use crate::config::Config;
    use ratatui::{backend::TestBackend, Terminal};
    use std::fs;
    use tempfile::tempdir;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer.get(x, y).symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn renders_tree_text_and_status() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        let file = dir.path().join("hello.py");
        fs::write(&file, "print('hi')\n").unwrap();

        let config = Config {
            root: Some(dir.path().to_path_buf()),
            file: Some(file.clone()),
            ..Config::default()
        };
        let editor = Editor::new(&config, Clipboard::in_memory()).unwrap();

        let mut terminal = Terminal::new(TestBackend::new(100, 12)).unwrap();
        terminal.draw(|f| editor.ui(f)).unwrap();
        let screen = screen_text(&terminal);

        assert!(screen.contains("Files"));
        assert!(screen.contains("[+]src"));
        assert!(screen.contains("hello.py"));
        assert!(screen.contains("print('hi')"));
        assert!(screen.contains("font 12"));
    }

    #[test]
    fn renders_message_dialog() {
        let dir = tempdir().unwrap();
        let config = Config { root: Some(dir.path().to_path_buf()), ..Config::default() };
        let mut editor = Editor::new(&config, Clipboard::in_memory()).unwrap();
        editor.show_message(MessageKind::Error, "Cannot open file: nope");

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| editor.ui(f)).unwrap();
        let screen = screen_text(&terminal);
        assert!(screen.contains("Error"));
        assert!(screen.contains("Cannot open file: nope"));
    }
}
