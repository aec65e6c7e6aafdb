use ratatui::style::{Color, Modifier, Style};

use crate::syntax::SyntaxStyle;

pub struct UiStyle {
    pub default: Style,
    pub status_bar_background: Color,
    pub status_bar_foreground: Color,
    pub line_number: Style,
    pub tree_selected: Style,
    pub tree_directory: Style,
    pub selection: Style,
    pub search_match: Style,
    pub dialog_border: Style,
    pub error_border: Style,
    pub keyword: Color,
    pub string: Color,
    pub comment: Color,
    pub number: Color,
    pub operator: Color,
    pub bracket: Color,
}

impl Default for UiStyle {
    fn default() -> Self {
        Self {
            default: Style::default().fg(Color::White).bg(Color::Black),
            status_bar_background: Color::DarkGray,
            status_bar_foreground: Color::White,
            line_number: Style::default().fg(Color::DarkGray),
            tree_selected: Style::default().bg(Color::DarkGray),
            tree_directory: Style::default().add_modifier(Modifier::BOLD),
            selection: Style::default().add_modifier(Modifier::REVERSED),
            search_match: Style::default().bg(Color::Yellow).fg(Color::Black),
            dialog_border: Style::default().fg(Color::Cyan),
            error_border: Style::default().fg(Color::Red),
            keyword: Color::Rgb(0xff, 0x7f, 0x50),
            string: Color::Rgb(0xda, 0xa5, 0x20),
            comment: Color::Rgb(0x7c, 0xfc, 0x00),
            number: Color::Rgb(0x87, 0xce, 0xeb),
            operator: Color::Rgb(0xf0, 0x80, 0x80),
            bracket: Color::Rgb(0xff, 0xa5, 0x00),
        }
    }
}

impl UiStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn syntax(&self, style: SyntaxStyle) -> Style {
        let color = match style {
            SyntaxStyle::Keyword => self.keyword,
            SyntaxStyle::String => self.string,
            SyntaxStyle::Comment => self.comment,
            SyntaxStyle::Number => self.number,
            SyntaxStyle::Operator => self.operator,
            SyntaxStyle::Bracket => self.bracket,
        };
        Style::default().fg(color)
    }
}
