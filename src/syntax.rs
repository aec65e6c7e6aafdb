use std::ops::Range;

use regex::Regex;

/// Lexical categories, listed in the order they are applied. When two
/// categories match the same text, the later one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxStyle {
    Keyword,
    String,
    Comment,
    Number,
    Operator,
    Bracket,
}

impl SyntaxStyle {
    pub const ALL: [SyntaxStyle; 6] = [
        SyntaxStyle::Keyword,
        SyntaxStyle::String,
        SyntaxStyle::Comment,
        SyntaxStyle::Number,
        SyntaxStyle::Operator,
        SyntaxStyle::Bracket,
    ];

    fn pattern(self) -> &'static str {
        match self {
            SyntaxStyle::Keyword => {
                r"\b(import|from|class|def|return|if|else|elif|while|for|in|try|except|with|as|pass|break|continue|lambda|yield|global|nonlocal|assert|async|await|True|False|None)\b"
            }
            SyntaxStyle::String => r#"(".*?"|'.*?')"#,
            SyntaxStyle::Comment => r"#.*",
            SyntaxStyle::Number => r"\b\d+\.?\d*\b",
            SyntaxStyle::Operator => r"[-+/*%=<>!&|^~]",
            SyntaxStyle::Bracket => r"[\[\]{}()]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    pub style: SyntaxStyle,
    pub range: Range<usize>,
}

pub struct Highlighter {
    patterns: Vec<(SyntaxStyle, Regex)>,
    spans: Vec<HighlightSpan>,
}

impl Highlighter {
    pub fn new() -> Result<Self, regex::Error> {
        let patterns = SyntaxStyle::ALL
            .iter()
            .map(|&style| Regex::new(style.pattern()).map(|re| (style, re)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns, spans: Vec::new() })
    }

    pub fn refresh(&mut self, text: &str) -> &[HighlightSpan] {
        self.spans.clear();
        for (style, re) in &self.patterns {
            self.spans.extend(re.find_iter(text).map(|m| HighlightSpan {
                style: *style,
                range: m.range(),
            }));
        }
        &self.spans
    }

    pub fn spans(&self) -> &[HighlightSpan] {
        &self.spans
    }

    /// Resolves the spans into one entry per byte of a `len`-byte text,
    /// applying them in order so later categories overwrite earlier ones.
    pub fn paint(&self, len: usize) -> Vec<Option<SyntaxStyle>> {
        let mut painted = vec![None; len];
        for span in &self.spans {
            let end = span.range.end.min(len);
            let start = span.range.start.min(end);
            painted[start..end].fill(Some(span.style));
        }
        painted
    }
}
