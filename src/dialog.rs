#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    Open,
    SaveAs,
    Find,
    ReplaceFind,
    ReplaceWith { find: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

impl Prompt {
    pub fn new(kind: PromptKind, input: impl Into<String>) -> Self {
        Self { kind, input: input.into() }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            PromptKind::Open => "Open",
            PromptKind::SaveAs => "Save As",
            PromptKind::Find => "Find",
            PromptKind::ReplaceFind | PromptKind::ReplaceWith { .. } => "Replace",
        }
    }

    pub fn label(&self) -> &'static str {
        match self.kind {
            PromptKind::Open | PromptKind::SaveAs => "File path:",
            PromptKind::Find => "Text to find:",
            PromptKind::ReplaceFind => "Find:",
            PromptKind::ReplaceWith { .. } => "Replace with:",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

impl Message {
    pub fn title(&self) -> &'static str {
        match self.kind {
            MessageKind::Info => "Information",
            MessageKind::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Open,
    Save,
    SaveAs,
    LargerFont,
    SmallerFont,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 6] = [
        MenuItem::Open,
        MenuItem::Save,
        MenuItem::SaveAs,
        MenuItem::LargerFont,
        MenuItem::SmallerFont,
        MenuItem::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Open => "Open...      Ctrl+O",
            MenuItem::Save => "Save         Ctrl+S",
            MenuItem::SaveAs => "Save As...   F12",
            MenuItem::LargerFont => "Larger font  Alt+=",
            MenuItem::SmallerFont => "Smaller font Alt+-",
            MenuItem::Quit => "Quit         Ctrl+Q",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Prompt(Prompt),
    Message(Message),
    Menu { selected: usize },
}
