use std::fmt;

/// Declared kind of a function argument, as advertised to the dispatcher.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ArgKind {
    Number,
    Text,
    Logical,
    /// A range reference or an array literal standing in for one.
    Range,
    Any,
}

impl ArgKind {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.trim().to_ascii_lowercase().as_str() {
            "number" => Self::Number,
            "text" => Self::Text,
            "logical" => Self::Logical,
            "range" | "reference" => Self::Range,
            "" | "_" | "any" => Self::Any,
            _ => return None,
        })
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Number => "number",
            Self::Text => "text",
            Self::Logical => "logical",
            Self::Range => "range",
            Self::Any => "any",
        })
    }
}
