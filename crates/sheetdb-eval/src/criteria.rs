//! Criteria conditions and the predicate matcher the database functions use.
//!
//! A criteria cell such as `">=12"`, `"Ap*"` or `"<>"` is parsed into a
//! [`Condition`] once and then tested against every candidate data cell.
//! The evaluator only talks to the [`CriteriaMatcher`] trait so hosts can plug
//! in their own comparison rules; [`ExcelCriteriaMatcher`] follows Excel.

use crate::coercion::parse_numeric_text;
use sheetdb_common::LiteralValue;
use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CriteriaOp {
    /// No operator was written; plain equality with Excel's loose rules.
    None,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CriteriaOp {
    /// Split a leading operator off `text`. Two-character operators win.
    pub fn split(text: &str) -> (Self, &str) {
        for (prefix, op) in [
            ("<=", Self::Le),
            (">=", Self::Ge),
            ("<>", Self::Ne),
            ("=", Self::Eq),
            ("<", Self::Lt),
            (">", Self::Gt),
        ] {
            if let Some(rest) = text.strip_prefix(prefix) {
                return (op, rest);
            }
        }
        (Self::None, text)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    fn accepts(self, ord: Ordering) -> bool {
        match self {
            Self::Lt => ord == Ordering::Less,
            Self::Le => ord != Ordering::Greater,
            Self::Gt => ord == Ordering::Greater,
            Self::Ge => ord != Ordering::Less,
            Self::None | Self::Eq => ord == Ordering::Equal,
            Self::Ne => ord != Ordering::Equal,
        }
    }
}

/// A parsed criteria predicate: operator plus typed operand.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub op: CriteriaOp,
    pub operand: LiteralValue,
}

impl Condition {
    pub fn new(op: CriteriaOp, operand: impl Into<LiteralValue>) -> Self {
        Self {
            op,
            operand: operand.into(),
        }
    }

    /// Operator-less text matches as a prefix in database criteria
    /// (`"Ap"` behaves like `"Ap*"`).
    pub fn with_prefix_wildcard(mut self) -> Self {
        if self.op == CriteriaOp::None
            && let LiteralValue::Text(s) = &mut self.operand
        {
            s.push('*');
        }
        self
    }
}

/// Knobs for [`ExcelCriteriaMatcher`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CriteriaConfig {
    /// Treat operator-less text criteria as "starts with".
    pub implicit_prefix_match: bool,
    /// Compare text (and wildcard patterns) case-sensitively.
    pub case_sensitive: bool,
}

impl Default for CriteriaConfig {
    fn default() -> Self {
        Self {
            implicit_prefix_match: true,
            case_sensitive: false,
        }
    }
}

/// Predicate matcher consumed by the criteria evaluator.
pub trait CriteriaMatcher: Send + Sync {
    fn parse(&self, text: &str) -> Condition;

    fn test(&self, value: &LiteralValue, cond: &Condition) -> bool;

    fn implicit_prefix_match(&self) -> bool {
        true
    }
}

/// Excel's criteria semantics: `= <> < <= > >=` operators, `*`/`?`
/// wildcards with `~` escapes, numbers compared numerically and text
/// compared case-insensitively.
#[derive(Clone, Debug, Default)]
pub struct ExcelCriteriaMatcher {
    config: CriteriaConfig,
}

impl ExcelCriteriaMatcher {
    pub fn new(config: CriteriaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CriteriaConfig {
        &self.config
    }

    fn fold<'s>(&self, s: &'s str) -> std::borrow::Cow<'s, str> {
        if self.config.case_sensitive {
            std::borrow::Cow::Borrowed(s)
        } else {
            std::borrow::Cow::Owned(s.to_lowercase())
        }
    }

    fn equals(&self, value: &LiteralValue, operand: &LiteralValue, loose: bool) -> bool {
        match operand {
            LiteralValue::Text(p) if p.is_empty() => match value {
                LiteralValue::Empty => true,
                LiteralValue::Text(s) => s.is_empty(),
                _ => false,
            },
            LiteralValue::Text(p) => match value {
                LiteralValue::Text(s) => wildcard_match(&self.fold(p), &self.fold(s)),
                _ => false,
            },
            LiteralValue::Number(n) => match value {
                LiteralValue::Number(_) | LiteralValue::Int(_) => value.as_number() == Some(*n),
                LiteralValue::Text(s) if loose => parse_numeric_text(s) == Some(*n),
                _ => false,
            },
            LiteralValue::Int(i) => self.equals(value, &LiteralValue::Number(*i as f64), loose),
            LiteralValue::Boolean(b) => matches!(value, LiteralValue::Boolean(v) if v == b),
            _ => false,
        }
    }

    fn compare(&self, value: &LiteralValue, operand: &LiteralValue) -> Option<Ordering> {
        match (value, operand) {
            (LiteralValue::Number(_) | LiteralValue::Int(_), LiteralValue::Number(_) | LiteralValue::Int(_)) => {
                value.as_number()?.partial_cmp(&operand.as_number()?)
            }
            (LiteralValue::Text(s), LiteralValue::Text(p)) => Some(self.fold(s).cmp(&self.fold(p))),
            (LiteralValue::Boolean(a), LiteralValue::Boolean(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl CriteriaMatcher for ExcelCriteriaMatcher {
    fn parse(&self, text: &str) -> Condition {
        let (op, rest) = CriteriaOp::split(text);
        let operand = if let Some(n) = parse_numeric_text(rest) {
            LiteralValue::Number(n)
        } else if rest.eq_ignore_ascii_case("TRUE") {
            LiteralValue::Boolean(true)
        } else if rest.eq_ignore_ascii_case("FALSE") {
            LiteralValue::Boolean(false)
        } else {
            LiteralValue::Text(rest.to_string())
        };
        Condition { op, operand }
    }

    fn test(&self, value: &LiteralValue, cond: &Condition) -> bool {
        match cond.op {
            CriteriaOp::None => self.equals(value, &cond.operand, true),
            CriteriaOp::Eq => self.equals(value, &cond.operand, false),
            CriteriaOp::Ne => !self.equals(value, &cond.operand, false),
            op => self
                .compare(value, &cond.operand)
                .is_some_and(|ord| op.accepts(ord)),
        }
    }

    fn implicit_prefix_match(&self) -> bool {
        self.config.implicit_prefix_match
    }
}

/// Excel-style wildcard matcher: `*` any run, `?` any single character,
/// `~` escapes the next character. Callers fold case beforehand.
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Token {
        AnySeq,
        AnyChar,
        Lit(char),
    }
    let mut tokens: Vec<Token> = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        let tok = match c {
            '~' => match chars.next() {
                Some(escaped) => Token::Lit(escaped),
                None => Token::Lit('~'),
            },
            '*' => Token::AnySeq,
            '?' => Token::AnyChar,
            other => Token::Lit(other),
        };
        // collapse consecutive *
        if tok == Token::AnySeq && tokens.last() == Some(&Token::AnySeq) {
            continue;
        }
        tokens.push(tok);
    }

    let text: Vec<char> = text.chars().collect();
    let (mut ti, mut si) = (0usize, 0usize);
    let mut backtrack: Option<(usize, usize)> = None;
    loop {
        if ti == tokens.len() && si == text.len() {
            return true;
        }
        let step = match tokens.get(ti) {
            Some(Token::AnySeq) => {
                backtrack = Some((ti, si));
                ti += 1;
                continue;
            }
            Some(Token::AnyChar) => si < text.len(),
            Some(Token::Lit(l)) => text.get(si) == Some(l),
            None => false,
        };
        if step {
            ti += 1;
            si += 1;
            continue;
        }
        match backtrack {
            Some((star, from)) if from < text.len() => {
                backtrack = Some((star, from + 1));
                ti = star + 1;
                si = from + 1;
            }
            _ => return false,
        }
    }
}
