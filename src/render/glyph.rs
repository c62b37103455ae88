//! Per-resource status glyphs.
use crate::error::RenderDefect;
use crate::resources::Resource;
use crate::status::StateCategory::{self, Deleted, Failure, InProgress, Success};
use colored::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Check,
    Cross,
    Ellipsis,
    Question,
    Dash,
}

impl Symbol {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Check => "+",
            Self::Cross => "!",
            Self::Ellipsis => ".",
            Self::Question => "?",
            Self::Dash => "-",
        }
    }
}

/// Background colour and symbol drawn for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub background: Color,
    pub symbol: Symbol,
}

const fn glyph(background: Color, symbol: Symbol) -> Option<Glyph> {
    Some(Glyph { background, symbol })
}

fn lookup(states: &[StateCategory]) -> Option<Glyph> {
    match states {
        [InProgress] => glyph(Color::Yellow, Symbol::Ellipsis),
        [Success] => glyph(Color::Green, Symbol::Check),
        [Failure] => glyph(Color::Red, Symbol::Cross),
        [Deleted] => glyph(Color::Green, Symbol::Dash),
        [Success | Deleted, InProgress] => glyph(Color::BrightWhite, Symbol::Ellipsis),
        [Failure, InProgress] => glyph(Color::Red, Symbol::Ellipsis),
        [Success | Failure | Deleted, Success] => glyph(Color::BrightWhite, Symbol::Check),
        [Success | Failure | Deleted, Failure] => glyph(Color::Red, Symbol::Question),
        [Success | Failure | Deleted, Deleted] => glyph(Color::BrightWhite, Symbol::Dash),
        _ => None,
    }
}

/// Glyph for a resource's state history. Histories outside the table are a
/// defect, never drawn with a guessed glyph.
pub fn for_resource(resource: &Resource) -> Result<Glyph, RenderDefect> {
    lookup(&resource.states).ok_or_else(|| RenderDefect {
        logical_resource_id: resource.logical_resource_id.clone(),
        states: resource.states.clone(),
    })
}
