//! `"key=<marker>"` tags of the tagged argument protocol.

use memchr::{memchr, memmem};

use crate::error::Error;
use crate::Result;

const INT_MARKERS: &[&str] = &["%d", "%ld", "%lld"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `%d` and its 64-bit spellings.
    Int,
    /// `%s`
    Str,
    /// `%t`, a whole tree spliced in as a section.
    Tree,
    /// `%b`, an optional pre-formatted block.
    Block,
}

impl Marker {
    pub fn as_str(self) -> &'static str {
        match self {
            Marker::Int => "%d",
            Marker::Str => "%s",
            Marker::Tree => "%t",
            Marker::Block => "%b",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'t> {
    raw: &'t str,
    eq: usize,
}

impl<'t> Tag<'t> {
    pub fn parse(raw: &'t str) -> Result<Self> {
        match memchr(b'=', raw.as_bytes()) {
            Some(eq) => Ok(Self { raw, eq }),
            None => {
                tracing::error!(tag = raw, "bad format string: missing '='");
                Err(Error::build("missing '=' separator").with_tag(raw))
            }
        }
    }

    pub fn raw(&self) -> &'t str {
        self.raw
    }

    /// Everything before `=`, untouched.
    pub fn prefix(&self) -> &'t str {
        &self.raw[..self.eq]
    }

    pub fn key(&self) -> &'t str {
        self.prefix().trim()
    }

    /// Everything after `=`, trimmed.
    pub fn format(&self) -> &'t str {
        self.raw[self.eq + 1..].trim()
    }

    /// The marker the format consists of exactly.
    pub fn exact_marker(&self) -> Option<Marker> {
        let format = self.format();
        if INT_MARKERS.iter().any(|marker| *marker == format) {
            return Some(Marker::Int);
        }
        match format {
            "%s" => Some(Marker::Str),
            "%t" => Some(Marker::Tree),
            "%b" => Some(Marker::Block),
            _ => None,
        }
    }

    /// The first marker found anywhere in the tag, checked as integer, string, block.
    pub fn embedded_marker(&self) -> Option<Marker> {
        let bytes = self.raw.as_bytes();
        let contains = |needle: &str| memmem::find(bytes, needle.as_bytes()).is_some();
        if INT_MARKERS.iter().any(|marker| contains(marker)) {
            Some(Marker::Int)
        } else if contains("%s") {
            Some(Marker::Str)
        } else if contains("%b") {
            Some(Marker::Block)
        } else {
            None
        }
    }
}
