use crate::tag::Marker;
use crate::tree::ConfigTree;

/// One entry of a tagged argument list: the tag text plus the value its
/// marker calls for.
///
/// The variant must agree with the tag's marker; a disagreement is reported
/// as a build error instead of being reinterpreted.
#[derive(Debug, Clone, Copy)]
pub enum Arg<'a> {
    Int(&'a str, i64),
    Str(&'a str, &'a str),
    Tree(&'a str, &'a ConfigTree<'a>),
    Block(&'a str, Option<&'a str>),
    /// A tag emitted as-is; only meaningful to the buffer formatter.
    Text(&'a str),
}

impl<'a> Arg<'a> {
    pub fn int(tag: &'a str, value: i64) -> Self {
        Arg::Int(tag, value)
    }

    pub fn str(tag: &'a str, value: &'a str) -> Self {
        Arg::Str(tag, value)
    }

    pub fn tree(tag: &'a str, tree: &'a ConfigTree<'a>) -> Self {
        Arg::Tree(tag, tree)
    }

    pub fn block(tag: &'a str, block: Option<&'a str>) -> Self {
        Arg::Block(tag, block)
    }

    pub fn text(tag: &'a str) -> Self {
        Arg::Text(tag)
    }

    pub fn tag(&self) -> &'a str {
        match *self {
            Arg::Int(tag, _)
            | Arg::Str(tag, _)
            | Arg::Tree(tag, _)
            | Arg::Block(tag, _)
            | Arg::Text(tag) => tag,
        }
    }

    /// The marker this value satisfies, `None` for plain text.
    pub fn supplies(&self) -> Option<Marker> {
        match self {
            Arg::Int(..) => Some(Marker::Int),
            Arg::Str(..) => Some(Marker::Str),
            Arg::Tree(..) => Some(Marker::Tree),
            Arg::Block(..) => Some(Marker::Block),
            Arg::Text(_) => None,
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self.supplies() {
            Some(marker) => marker.as_str(),
            None => "text",
        }
    }
}
