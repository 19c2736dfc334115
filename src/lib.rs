//! Request payload construction for a config-speaking daemon.
//!
//! Two outputs share one tagged argument convention (`"key=%d"`, `"key=%s"`,
//! `"key=%t"`, `"key=%b"` followed by the matching value):
//!
//! - [`ConfigTree::make_nodes`] builds sibling nodes of a [`ConfigTree`],
//! - [`Buffer::append_args`] writes flat `key= value` lines into a [`Buffer`].
//!
//! Array fields are edited in place with [`ConfigTree::set_flag`], and whole
//! trees are rendered as config text by [`encode::write_tree`].

pub mod arena;
pub mod args;
pub mod buffer;
pub mod build;
pub mod constants;
pub mod encode;
pub mod error;
pub mod format;
pub mod options;
pub mod resize;
pub mod tag;
pub mod tree;

pub use crate::arena::{NodeId, ValueData, ValueId, ValueKind};
pub use crate::args::Arg;
pub use crate::buffer::Buffer;
pub use crate::error::{Error, ErrorKind};
pub use crate::options::{
    BufferOptions, BuildMode, BuildOptions, Indent, TreeOptions, WriteOptions,
};
pub use crate::resize::{FsInfo, FsMode, HelperAction, HelperCommand};
pub use crate::tag::{Marker, Tag};
pub use crate::tree::ConfigTree;

pub type Result<T> = std::result::Result<T, Error>;

/// Format a tagged argument list as flat text.
///
/// # Examples
/// ```
/// use config_request::Arg;
///
/// let text = config_request::to_text(&[Arg::int("size=%d", 100), Arg::str("label=%s", "x")])?;
/// assert_eq!(text, "size= 100\nlabel= \"x\"\n");
/// # Ok::<(), config_request::Error>(())
/// ```
pub fn to_text(args: &[Arg<'_>]) -> Result<String> {
    let mut buf = Buffer::new();
    buf.append_args(args)?;
    Ok(buf.into_string())
}

/// Build a fresh tree whose root holds one node per argument.
pub fn to_tree<'a>(args: &[Arg<'a>]) -> Result<ConfigTree<'a>> {
    let mut tree = ConfigTree::new();
    let root = tree.root();
    tree.make_nodes(root, None, args)?;
    Ok(tree)
}

/// Build a tree from `args` and render it as config text.
pub fn to_config_string(args: &[Arg<'_>]) -> Result<String> {
    encode::to_string(&to_tree(args)?)
}

/// JSON view of a tree, for diagnostics.
pub fn to_json(tree: &ConfigTree<'_>) -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(tree)
}
