//! Config text output for whole trees.
//!
//! Leaves are written as `key=value`, value chains longer than one element
//! as `key=[v1, v2]`, empty arrays as `key=[]`, and nodes without a value as
//! `key {` ... `}` sections with their children indented one level.

mod writer;

use crate::arena::{NodeId, ValueData};
use crate::buffer::Buffer;
use crate::options::WriteOptions;
use crate::tree::ConfigTree;
use crate::Result;

use self::writer::Writer;

/// Write every top-level field of `tree` (the root's children).
///
/// # Examples
/// ```
/// use config_request::{encode, Arg, Buffer, ConfigTree, WriteOptions};
///
/// let mut tree = ConfigTree::new();
/// let root = tree.root();
/// tree.make_nodes(root, None, &[Arg::str("request=%s", "hello"), Arg::int("token=%d", 7)])?;
///
/// let mut buf = Buffer::new();
/// encode::write_tree(&tree, &mut buf, &WriteOptions::default())?;
/// assert_eq!(buf.as_str(), "request=\"hello\"\ntoken=7\n");
/// # Ok::<(), config_request::Error>(())
/// ```
pub fn write_tree(tree: &ConfigTree<'_>, out: &mut Buffer, options: &WriteOptions) -> Result<()> {
    let mut writer = Writer::new(out, options);
    for child in tree.children(tree.root()) {
        write_node_impl(&mut writer, tree, child, 0)?;
    }
    Ok(())
}

/// Write a single node (and its subtree) without its siblings.
pub fn write_node(
    tree: &ConfigTree<'_>,
    node: NodeId,
    out: &mut Buffer,
    options: &WriteOptions,
) -> Result<()> {
    tree.node_ref(node)?;
    let mut writer = Writer::new(out, options);
    write_node_impl(&mut writer, tree, node, 0)
}

pub fn to_string(tree: &ConfigTree<'_>) -> Result<String> {
    to_string_with_options(tree, &WriteOptions::default())
}

pub fn to_string_with_options(tree: &ConfigTree<'_>, options: &WriteOptions) -> Result<String> {
    let mut buf = Buffer::new();
    write_tree(tree, &mut buf, options)?;
    Ok(buf.into_string())
}

fn write_node_impl(
    writer: &mut Writer<'_>,
    tree: &ConfigTree<'_>,
    node: NodeId,
    depth: usize,
) -> Result<()> {
    writer.write_indent(depth);
    writer.write_str(tree.key(node).unwrap_or_default());

    if !tree.has_value(node) {
        writer.write_str(" {");
        writer.end_line()?;
        for child in tree.children(node) {
            write_node_impl(writer, tree, child, depth + 1)?;
        }
        writer.write_indent(depth);
        writer.write_str("}");
        return writer.end_line();
    }

    writer.write_str("=");
    let mut values = tree.values(node);
    match (values.next(), values.next()) {
        (Some(single), None) => writer.write_value(single),
        _ => {
            writer.write_str("[");
            let members = tree
                .values(node)
                .filter(|value| !matches!(value, ValueData::EmptyArray));
            for (index, value) in members.enumerate() {
                if index > 0 {
                    writer.write_str(", ");
                }
                writer.write_value(value);
            }
            writer.write_str("]");
        }
    }
    writer.end_line()
}
