//! Node builder: turns a tagged argument list into a run of sibling nodes.

use crate::args::Arg;
use crate::arena::NodeId;
use crate::error::Error;
use crate::options::{BuildMode, BuildOptions};
use crate::tag::{Marker, Tag};
use crate::tree::ConfigTree;
use crate::Result;

impl<'a> ConfigTree<'a> {
    /// Build one node per argument under `parent`, in argument order.
    ///
    /// The run is inserted after `pre_sib`, or after the last existing child
    /// when `pre_sib` is `None`. Returns the first node built, or `None` for an
    /// empty argument list. Nodes built before a failing tag stay in the tree;
    /// see [`make_nodes_with_options`](Self::make_nodes_with_options) for an
    /// all-or-nothing build.
    ///
    /// # Examples
    /// ```
    /// use config_request::{Arg, ConfigTree};
    ///
    /// let mut tree = ConfigTree::new();
    /// let root = tree.root();
    /// let first = tree
    ///     .make_nodes(root, None, &[Arg::int("size=%d", 100), Arg::str("name=%s", "vg0")])?
    ///     .unwrap();
    ///
    /// assert_eq!(tree.key(first), Some("size"));
    /// assert_eq!(tree.as_int(first), Some(100));
    /// let second = tree.next_sibling(first).unwrap();
    /// assert_eq!(tree.as_str(second), Some("vg0"));
    /// # Ok::<(), config_request::Error>(())
    /// ```
    pub fn make_nodes(
        &mut self,
        parent: NodeId,
        pre_sib: Option<NodeId>,
        args: &[Arg<'a>],
    ) -> Result<Option<NodeId>> {
        self.make_nodes_with_options(parent, pre_sib, args, &BuildOptions::default())
    }

    pub fn make_nodes_with_options(
        &mut self,
        parent: NodeId,
        pre_sib: Option<NodeId>,
        args: &[Arg<'a>],
        options: &BuildOptions,
    ) -> Result<Option<NodeId>> {
        match options.mode {
            BuildMode::Incremental => build_run(self, parent, pre_sib, args),
            BuildMode::Atomic => {
                let checkpoint = self.arena().checkpoint();
                let links = SavedLinks::capture(self, parent, pre_sib)?;
                build_run(self, parent, pre_sib, args).inspect_err(|_| {
                    tracing::debug!("rolling back partial build");
                    self.arena_mut().rollback(checkpoint);
                    links.restore(self);
                })
            }
        }
    }
}

fn build_run<'a>(
    tree: &mut ConfigTree<'a>,
    parent: NodeId,
    mut pre_sib: Option<NodeId>,
    args: &[Arg<'a>],
) -> Result<Option<NodeId>> {
    let mut first = None;

    for arg in args {
        let tag = Tag::parse(arg.tag())?;
        let key = tag.key();
        let node = match (tag.exact_marker(), *arg) {
            (Some(Marker::Int), Arg::Int(_, value)) => {
                tree.make_int_node(key, value, parent, pre_sib)?
            }
            (Some(Marker::Str), Arg::Str(_, value)) => {
                tree.make_text_node(key, value, parent, pre_sib)?
            }
            (Some(Marker::Tree), Arg::Tree(_, source)) => {
                let node = tree.clone_subtree(source, source.root())?;
                tree.rename(node, key)?;
                tree.chain_node(node, parent, pre_sib)?;
                node
            }
            (Some(marker @ (Marker::Int | Marker::Str | Marker::Tree)), other) => {
                tracing::error!(
                    tag = tag.raw(),
                    marker = marker.as_str(),
                    supplied = other.describe(),
                    "argument does not match its marker"
                );
                return Err(Error::build(format!(
                    "marker {} given a {} argument",
                    marker.as_str(),
                    other.describe()
                ))
                .with_tag(tag.raw()));
            }
            _ => {
                tracing::error!(tag = tag.raw(), format = tag.format(), "bad format string");
                return Err(
                    Error::build(format!("unsupported format '{}'", tag.format()))
                        .with_tag(tag.raw()),
                );
            }
        };

        tracing::debug!(key, node = node.index(), "built config node");
        first.get_or_insert(node);
        pre_sib = Some(node);
    }

    Ok(first)
}

/// The only links into pre-existing nodes that a build run writes.
struct SavedLinks {
    parent: NodeId,
    parent_child: Option<NodeId>,
    anchor: Option<(NodeId, Option<NodeId>)>,
}

impl SavedLinks {
    fn capture(tree: &ConfigTree<'_>, parent: NodeId, pre_sib: Option<NodeId>) -> Result<Self> {
        let parent_child = tree.node_ref(parent)?.child;
        let anchor = match pre_sib {
            Some(pre) => Some(pre),
            None => tree.children(parent).last(),
        };
        let anchor = match anchor {
            Some(node) => Some((node, tree.node_ref(node)?.sib)),
            None => None,
        };
        Ok(Self {
            parent,
            parent_child,
            anchor,
        })
    }

    fn restore(&self, tree: &mut ConfigTree<'_>) {
        if let Ok(parent) = tree.node_mut(self.parent) {
            parent.child = self.parent_child;
        }
        if let Some((node, sib)) = self.anchor {
            if let Ok(node) = tree.node_mut(node) {
                node.sib = sib;
            }
        }
    }
}
