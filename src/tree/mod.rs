//! Config tree: nodes linked by parent/child/sibling handles over an [`Arena`].
//!
//! A tree always has a root node with an empty key. Request fields hang off
//! the root; a nested section is a node with children and no values.

mod flags;

use std::borrow::Cow;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::arena::{Arena, Node, NodeId, ValueData, ValueId, ValueKind};
use crate::error::Error;
use crate::options::TreeOptions;
use crate::Result;

#[derive(Debug, Clone)]
pub struct ConfigTree<'a> {
    arena: Arena<'a>,
    root: NodeId,
}

impl<'a> Default for ConfigTree<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ConfigTree<'a> {
    pub fn new() -> Self {
        Self::with_options(&TreeOptions::default())
    }

    /// The root counts against `node_limit`.
    pub fn with_options(options: &TreeOptions) -> Self {
        Self {
            arena: Arena::with_root(options.node_limit),
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn arena(&self) -> &Arena<'a> {
        &self.arena
    }

    pub(crate) fn arena_mut(&mut self) -> &mut Arena<'a> {
        &mut self.arena
    }

    pub fn node_count(&self) -> usize {
        self.arena.node_count()
    }

    pub(crate) fn node_ref(&self, id: NodeId) -> Result<&Node> {
        self.arena
            .node(id)
            .ok_or_else(|| Error::lookup(format!("node {} is not part of this tree", id.0)))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.arena
            .node_mut(id)
            .ok_or_else(|| Error::lookup(format!("node {} is not part of this tree", id.0)))
    }

    pub(crate) fn value_mut(&mut self, id: ValueId) -> Result<&mut crate::arena::Value<'a>> {
        self.arena
            .value_mut(id)
            .ok_or_else(|| Error::lookup(format!("value {} is not part of this tree", id.0)))
    }

    pub fn key(&self, id: NodeId) -> Option<&str> {
        self.arena.node(id).map(|node| node.key.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.node(id)?.parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.arena.node(id)?.child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena.node(id)?.sib
    }

    pub fn children(&self, id: NodeId) -> Children<'_, 'a> {
        Children {
            tree: self,
            next: self.first_child(id),
        }
    }

    pub fn values(&self, id: NodeId) -> Values<'_, 'a> {
        Values {
            tree: self,
            next: self.arena.node(id).and_then(|node| node.value),
        }
    }

    /// Head of the node's value chain.
    pub fn value(&self, id: NodeId) -> Option<&ValueData<'a>> {
        self.values(id).next()
    }

    pub fn value_kind(&self, id: NodeId) -> Option<ValueKind> {
        self.value(id).map(ValueData::kind)
    }

    pub fn has_value(&self, id: NodeId) -> bool {
        self.arena.node(id).is_some_and(|node| node.value.is_some())
    }

    pub fn as_int(&self, id: NodeId) -> Option<i64> {
        self.value(id)?.as_int()
    }

    pub fn as_str(&self, id: NodeId) -> Option<&str> {
        self.value(id)?.as_str()
    }

    pub fn is_empty_array(&self, id: NodeId) -> bool {
        matches!(self.value(id), Some(ValueData::EmptyArray))
    }

    /// String members of the flag field `field` under `parent`, head first.
    pub fn flags(&self, parent: NodeId, field: &str) -> Vec<&str> {
        match self.find_child(parent, field) {
            Some(node) => self.values(node).filter_map(ValueData::as_str).collect(),
            None => Vec::new(),
        }
    }

    /// Allocate a node that is not linked anywhere yet.
    pub fn create_node(&mut self, key: &str) -> Result<NodeId> {
        let key = self.arena.dup_str(key);
        self.arena.alloc_node(key)
    }

    pub fn create_value(&mut self, data: ValueData<'a>) -> Result<ValueId> {
        self.arena.alloc_value(data)
    }

    /// Link `node` under `parent`. Without `pre_sib` the node goes after the
    /// last existing child; otherwise it is inserted right after `pre_sib`.
    pub fn chain_node(
        &mut self,
        node: NodeId,
        parent: NodeId,
        pre_sib: Option<NodeId>,
    ) -> Result<()> {
        {
            let cn = self.node_mut(node)?;
            cn.parent = Some(parent);
            cn.sib = None;
        }

        let first = self.node_ref(parent)?.child;
        let mut pre_sib = pre_sib;
        if let (Some(first), None) = (first, pre_sib) {
            let mut last = first;
            while let Some(next) = self.node_ref(last)?.sib {
                last = next;
            }
            pre_sib = Some(last);
        }

        if first.is_none() {
            self.node_mut(parent)?.child = Some(node);
        }
        if let Some(pre) = pre_sib {
            let after = self.node_ref(pre)?.sib;
            self.node_mut(node)?.sib = after;
            self.node_mut(pre)?.sib = Some(node);
        }
        Ok(())
    }

    pub fn make_config_node(
        &mut self,
        key: &str,
        parent: NodeId,
        pre_sib: Option<NodeId>,
    ) -> Result<NodeId> {
        let node = self.create_node(key)?;
        self.chain_node(node, parent, pre_sib)?;
        Ok(node)
    }

    pub fn make_text_node(
        &mut self,
        key: &str,
        value: impl Into<Cow<'a, str>>,
        parent: NodeId,
        pre_sib: Option<NodeId>,
    ) -> Result<NodeId> {
        let node = self.make_config_node(key, parent, pre_sib)?;
        let value = self.create_value(ValueData::String(value.into()))?;
        self.node_mut(node)?.value = Some(value);
        Ok(node)
    }

    pub fn make_int_node(
        &mut self,
        key: &str,
        value: i64,
        parent: NodeId,
        pre_sib: Option<NodeId>,
    ) -> Result<NodeId> {
        let node = self.make_config_node(key, parent, pre_sib)?;
        let value = self.create_value(ValueData::Int(value))?;
        self.node_mut(node)?.value = Some(value);
        Ok(node)
    }

    /// First direct child of `parent` named `key`.
    pub fn find_child(&self, parent: NodeId, key: &str) -> Option<NodeId> {
        self.children(parent)
            .find(|&child| self.key(child) == Some(key))
    }

    /// Resolve a `/`-separated path relative to `start`. Empty segments are skipped.
    ///
    /// # Examples
    /// ```
    /// use config_request::ConfigTree;
    ///
    /// let mut tree = ConfigTree::new();
    /// let root = tree.root();
    /// let vg = tree.make_config_node("vg", root, None)?;
    /// tree.make_text_node("name", "vg0", vg, None)?;
    ///
    /// let name = tree.find_node(root, "vg/name").unwrap();
    /// assert_eq!(tree.as_str(name), Some("vg0"));
    /// # Ok::<(), config_request::Error>(())
    /// ```
    pub fn find_node(&self, start: NodeId, path: &str) -> Option<NodeId> {
        let mut current = start;
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            current = self.find_child(current, segment)?;
        }
        Some(current)
    }

    /// Deep-copy `node` of `src` (values and all descendants) into this tree.
    /// The copy is detached; its own siblings are never copied.
    pub fn clone_subtree<'b>(&mut self, src: &ConfigTree<'b>, node: NodeId) -> Result<NodeId>
    where
        'b: 'a,
    {
        self.clone_node(src, node, None)
    }

    fn clone_node<'b>(
        &mut self,
        src: &ConfigTree<'b>,
        node: NodeId,
        parent: Option<NodeId>,
    ) -> Result<NodeId>
    where
        'b: 'a,
    {
        let source = src.node_ref(node)?;
        let copy = self.arena.alloc_node(source.key.clone())?;
        self.node_mut(copy)?.parent = parent;

        let mut last_value: Option<ValueId> = None;
        for data in src.values(node) {
            let value = self.arena.alloc_value(data.rebind())?;
            match last_value {
                Some(prev) => self.value_mut(prev)?.next = Some(value),
                None => self.node_mut(copy)?.value = Some(value),
            }
            last_value = Some(value);
        }

        let mut last_child: Option<NodeId> = None;
        for child in src.children(node) {
            let child_copy = self.clone_node(src, child, Some(copy))?;
            match last_child {
                Some(prev) => self.node_mut(prev)?.sib = Some(child_copy),
                None => self.node_mut(copy)?.child = Some(child_copy),
            }
            last_child = Some(child_copy);
        }

        Ok(copy)
    }

    pub(crate) fn rename(&mut self, node: NodeId, key: &str) -> Result<()> {
        let key = self.arena.dup_str(key);
        self.node_mut(node)?.key = key;
        Ok(())
    }

    /// JSON-friendly view of one node, for diagnostics.
    pub fn view(&self, node: NodeId) -> NodeView<'_, 'a> {
        NodeView { tree: self, node }
    }
}

pub struct Children<'t, 'a> {
    tree: &'t ConfigTree<'a>,
    next: Option<NodeId>,
}

impl<'t, 'a> Iterator for Children<'t, 'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.next_sibling(current);
        Some(current)
    }
}

pub struct Values<'t, 'a> {
    tree: &'t ConfigTree<'a>,
    next: Option<ValueId>,
}

impl<'t, 'a> Iterator for Values<'t, 'a> {
    type Item = &'t ValueData<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.tree.arena.value(self.next?)?;
        self.next = value.next;
        Some(&value.data)
    }
}

pub struct NodeView<'t, 'a> {
    tree: &'t ConfigTree<'a>,
    node: NodeId,
}

struct ValueView<'t, 'a>(&'t ValueData<'a>);

impl Serialize for ValueView<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            ValueData::String(text) => serializer.serialize_str(text),
            ValueData::Int(value) => serializer.serialize_i64(*value),
            ValueData::EmptyArray => serializer.serialize_seq(Some(0))?.end(),
        }
    }
}

impl Serialize for NodeView<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let tree = self.tree;
        if tree.has_value(self.node) {
            let mut values = tree.values(self.node);
            let head = values.next();
            return match (head, values.next()) {
                (Some(ValueData::EmptyArray), _) => serializer.serialize_seq(Some(0))?.end(),
                (Some(single), None) => ValueView(single).serialize(serializer),
                _ => {
                    let mut seq = serializer.serialize_seq(None)?;
                    for data in tree.values(self.node) {
                        seq.serialize_element(&ValueView(data))?;
                    }
                    seq.end()
                }
            };
        }

        let mut map = serializer.serialize_map(None)?;
        for child in tree.children(self.node) {
            map.serialize_entry(tree.key(child).unwrap_or_default(), &tree.view(child))?;
        }
        map.end()
    }
}

impl Serialize for ConfigTree<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.view(self.root).serialize(serializer)
    }
}
