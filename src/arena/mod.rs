use std::borrow::Cow;

use smol_str::SmolStr;

use crate::error::Error;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub(crate) usize);

impl ValueId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Int,
    EmptyArray,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueData<'a> {
    String(Cow<'a, str>),
    Int(i64),
    EmptyArray,
}

impl<'a> ValueData<'a> {
    pub fn kind(&self) -> ValueKind {
        match self {
            ValueData::String(_) => ValueKind::String,
            ValueData::Int(_) => ValueKind::Int,
            ValueData::EmptyArray => ValueKind::EmptyArray,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ValueData::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ValueData::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Re-borrow data owned by a longer-lived tree. Borrowed text stays borrowed.
    pub(crate) fn rebind<'b>(&self) -> ValueData<'b>
    where
        'a: 'b,
    {
        match self {
            ValueData::String(Cow::Borrowed(text)) => ValueData::String(Cow::Borrowed(*text)),
            ValueData::String(Cow::Owned(text)) => ValueData::String(Cow::Owned(text.clone())),
            ValueData::Int(value) => ValueData::Int(*value),
            ValueData::EmptyArray => ValueData::EmptyArray,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub key: SmolStr,
    pub parent: Option<NodeId>,
    pub child: Option<NodeId>,
    pub sib: Option<NodeId>,
    pub value: Option<ValueId>,
}

impl Node {
    pub(crate) fn detached(key: SmolStr) -> Self {
        Self {
            key,
            parent: None,
            child: None,
            sib: None,
            value: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Value<'a> {
    pub data: ValueData<'a>,
    pub next: Option<ValueId>,
}

/// Arena length snapshot taken before a staged mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    nodes: usize,
    values: usize,
}

/// Append-only storage for nodes and values. Nothing is freed individually;
/// the whole arena goes away with its tree.
#[derive(Debug, Clone, Default)]
pub struct Arena<'a> {
    nodes: Vec<Node>,
    values: Vec<Value<'a>>,
    node_limit: Option<usize>,
}

impl<'a> Arena<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node_limit(limit: Option<usize>) -> Self {
        Self {
            node_limit: limit,
            ..Self::default()
        }
    }

    /// Arena holding a single keyless root node at index 0.
    pub fn with_root(limit: Option<usize>) -> Self {
        Self {
            nodes: vec![Node::detached(SmolStr::default())],
            values: Vec::new(),
            node_limit: limit,
        }
    }

    pub fn alloc_node(&mut self, key: impl Into<SmolStr>) -> Result<NodeId> {
        if let Some(limit) = self.node_limit {
            if self.nodes.len() >= limit {
                tracing::error!(limit, "config node arena exhausted");
                return Err(Error::allocation(format!(
                    "node arena limit of {limit} reached"
                )));
            }
        }
        self.nodes.try_reserve(1)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::detached(key.into()));
        Ok(id)
    }

    pub fn alloc_value(&mut self, data: ValueData<'a>) -> Result<ValueId> {
        self.values.try_reserve(1)?;
        let id = ValueId(self.values.len());
        self.values.push(Value { data, next: None });
        Ok(id)
    }

    pub fn dup_str(&self, text: &str) -> SmolStr {
        SmolStr::new(text)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn value(&self, id: ValueId) -> Option<&Value<'a>> {
        self.values.get(id.0)
    }

    pub fn value_mut(&mut self, id: ValueId) -> Option<&mut Value<'a>> {
        self.values.get_mut(id.0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            nodes: self.nodes.len(),
            values: self.values.len(),
        }
    }

    /// Drop everything allocated after `checkpoint`. Links from older nodes
    /// into the dropped range must be restored by the caller.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.nodes.truncate(checkpoint.nodes);
        self.values.truncate(checkpoint.values);
    }
}
