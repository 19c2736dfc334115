use std::borrow::Cow;

use crate::arena::{NodeId, ValueData, ValueId};
use crate::tree::ConfigTree;
use crate::Result;

impl<'a> ConfigTree<'a> {
    /// Make `flag` a member of the array field `field` under `parent` iff `want`.
    ///
    /// A missing field is created on demand and becomes the *first* child of
    /// `parent`, and new flags go to the *front* of the chain. Removing the
    /// last member leaves the field in place as an empty array.
    ///
    /// # Examples
    /// ```
    /// use config_request::ConfigTree;
    ///
    /// let mut tree = ConfigTree::new();
    /// let root = tree.root();
    /// tree.set_flag(root, "status", "READ", true)?;
    /// tree.set_flag(root, "status", "WRITE", true)?;
    /// assert_eq!(tree.flags(root, "status"), ["WRITE", "READ"]);
    ///
    /// tree.set_flag(root, "status", "READ", false)?;
    /// assert_eq!(tree.flags(root, "status"), ["WRITE"]);
    /// # Ok::<(), config_request::Error>(())
    /// ```
    pub fn set_flag(
        &mut self,
        parent: NodeId,
        field: &str,
        flag: impl Into<Cow<'a, str>>,
        want: bool,
    ) -> Result<()> {
        let flag = flag.into();
        self.node_ref(parent)?;
        let node = self.find_child(parent, field);

        let mut pred: Option<ValueId> = None;
        let mut found: Option<ValueId> = None;
        if let Some(node) = node {
            let mut cursor = self.node_ref(node)?.value;
            while let Some(id) = cursor {
                let Some(value) = self.arena().value(id) else {
                    break;
                };
                if value.data.as_str() == Some(flag.as_ref()) {
                    found = Some(id);
                    break;
                }
                pred = Some(id);
                cursor = value.next;
            }
        }

        match (found, node, want) {
            (Some(_), _, true) | (None, _, false) | (Some(_), None, false) => Ok(()),
            (Some(value), Some(node), false) => {
                tracing::debug!(field, flag = %flag, "removing flag");
                self.unlink_value(node, pred, value)
            }
            (None, node, true) => {
                tracing::debug!(field, flag = %flag, "adding flag");
                let node = match node {
                    Some(node) => node,
                    None => self.prepend_array_field(parent, field)?,
                };
                self.prepend_value(node, ValueData::String(flag))
            }
        }
    }

    fn unlink_value(&mut self, node: NodeId, pred: Option<ValueId>, value: ValueId) -> Result<()> {
        let next = self.value_mut(value)?.next;
        match (pred, next) {
            (Some(pred), _) => self.value_mut(pred)?.next = next,
            (None, Some(next)) => self.node_mut(node)?.value = Some(next),
            // sole member: the chain stays array-typed
            (None, None) => self.value_mut(value)?.data = ValueData::EmptyArray,
        }
        Ok(())
    }

    fn prepend_array_field(&mut self, parent: NodeId, field: &str) -> Result<NodeId> {
        let node = self.create_node(field)?;
        let marker = self.create_value(ValueData::EmptyArray)?;
        let first = self.node_ref(parent)?.child;
        {
            let created = self.node_mut(node)?;
            created.value = Some(marker);
            created.parent = Some(parent);
            created.sib = first;
        }
        self.node_mut(parent)?.child = Some(node);
        Ok(node)
    }

    fn prepend_value(&mut self, node: NodeId, data: ValueData<'a>) -> Result<()> {
        let head = self.node_ref(node)?.value;
        if let Some(head) = head {
            let slot = self.value_mut(head)?;
            if matches!(slot.data, ValueData::EmptyArray) {
                slot.data = data;
                slot.next = None;
                return Ok(());
            }
        }
        let value = self.create_value(data)?;
        self.value_mut(value)?.next = head;
        self.node_mut(node)?.value = Some(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::arena::ValueData;
    use crate::ConfigTree;

    #[rstest::rstest]
    fn test_flag_sequence() {
        let mut tree = ConfigTree::new();
        let root = tree.root();

        tree.set_flag(root, "opts", "ro", true).unwrap();
        assert_eq!(tree.flags(root, "opts"), ["ro"]);
        let field = tree.find_child(root, "opts").unwrap();
        assert_eq!(tree.values(field).count(), 1);

        tree.set_flag(root, "opts", "ro", true).unwrap();
        assert_eq!(tree.flags(root, "opts"), ["ro"]);

        tree.set_flag(root, "opts", "rw", true).unwrap();
        assert_eq!(tree.flags(root, "opts"), ["rw", "ro"]);

        tree.set_flag(root, "opts", "ro", false).unwrap();
        assert_eq!(tree.flags(root, "opts"), ["rw"]);

        tree.set_flag(root, "opts", "rw", false).unwrap();
        assert!(tree.flags(root, "opts").is_empty());
        assert_eq!(tree.find_child(root, "opts"), Some(field));
        assert!(tree.is_empty_array(field));
        assert_eq!(tree.values(field).count(), 1);
    }

    #[rstest::rstest]
    fn test_new_field_becomes_first_child() {
        let mut tree = ConfigTree::new();
        let root = tree.root();
        tree.make_int_node("size", 1, root, None).unwrap();
        tree.set_flag(root, "opts", "ro", true).unwrap();
        let first = tree.first_child(root).unwrap();
        assert_eq!(tree.key(first), Some("opts"));
        assert_eq!(tree.parent(first), Some(root));
        let second = tree.next_sibling(first).unwrap();
        assert_eq!(tree.key(second), Some("size"));
    }

    #[rstest::rstest]
    fn test_remove_absent_flag_is_noop() {
        let mut tree = ConfigTree::new();
        let root = tree.root();
        tree.set_flag(root, "opts", "ro", false).unwrap();
        assert_eq!(tree.find_child(root, "opts"), None);
        assert_eq!(tree.node_count(), 1);
    }

    #[rstest::rstest]
    fn test_readd_after_emptying() {
        let mut tree = ConfigTree::new();
        let root = tree.root();
        tree.set_flag(root, "opts", "ro", true).unwrap();
        tree.set_flag(root, "opts", "ro", false).unwrap();
        tree.set_flag(root, "opts", "rw", true).unwrap();
        let field = tree.find_child(root, "opts").unwrap();
        let values: Vec<_> = tree.values(field).cloned().collect();
        assert_eq!(values, [ValueData::String("rw".into())]);
    }

    #[rstest::rstest]
    fn test_remove_from_middle_and_tail() {
        let mut tree = ConfigTree::new();
        let root = tree.root();
        for flag in ["a", "b", "c", "d"] {
            tree.set_flag(root, "f", flag, true).unwrap();
        }
        assert_eq!(tree.flags(root, "f"), ["d", "c", "b", "a"]);
        tree.set_flag(root, "f", "b", false).unwrap();
        assert_eq!(tree.flags(root, "f"), ["d", "c", "a"]);
        tree.set_flag(root, "f", "a", false).unwrap();
        assert_eq!(tree.flags(root, "f"), ["d", "c"]);
        tree.set_flag(root, "f", "d", false).unwrap();
        assert_eq!(tree.flags(root, "f"), ["c"]);
    }

    #[rstest::rstest]
    fn test_integer_members_never_match() {
        let mut tree = ConfigTree::new();
        let root = tree.root();
        let node = tree.make_int_node("f", 5, root, None).unwrap();
        tree.set_flag(root, "f", "5", false).unwrap();
        assert_eq!(tree.as_int(node), Some(5));
        tree.set_flag(root, "f", "5", true).unwrap();
        assert_eq!(tree.as_str(node), Some("5"));
        assert_eq!(tree.values(node).count(), 2);
    }

    #[rstest::rstest]
    fn test_unknown_parent_is_lookup_error() {
        let mut tree = ConfigTree::new();
        let other = {
            let mut big = ConfigTree::new();
            let root = big.root();
            big.make_int_node("x", 1, root, None).unwrap()
        };
        let err = tree.set_flag(other, "f", "x", true).unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::Lookup);
    }
}
