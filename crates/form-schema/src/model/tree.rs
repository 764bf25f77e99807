//! The editable form tree and its path-addressed operations.
//!
//! A [`FormTree`] is an ordered forest of [`Node`]s. Every operation
//! addresses its target by a [`Path`] computed from the current tree, so the
//! same code handles any nesting depth.
//!
//! Sequences hold `Arc<Node>`, which makes a tree value a cheap snapshot:
//! cloning shares every node, and an edit copies only the nodes on the path
//! from the root to its target. [`FormTree::apply`] uses this to produce a
//! new snapshot while leaving the old one untouched.

use std::sync::Arc;

use crate::error::TreeError;
use crate::limits::MAX_IMPORT_DEPTH;
use crate::model::node::same_sequence;
use crate::model::{Field, Group, IdGenerator, Node, NodeId, Path};

/// A structural edit action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEdit {
    /// Append `node` to the group at `parent`, or to the root if `parent` is empty.
    Insert { parent: Path, node: Node },
    /// Remove the node at `path`.
    Delete { path: Path },
    /// Replace one attribute of the node at `path`.
    SetAttribute {
        path: Path,
        attribute: String,
        value: String,
    },
}

/// An ordered forest of fields and groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormTree {
    roots: Vec<Arc<Node>>,
}

impl FormTree {
    /// Creates a tree with no nodes.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self {
            roots: nodes.into_iter().map(Arc::new).collect(),
        }
    }

    /// The starting tree of a new record: one unnamed group holding one empty field.
    pub fn new_record(ids: &mut dyn IdGenerator) -> Self {
        Self::from_nodes(vec![seeded_group(ids).into()])
    }

    /// The root sequence.
    pub fn roots(&self) -> &[Arc<Node>] {
        &self.roots
    }

    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &Node> {
        self.roots.iter().map(|n| n.as_ref())
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    /// Returns the node at `path`.
    ///
    /// Every index but the last must land on a group. The empty path names
    /// the root sequence, not a node, and resolves to `NotFound`.
    pub fn resolve(&self, path: &Path) -> Result<&Node, TreeError> {
        let (&last, spine) = path
            .indices()
            .split_last()
            .ok_or_else(|| not_found(path))?;
        self.sequence_at(spine)
            .and_then(|seq| seq.get(last))
            .map(|n| n.as_ref())
            .ok_or_else(|| not_found(path))
    }

    /// Returns the sequence that owns the node at `path`.
    ///
    /// A single-index path yields the root sequence. The final index itself
    /// is not checked.
    pub fn resolve_parent_sequence(&self, path: &Path) -> Result<&[Arc<Node>], TreeError> {
        let (_, spine) = path
            .indices()
            .split_last()
            .ok_or_else(|| not_found(path))?;
        self.sequence_at(spine).ok_or_else(|| not_found(path))
    }

    /// Finds the current path of the node with `id`.
    pub fn find_path(&self, id: &NodeId) -> Option<Path> {
        self.walk()
            .find(|(_, node)| node.id() == id)
            .map(|(path, _)| path)
    }

    /// Pre-order, left-to-right traversal yielding each node with its path.
    pub fn walk(&self) -> Walk<'_> {
        let stack = self
            .roots
            .iter()
            .enumerate()
            .rev()
            .map(|(i, n)| (Path::from([i]), n.as_ref()))
            .collect();
        Walk { stack }
    }

    /// Number of fields in the whole tree.
    pub fn field_count(&self) -> usize {
        self.nodes().map(Node::field_count).sum()
    }

    /// Length of the longest path, or 0 for an empty tree.
    pub fn depth(&self) -> usize {
        self.walk().map(|(path, _)| path.len()).max().unwrap_or(0)
    }

    /// Structural equivalence ignoring node ids.
    pub fn same_content(&self, other: &FormTree) -> bool {
        same_sequence(&self.roots, &other.roots)
    }

    // =========================================================================
    // EDITING
    // =========================================================================

    /// Appends `node` to the group at `parent` (or to the root sequence when
    /// `parent` is empty) and returns the new node's path.
    pub fn insert(&mut self, parent: &Path, node: Node) -> Result<Path, TreeError> {
        self.insert_with_max_depth(parent, node, MAX_IMPORT_DEPTH)
    }

    /// Like [`insert`](Self::insert), but rejects the node if any of its
    /// descendants would end up at a path longer than `max_depth`.
    ///
    /// Use the importer's depth limit here so every tree that can be built
    /// can also be imported again.
    pub fn insert_with_max_depth(
        &mut self,
        parent: &Path,
        node: Node,
        max_depth: usize,
    ) -> Result<Path, TreeError> {
        if parent.len() + node.height() > max_depth {
            tracing::warn!(
                "insert rejected: node under path {} would exceed max depth {}",
                parent,
                max_depth
            );
            return Err(TreeError::DepthExceeded {
                path: parent.clone(),
                max: max_depth,
            });
        }

        if parent.is_root() {
            self.roots.push(Arc::new(node));
            return Ok(Path::from([self.roots.len() - 1]));
        }

        let is_group = self.resolve(parent).map(Node::is_group).unwrap_or(false);
        if !is_group {
            tracing::warn!("insert rejected: no group at path {}", parent);
            return Err(TreeError::InvalidParent {
                path: parent.clone(),
            });
        }

        let items = self
            .sequence_at_mut(parent.indices())
            .ok_or_else(|| TreeError::InvalidParent {
                path: parent.clone(),
            })?;
        items.push(Arc::new(node));
        let index = items.len() - 1;
        tracing::trace!("inserted node at {}", parent.child(index));
        Ok(parent.child(index))
    }

    /// Removes and returns the node at `path`.
    ///
    /// The owning sequence and the index to remove both come from `path`.
    pub fn delete(&mut self, path: &Path) -> Result<Node, TreeError> {
        let invalid = || TreeError::InvalidPath { path: path.clone() };

        let Some((&index, spine)) = path.indices().split_last() else {
            tracing::warn!("delete rejected: empty path");
            return Err(invalid());
        };
        let in_range = self
            .sequence_at(spine)
            .is_some_and(|seq| index < seq.len());
        if !in_range {
            tracing::warn!("delete rejected: invalid parent or index at path {}", path);
            return Err(invalid());
        }

        let seq = self.sequence_at_mut(spine).ok_or_else(invalid)?;
        let removed = seq.remove(index);
        tracing::trace!("deleted node at {}", path);
        Ok(Arc::unwrap_or_clone(removed))
    }

    /// Replaces the attribute named `attribute` on the node at `path`.
    pub fn set_attribute(
        &mut self,
        path: &Path,
        attribute: &str,
        value: &str,
    ) -> Result<(), TreeError> {
        let resolved = self.resolve(path).and_then(|node| node.check_attribute(attribute));
        let attr = match resolved {
            Ok(attr) => attr,
            Err(e) => {
                tracing::warn!("set_attribute rejected at path {}: {}", path, e);
                return Err(e);
            }
        };

        let node = self.node_at_mut(path).ok_or_else(|| not_found(path))?;
        node.set(attr, value);
        Ok(())
    }

    /// Applies `edit` to a copy of this tree and returns the copy.
    ///
    /// `self` is left unchanged whether or not the edit succeeds.
    pub fn apply(&self, edit: TreeEdit) -> Result<FormTree, TreeError> {
        let mut next = self.clone();
        next.apply_in_place(edit)?;
        Ok(next)
    }

    /// Applies `edit` to this tree. On error the tree is unchanged.
    pub fn apply_in_place(&mut self, edit: TreeEdit) -> Result<(), TreeError> {
        match edit {
            TreeEdit::Insert { parent, node } => self.insert(&parent, node).map(|_| ()),
            TreeEdit::Delete { path } => self.delete(&path).map(|_| ()),
            TreeEdit::SetAttribute {
                path,
                attribute,
                value,
            } => self.set_attribute(&path, &attribute, &value),
        }
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    /// Walks `spine` through groups and returns the sequence it ends in.
    fn sequence_at(&self, spine: &[usize]) -> Option<&[Arc<Node>]> {
        let mut seq: &[Arc<Node>] = &self.roots;
        for &i in spine {
            seq = &seq.get(i)?.as_group()?.items;
        }
        Some(seq)
    }

    /// Mutable counterpart of [`sequence_at`](Self::sequence_at).
    ///
    /// Nodes along the spine that are shared with another snapshot are
    /// copied before being handed out.
    fn sequence_at_mut(&mut self, spine: &[usize]) -> Option<&mut Vec<Arc<Node>>> {
        let mut seq = &mut self.roots;
        for &i in spine {
            let node = Arc::make_mut(seq.get_mut(i)?);
            seq = &mut node.as_group_mut()?.items;
        }
        Some(seq)
    }

    fn node_at_mut(&mut self, path: &Path) -> Option<&mut Node> {
        let (&last, spine) = path.indices().split_last()?;
        let seq = self.sequence_at_mut(spine)?;
        Some(Arc::make_mut(seq.get_mut(last)?))
    }
}

/// Pre-order iterator over a [`FormTree`]. See [`FormTree::walk`].
pub struct Walk<'a> {
    stack: Vec<(Path, &'a Node)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (Path, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;
        if let Node::Group(group) = node {
            for (i, child) in group.items.iter().enumerate().rev() {
                self.stack.push((path.child(i), child.as_ref()));
            }
        }
        Some((path, node))
    }
}

/// A new group as the editor creates it: unnamed, holding one empty field.
pub fn seeded_group(ids: &mut dyn IdGenerator) -> Group {
    let id = ids.next_id();
    let field = Field::new(ids.next_id());
    Group::with_items(id, "", vec![field.into()])
}

fn not_found(path: &Path) -> TreeError {
    TreeError::NotFound { path: path.clone() }
}
