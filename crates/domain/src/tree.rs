//! Checkbox-tree view model built from flat parent-pointer node lists.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Flat node as stored by permission and menu tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Node identifier.
    pub id: i64,
    /// Parent identifier; `None` or `0` marks a root.
    pub parent_id: Option<i64>,
    /// Display title.
    pub title: String,
    /// Sibling ordering key.
    pub order: i32,
}

impl TreeNode {
    /// Creates a node.
    #[must_use]
    pub fn new(id: i64, parent_id: Option<i64>, title: impl Into<String>, order: i32) -> Self {
        Self {
            id,
            parent_id,
            title: title.into(),
            order,
        }
    }

    fn parent(&self) -> Option<i64> {
        self.parent_id.filter(|parent_id| *parent_id != 0)
    }
}

/// Which nodes render as checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeSelection {
    /// Every node is checked.
    All,
    /// Only the listed node ids are checked.
    Ids(HashSet<i64>),
}

impl TreeSelection {
    /// Builds an id selection.
    pub fn ids(ids: impl IntoIterator<Item = i64>) -> Self {
        Self::Ids(ids.into_iter().collect())
    }

    fn contains(&self, id: i64) -> bool {
        match self {
            Self::All => true,
            Self::Ids(ids) => ids.contains(&id),
        }
    }
}

/// One rendered tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeItem {
    /// Node identifier.
    pub id: i64,
    /// Display title.
    pub title: String,
    /// Whether the checkbox is ticked.
    pub checked: bool,
    /// Child nodes in sibling order.
    pub children: Vec<TreeItem>,
}

/// Checkbox tree handed to the rendering engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TreeViewModel {
    roots: Vec<TreeItem>,
}

impl TreeViewModel {
    /// Returns the root nodes.
    #[must_use]
    pub fn roots(&self) -> &[TreeItem] {
        &self.roots
    }

    /// Returns the ids of every checked node.
    #[must_use]
    pub fn checked_ids(&self) -> BTreeSet<i64> {
        let mut ids = BTreeSet::new();
        let mut pending: Vec<&TreeItem> = self.roots.iter().collect();
        while let Some(item) = pending.pop() {
            if item.checked {
                ids.insert(item.id);
            }
            pending.extend(item.children.iter());
        }

        ids
    }

    /// Returns the total number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut pending: Vec<&TreeItem> = self.roots.iter().collect();
        while let Some(item) = pending.pop() {
            count += 1;
            pending.extend(item.children.iter());
        }

        count
    }

    /// Returns whether the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Groups nodes into a forest and marks the selected ones as checked.
///
/// A node whose parent is missing from `nodes` is promoted to a root. In a
/// parent cycle, the first member in `(order, id)` order becomes a root.
/// Every node appears exactly once.
#[must_use]
pub fn build_tree(nodes: &[TreeNode], selection: &TreeSelection) -> TreeViewModel {
    let known_ids: HashSet<i64> = nodes.iter().map(|node| node.id).collect();
    let mut children_by_parent: HashMap<i64, Vec<&TreeNode>> = HashMap::new();
    let mut roots = Vec::new();

    for node in nodes {
        match node.parent() {
            Some(parent_id) if known_ids.contains(&parent_id) && parent_id != node.id => {
                children_by_parent.entry(parent_id).or_default().push(node);
            }
            _ => roots.push(node),
        }
    }

    sort_siblings(&mut roots);
    for siblings in children_by_parent.values_mut() {
        sort_siblings(siblings);
    }

    let mut visited = HashSet::new();
    let mut items: Vec<TreeItem> = roots
        .into_iter()
        .filter_map(|node| build_item(node, &children_by_parent, selection, &mut visited))
        .collect();

    let mut unreached: Vec<&TreeNode> = nodes
        .iter()
        .filter(|node| !visited.contains(&node.id))
        .collect();
    sort_siblings(&mut unreached);
    for node in unreached {
        if let Some(item) = build_item(node, &children_by_parent, selection, &mut visited) {
            items.push(item);
        }
    }

    TreeViewModel { roots: items }
}

fn sort_siblings(siblings: &mut [&TreeNode]) {
    siblings.sort_by_key(|node| (node.order, node.id));
}

fn build_item(
    node: &TreeNode,
    children_by_parent: &HashMap<i64, Vec<&TreeNode>>,
    selection: &TreeSelection,
    visited: &mut HashSet<i64>,
) -> Option<TreeItem> {
    if !visited.insert(node.id) {
        return None;
    }

    let children = children_by_parent
        .get(&node.id)
        .map(|children| {
            children
                .iter()
                .filter_map(|child| build_item(child, children_by_parent, selection, visited))
                .collect()
        })
        .unwrap_or_default();

    Some(TreeItem {
        id: node.id,
        title: node.title.clone(),
        checked: selection.contains(node.id),
        children,
    })
}
