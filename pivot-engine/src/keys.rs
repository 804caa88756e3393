//! FILENAME: pivot-engine/src/keys.rs
//! Hierarchical Key Builder - groups rows into a header tree.
//!
//! Given an ordered list of grouping fields, every row gets a key path (one
//! label per level). Paths are inserted into a trie so that each node holds
//! exactly the rows below it, then the trie is emitted as a `HeaderGroup`
//! tree in the configured order.
//!
//! Labels are interned per level so rows are routed by integer ids rather
//! than by repeated string comparisons.

use std::cmp::Ordering;

use log::trace;
use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;
use tabular::{Row, Scalar};

use crate::definition::{PivotOptions, SortOrder};

/// One label per grouping level, outermost first.
pub type KeyPath = SmallVec<[String; 4]>;

/// Interned label id within one level.
type LabelId = u32;

// ============================================================================
// HEADER TREE
// ============================================================================

/// A node of a row or column header tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderGroup {
    /// Path-based identity, e.g. "Region:West/Category:Phones".
    pub key: String,

    /// Display label (the last path segment).
    pub name: String,

    /// Depth in the tree (0 = outermost field).
    pub level: usize,

    pub path: KeyPath,

    pub children: Vec<HeaderGroup>,

    /// One aggregate per value field over every row below this node.
    /// Empty until the tree goes through the assembler.
    pub subtotal: Vec<Scalar>,

    pub row_count: usize,

    /// Position among the leaves (the matrix index) for leaf nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaf_index: Option<usize>,

    /// Indices of the rows below this node. Relative to the row slice the
    /// tree was built from; the assembler rewrites them to source indices.
    #[serde(skip)]
    pub rows: Vec<usize>,
}

impl HeaderGroup {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Collects the leaves of a tree in order.
pub fn leaves(tree: &[HeaderGroup]) -> Vec<&HeaderGroup> {
    fn collect<'a>(nodes: &'a [HeaderGroup], out: &mut Vec<&'a HeaderGroup>) {
        for node in nodes {
            if node.is_leaf() {
                out.push(node);
            } else {
                collect(&node.children, out);
            }
        }
    }

    let mut out = Vec::new();
    collect(tree, &mut out);
    out
}

/// Finds the node at exactly `path`.
pub fn find_group<'a>(tree: &'a [HeaderGroup], path: &[String]) -> Option<&'a HeaderGroup> {
    let (first, rest) = path.split_first()?;
    let node = tree.iter().find(|n| &n.name == first)?;
    if rest.is_empty() {
        Some(node)
    } else {
        find_group(&node.children, rest)
    }
}

/// Output of `build_key_tree`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyTree {
    pub tree: Vec<HeaderGroup>,

    /// Leaf paths in tree order. With no grouping fields this is a single
    /// empty path covering every row (or nothing, if there are no rows).
    pub flat_keys: Vec<KeyPath>,

    pub rows_by_leaf_key: FxHashMap<KeyPath, Vec<usize>>,

    /// For each input row, the index of its leaf in `flat_keys`.
    pub leaf_of_row: Vec<usize>,
}

impl KeyTree {
    pub fn leaf_count(&self) -> usize {
        self.flat_keys.len()
    }

    pub fn leaf_rows(&self, leaf: usize) -> &[usize] {
        self.flat_keys
            .get(leaf)
            .and_then(|key| self.rows_by_leaf_key.get(key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

// ============================================================================
// LABEL INTERNING
// ============================================================================

/// Unique labels of one grouping level, in first-seen order.
#[derive(Debug, Default)]
struct LevelLabels {
    index: FxHashMap<String, LabelId>,
    labels: Vec<String>,
    /// Strict numeric reading of each label, for numeric ordering.
    numbers: Vec<Option<f64>>,
    empties: Vec<bool>,
    any_numeric: bool,
    any_non_numeric: bool,
}

impl LevelLabels {
    /// Labels are the identity of a group, so a value whose text equals the
    /// empty label shares the empty group. That group is classified by its
    /// label, never by whichever of its values came first.
    fn intern(&mut self, value: &Scalar, empty_label: &str) -> LabelId {
        let label = value.group_label(empty_label);
        if let Some(&id) = self.index.get(&label) {
            return id;
        }

        let id = self.labels.len() as LabelId;
        let empty = label == empty_label;
        let number = if empty { None } else { value.as_strict_number() };
        if !empty {
            if number.is_some() {
                self.any_numeric = true;
            } else {
                self.any_non_numeric = true;
            }
        }

        self.index.insert(label.clone(), id);
        self.labels.push(label);
        self.numbers.push(number);
        self.empties.push(empty);
        id
    }

    /// Position of every label id in the emitted order.
    fn ranks(&self, sort_order: SortOrder) -> Vec<usize> {
        let mut ids: Vec<LabelId> = (0..self.labels.len() as LabelId).collect();

        match sort_order {
            SortOrder::DataSourceOrder => {}
            SortOrder::Auto => {
                if self.any_numeric && !self.any_non_numeric {
                    ids.sort_by(|&a, &b| self.compare(a, b, false));
                }
            }
            SortOrder::Ascending => ids.sort_by(|&a, &b| self.compare(a, b, false)),
            SortOrder::Descending => ids.sort_by(|&a, &b| self.compare(a, b, true)),
        }

        let mut ranks = vec![0; ids.len()];
        for (position, id) in ids.into_iter().enumerate() {
            ranks[id as usize] = position;
        }
        ranks
    }

    /// Numbers before text; the empty group always last.
    fn compare(&self, a: LabelId, b: LabelId, descending: bool) -> Ordering {
        let (a, b) = (a as usize, b as usize);

        match (self.empties[a], self.empties[b]) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }

        let ord = match (self.numbers[a], self.numbers[b]) {
            (Some(na), Some(nb)) => na.partial_cmp(&nb).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.labels[a].cmp(&self.labels[b]),
        };

        if descending {
            ord.reverse()
        } else {
            ord
        }
    }
}

// ============================================================================
// TREE BUILDER
// ============================================================================

#[derive(Debug)]
struct TrieNode {
    label: LabelId,
    children: FxHashMap<LabelId, usize>,
    rows: Vec<usize>,
}

impl TrieNode {
    fn new(label: LabelId) -> Self {
        TrieNode {
            label,
            children: FxHashMap::default(),
            rows: Vec::new(),
        }
    }
}

struct KeyTreeBuilder<'a> {
    fields: &'a [String],
    levels: Vec<LevelLabels>,
    ranks: Vec<Vec<usize>>,
    /// Arena; index 0 is the root above the first level.
    nodes: Vec<TrieNode>,
}

impl<'a> KeyTreeBuilder<'a> {
    fn new(fields: &'a [String]) -> Self {
        KeyTreeBuilder {
            fields,
            levels: fields.iter().map(|_| LevelLabels::default()).collect(),
            ranks: Vec::new(),
            nodes: vec![TrieNode::new(0)],
        }
    }

    fn insert_rows(&mut self, rows: &[&Row], empty_label: &str) {
        let fields = self.fields;
        for (row_idx, row) in rows.iter().enumerate() {
            let mut current = 0;
            for (level, field) in fields.iter().enumerate() {
                let label = self.levels[level].intern(row.get(field), empty_label);

                let next = match self.nodes[current].children.get(&label) {
                    Some(&child) => child,
                    None => {
                        let child = self.nodes.len();
                        self.nodes.push(TrieNode::new(label));
                        self.nodes[current].children.insert(label, child);
                        child
                    }
                };

                self.nodes[next].rows.push(row_idx);
                current = next;
            }
        }
    }

    fn compute_ranks(&mut self, sort_order: SortOrder) {
        self.ranks = self.levels.iter().map(|l| l.ranks(sort_order)).collect();
    }

    /// Emits the children of `node_idx` as header groups, recording leaves.
    fn emit(
        &mut self,
        node_idx: usize,
        level: usize,
        parent_path: &KeyPath,
        parent_key: &str,
        out: &mut KeyTree,
    ) -> Vec<HeaderGroup> {
        let ranks = &self.ranks[level];
        let mut children: Vec<usize> = self.nodes[node_idx].children.values().copied().collect();
        children.sort_by_key(|&child| ranks[self.nodes[child].label as usize]);

        let fields = self.fields;
        let field = &fields[level];
        let is_leaf_level = level + 1 == fields.len();
        let mut groups = Vec::with_capacity(children.len());

        for child in children {
            let name = self.levels[level].labels[self.nodes[child].label as usize].clone();
            let rows = std::mem::take(&mut self.nodes[child].rows);

            let mut path = parent_path.clone();
            path.push(name.clone());

            let key = if parent_key.is_empty() {
                format!("{}:{}", field, name)
            } else {
                format!("{}/{}:{}", parent_key, field, name)
            };

            let mut group = HeaderGroup {
                key,
                name,
                level,
                path: path.clone(),
                children: Vec::new(),
                subtotal: Vec::new(),
                row_count: rows.len(),
                leaf_index: None,
                rows: Vec::new(),
            };

            if is_leaf_level {
                let leaf = out.flat_keys.len();
                for &row in &rows {
                    out.leaf_of_row[row] = leaf;
                }
                out.flat_keys.push(path.clone());
                out.rows_by_leaf_key.insert(path, rows.clone());
                group.leaf_index = Some(leaf);
            } else {
                group.children = self.emit(child, level + 1, &path, &group.key, out);
            }

            group.rows = rows;
            groups.push(group);
        }

        groups
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Groups `rows` by `fields` into a header tree.
///
/// Every row lands in exactly one leaf; each node's children partition its
/// rows. Row indices in the result refer to positions in `rows`.
pub fn build_key_tree(rows: &[&Row], fields: &[String], options: &PivotOptions) -> KeyTree {
    if fields.is_empty() {
        return implicit_root(rows.len());
    }

    let mut builder = KeyTreeBuilder::new(fields);
    builder.insert_rows(rows, &options.empty_label);
    builder.compute_ranks(options.sort_order);

    let mut out = KeyTree {
        leaf_of_row: vec![0; rows.len()],
        ..KeyTree::default()
    };
    let tree = builder.emit(0, 0, &KeyPath::new(), "", &mut out);
    out.tree = tree;

    trace!(
        "grouped {} rows by [{}] into {} leaves",
        rows.len(),
        fields.join(", "),
        out.flat_keys.len()
    );
    out
}

/// No grouping: one leaf with the empty path holding every row.
fn implicit_root(row_count: usize) -> KeyTree {
    if row_count == 0 {
        return KeyTree::default();
    }

    let mut rows_by_leaf_key = FxHashMap::default();
    rows_by_leaf_key.insert(KeyPath::new(), (0..row_count).collect());

    KeyTree {
        tree: Vec::new(),
        flat_keys: vec![KeyPath::new()],
        rows_by_leaf_key,
        leaf_of_row: vec![0; row_count],
    }
}
