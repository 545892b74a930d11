//! Arena layout tree.
//!
//! Nodes live in a `BTreeMap` keyed by [`NodeId`] with explicit parent links;
//! the root is the only node without a parent. A [`NodeKind::Leaf`] holds one
//! window and the height it last asked for. A [`NodeKind::Stack`] arranges its
//! children top to bottom with one separator row between siblings.
//!
//! # Row allocation
//!
//! Every row first gets the minimum height. The spare rows are then handed
//! out by request recency: the row whose height was set most recently gets
//! its request first, ties go to the bottom row and then top to bottom. The
//! bottom row absorbs whatever is left.
//!
//! # Invariants
//!
//! 1. A stack always has at least two children; a stack left with one child
//!    is replaced by that child.
//! 2. The primary window is always in the tree.
//! 3. After every operation the rows and separators of a stack add up to its
//!    height (when it is tall enough to give every row the minimum).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{LayoutError, LayoutResult};

/// Default minimum height of a window row.
pub const DEFAULT_MIN_HEIGHT: usize = 1;

static NEXT_WINDOW_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique window identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(u64);

impl WindowId {
    /// Allocate a fresh id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_WINDOW_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window #{}", self.0)
    }
}

/// Identifier of a node in one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Direction in which a split places the new window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// New window above the existing ones.
    Rows,
    /// New window beside the existing ones. Not supported.
    Columns,
}

/// Requested size of a new split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitSize {
    /// Output rows; the window gets one more for its status line.
    Rows(usize),
    /// Percentage of the containing stack's height.
    Percent(u8),
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Leaf {
        window: WindowId,
        /// Height this window last asked for.
        requested: usize,
        /// When `requested` was set; newer requests are served first.
        stamp: u64,
    },
    Stack {
        /// Top to bottom.
        children: Vec<NodeId>,
    },
}

/// One node with its current placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Where a window sits on its tabpage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub window: WindowId,
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Layout of the windows of one tabpage.
#[derive(Debug, Clone)]
pub struct LayoutTree {
    root: NodeId,
    next_node: u64,
    nodes: BTreeMap<NodeId, NodeRecord>,
    primary: WindowId,
    min_height: usize,
    width: usize,
    height: usize,
    clock: u64,
}

impl LayoutTree {
    /// A tree holding only `primary`.
    #[must_use]
    pub fn new(primary: WindowId, width: usize, height: usize) -> Self {
        let mut tree = Self {
            root: NodeId(0),
            next_node: 0,
            nodes: BTreeMap::new(),
            primary,
            min_height: DEFAULT_MIN_HEIGHT,
            width,
            height,
            clock: 0,
        };
        tree.root = tree.primary_leaf();
        tree.relayout();
        tree
    }

    /// Set the minimum row height.
    #[must_use]
    pub fn with_min_height(mut self, min_height: usize) -> Self {
        self.min_height = min_height;
        self.relayout();
        self
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn primary(&self) -> WindowId {
        self.primary
    }

    #[must_use]
    pub fn min_height(&self) -> usize {
        self.min_height
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(&id)
    }

    /// Number of windows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes
            .values()
            .filter(|n| matches!(n.kind, NodeKind::Leaf { .. }))
            .count()
    }

    /// Always false: the primary window is never removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(&self, window: WindowId) -> bool {
        self.leaf_of(window).is_some()
    }

    /// Windows from top to bottom.
    #[must_use]
    pub fn windows(&self) -> Vec<WindowId> {
        self.leaves()
            .into_iter()
            .filter_map(|id| match self.nodes.get(&id).map(|n| &n.kind) {
                Some(NodeKind::Leaf { window, .. }) => Some(*window),
                _ => None,
            })
            .collect()
    }

    /// Every window's placement, top to bottom.
    #[must_use]
    pub fn placements(&self) -> Vec<Placement> {
        self.leaves()
            .into_iter()
            .filter_map(|id| {
                let node = self.nodes.get(&id)?;
                match node.kind {
                    NodeKind::Leaf { window, .. } => Some(Placement {
                        window,
                        x: 0,
                        y: node.y,
                        width: node.width,
                        height: node.height,
                    }),
                    NodeKind::Stack { .. } => None,
                }
            })
            .collect()
    }

    #[must_use]
    pub fn placement_of(&self, window: WindowId) -> Option<Placement> {
        self.placements().into_iter().find(|p| p.window == window)
    }

    #[must_use]
    pub fn y_position_of(&self, window: WindowId) -> Option<usize> {
        self.leaf_of(window)
            .and_then(|id| self.nodes.get(&id))
            .map(|n| n.y)
    }

    #[must_use]
    pub fn height_of(&self, window: WindowId) -> Option<usize> {
        self.leaf_of(window)
            .and_then(|id| self.nodes.get(&id))
            .map(|n| n.height)
    }

    /// Rows between stacked windows, top to bottom.
    #[must_use]
    pub fn separator_rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self
            .nodes
            .values()
            .filter_map(|node| match &node.kind {
                NodeKind::Stack { children } => Some(children),
                NodeKind::Leaf { .. } => None,
            })
            .flat_map(|children| {
                let upper = children.len().saturating_sub(1);
                children[..upper]
                    .iter()
                    .filter_map(|id| self.nodes.get(id))
                    .map(|n| n.y + n.height)
            })
            .filter(|&y| y < self.height)
            .collect();
        rows.sort_unstable();
        rows
    }

    /// The window `count` rows of windows above `window`, stopping at the top.
    #[must_use]
    pub fn window_above(&self, window: WindowId, count: usize) -> Option<WindowId> {
        let windows = self.windows();
        let index = windows.iter().position(|&w| w == window)?;
        windows.get(index.saturating_sub(count)).copied()
    }

    /// The window `count` rows of windows below `window`, stopping at the
    /// bottom.
    #[must_use]
    pub fn window_below(&self, window: WindowId, count: usize) -> Option<WindowId> {
        let windows = self.windows();
        let index = windows.iter().position(|&w| w == window)?;
        let last = windows.len() - 1;
        windows.get(index.saturating_add(count).min(last)).copied()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────

    /// Add `new` at the top of the stack holding `at`.
    ///
    /// When the stack cannot fit the requested height, every existing row
    /// gives up `shortfall / count` rows, down to the minimum.
    pub fn split(
        &mut self,
        at: WindowId,
        new: WindowId,
        orientation: Orientation,
        size: SplitSize,
    ) -> LayoutResult<()> {
        if orientation != Orientation::Rows {
            return Err(LayoutError::UnsupportedOrientation(orientation));
        }
        if self.contains(new) {
            return Err(LayoutError::DuplicateWindow(new));
        }
        let leaf = self.leaf_of(at).ok_or(LayoutError::WindowNotFound(at))?;
        let stack = match self.nodes.get(&leaf).and_then(|n| n.parent) {
            Some(parent) => parent,
            None => self.wrap_root(leaf),
        };

        let container = self.nodes.get(&stack).map_or(0, |n| n.height);
        let requested = match size {
            SplitSize::Rows(rows) => rows + 1,
            SplitSize::Percent(percent) => container * usize::from(percent.min(100)) / 100 + 1,
        };

        let children = self.children_of(stack);
        let count = children.len();
        let space = container.saturating_sub(count);
        let used: usize = children
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|n| n.height)
            .sum();
        let available = space.saturating_sub(used);
        if requested > available {
            let shrink = (requested - available) / count;
            let min_height = self.min_height;
            for id in &children {
                if let Some(node) = self.nodes.get_mut(id)
                    && let NodeKind::Leaf {
                        requested: request, ..
                    } = &mut node.kind
                {
                    *request = node.height.saturating_sub(shrink).max(min_height);
                }
            }
        }

        let stamp = self.tick();
        let id = self.alloc(
            Some(stack),
            NodeKind::Leaf {
                window: new,
                requested,
                stamp,
            },
        );
        if let Some(NodeRecord {
            kind: NodeKind::Stack { children },
            ..
        }) = self.nodes.get_mut(&stack)
        {
            children.insert(0, id);
        }
        self.relayout();
        tracing::debug!(
            at = at.get(),
            window = new.get(),
            requested,
            height = self.height_of(new).unwrap_or(0),
            "split window"
        );
        Ok(())
    }

    /// Ask for `height` rows for `window`. The request wins over older ones.
    pub fn resize_window(&mut self, window: WindowId, height: usize) -> LayoutResult<()> {
        let leaf = self.leaf_of(window).ok_or(LayoutError::WindowNotFound(window))?;
        let stamp = self.tick();
        if let Some(NodeRecord {
            kind: NodeKind::Leaf {
                requested,
                stamp: leaf_stamp,
                ..
            },
            ..
        }) = self.nodes.get_mut(&leaf)
        {
            *requested = height;
            *leaf_stamp = stamp;
        }
        self.relayout();
        tracing::debug!(
            window = window.get(),
            requested = height,
            height = self.height_of(window).unwrap_or(0),
            "resized window"
        );
        Ok(())
    }

    /// Resize the whole tree, keeping each row's request.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.relayout();
        tracing::debug!(width, height, windows = self.len(), "resized layout");
    }

    /// Remove `window`, collapsing stacks left with a single child.
    pub fn close(&mut self, window: WindowId) -> LayoutResult<()> {
        if window == self.primary {
            return Err(LayoutError::CannotClosePrimary);
        }
        let leaf = self.leaf_of(window).ok_or(LayoutError::WindowNotFound(window))?;
        let parent = self.nodes.remove(&leaf).and_then(|n| n.parent);

        let mut stack = parent;
        if let Some(id) = stack
            && let Some(NodeRecord {
                kind: NodeKind::Stack { children },
                ..
            }) = self.nodes.get_mut(&id)
        {
            children.retain(|&c| c != leaf);
        }

        while let Some(id) = stack {
            let children = self.children_of(id);
            let [only] = children[..] else {
                break;
            };
            let grandparent = self.nodes.remove(&id).and_then(|n| n.parent);
            if let Some(node) = self.nodes.get_mut(&only) {
                node.parent = grandparent;
            }
            match grandparent {
                Some(g) => {
                    if let Some(NodeRecord {
                        kind: NodeKind::Stack { children },
                        ..
                    }) = self.nodes.get_mut(&g)
                    {
                        for child in children.iter_mut().filter(|c| **c == id) {
                            *child = only;
                        }
                    }
                }
                None => self.root = only,
            }
            stack = grandparent;
        }

        self.relayout();
        tracing::debug!(window = window.get(), windows = self.len(), "closed window");
        Ok(())
    }

    /// Drop every window but the primary.
    pub fn unsplit(&mut self) {
        self.nodes.clear();
        self.root = self.primary_leaf();
        self.relayout();
        tracing::debug!(window = self.primary.get(), "unsplit layout");
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn alloc(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(
            id,
            NodeRecord {
                id,
                parent,
                kind,
                y: 0,
                width: 0,
                height: 0,
            },
        );
        id
    }

    fn primary_leaf(&mut self) -> NodeId {
        let leaf = NodeKind::Leaf {
            window: self.primary,
            requested: self.height,
            stamp: 0,
        };
        self.alloc(None, leaf)
    }

    /// Replace the root leaf by a stack holding it.
    fn wrap_root(&mut self, leaf: NodeId) -> NodeId {
        let (y, width, height) = self
            .nodes
            .get(&leaf)
            .map_or((0, self.width, self.height), |n| (n.y, n.width, n.height));
        let stack = self.alloc(
            None,
            NodeKind::Stack {
                children: vec![leaf],
            },
        );
        if let Some(node) = self.nodes.get_mut(&stack) {
            node.y = y;
            node.width = width;
            node.height = height;
        }
        if let Some(node) = self.nodes.get_mut(&leaf) {
            node.parent = Some(stack);
        }
        self.root = stack;
        stack
    }

    fn leaf_of(&self, window: WindowId) -> Option<NodeId> {
        self.nodes.values().find_map(|node| match node.kind {
            NodeKind::Leaf { window: w, .. } if w == window => Some(node.id),
            _ => None,
        })
    }

    fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        match self.nodes.get(&id).map(|n| &n.kind) {
            Some(NodeKind::Stack { children }) => children.clone(),
            _ => Vec::new(),
        }
    }

    fn leaves(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_leaves(self.root, &mut out);
        out
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        match self.nodes.get(&id).map(|n| &n.kind) {
            Some(NodeKind::Leaf { .. }) => out.push(id),
            Some(NodeKind::Stack { children }) => {
                for &child in children {
                    self.collect_leaves(child, out);
                }
            }
            None => {}
        }
    }

    /// Height request and recency of a node. A nested stack asks to keep
    /// its current height.
    fn request_of(&self, id: NodeId) -> (usize, u64) {
        match self.nodes.get(&id) {
            Some(NodeRecord {
                kind: NodeKind::Leaf {
                    requested, stamp, ..
                },
                ..
            }) => (*requested, *stamp),
            Some(node) => (node.height, 0),
            None => (0, 0),
        }
    }

    fn relayout(&mut self) {
        self.place(self.root, 0, self.width, self.height);
    }

    fn place(&mut self, id: NodeId, y: usize, width: usize, height: usize) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        node.y = y;
        node.width = width;
        node.height = height;
        let NodeKind::Stack { children } = &node.kind else {
            return;
        };
        let children = children.clone();

        let requests: Vec<(usize, u64)> = children.iter().map(|&c| self.request_of(c)).collect();
        let space = height.saturating_sub(children.len().saturating_sub(1));
        let heights = allocate(&requests, space, self.min_height);

        let mut top = y;
        for (child, rows) in children.into_iter().zip(heights) {
            self.place(child, top, width, rows);
            top += rows + 1;
        }
    }
}

/// Split `space` rows among rows with `(requested, stamp)` requests.
fn allocate(requests: &[(usize, u64)], space: usize, min_height: usize) -> Vec<usize> {
    let count = requests.len();
    if count == 0 {
        return Vec::new();
    }
    let last = count - 1;

    if space < count * min_height {
        let each = space / count;
        let mut heights = vec![each; count];
        heights[last] += space - each * count;
        return heights;
    }

    let tie_rank = |i: usize| if i == last { 0 } else { i + 1 };
    let mut order: Vec<usize> = (0..count).collect();
    order.sort_by(|&a, &b| {
        requests[b]
            .1
            .cmp(&requests[a].1)
            .then_with(|| tie_rank(a).cmp(&tie_rank(b)))
    });

    let mut heights = vec![min_height; count];
    let mut spare = space - count * min_height;
    for i in order {
        let extra = requests[i].0.saturating_sub(min_height).min(spare);
        heights[i] += extra;
        spare -= extra;
    }
    heights[last] += spare;
    heights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heights(tree: &LayoutTree) -> Vec<usize> {
        tree.placements().iter().map(|p| p.height).collect()
    }

    /// Give every window the same-age request, top to bottom.
    fn pin_requests(tree: &mut LayoutTree, requests: &[usize]) {
        for (id, &rows) in tree.leaves().into_iter().zip(requests) {
            if let Some(NodeRecord {
                kind: NodeKind::Leaf {
                    requested, stamp, ..
                },
                ..
            }) = tree.nodes.get_mut(&id)
            {
                *requested = rows;
                *stamp = 0;
            }
        }
    }

    fn three_windows(width: usize, height: usize) -> (LayoutTree, [WindowId; 3]) {
        let primary = WindowId::next();
        let middle = WindowId::next();
        let top = WindowId::next();
        let mut tree = LayoutTree::new(primary, width, height);
        tree.split(primary, middle, Orientation::Rows, SplitSize::Rows(2))
            .unwrap();
        tree.split(middle, top, Orientation::Rows, SplitSize::Rows(2))
            .unwrap();
        (tree, [top, middle, primary])
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    #[test]
    fn allocate_serves_bottom_row_first_on_ties() {
        assert_eq!(allocate(&[(2, 0), (2, 0), (2, 0)], 5, 1), [2, 1, 2]);
    }

    #[test]
    fn allocate_serves_newest_request_first() {
        assert_eq!(allocate(&[(4, 2), (8, 1)], 7, 1), [4, 3]);
        assert_eq!(allocate(&[(3, 2), (8, 1)], 7, 1), [3, 4]);
    }

    #[test]
    fn allocate_gives_leftover_to_bottom_row() {
        assert_eq!(allocate(&[(1, 0), (1, 0)], 10, 1), [1, 9]);
    }

    #[test]
    fn allocate_shares_evenly_when_too_short() {
        assert_eq!(allocate(&[(4, 0), (4, 0), (4, 0)], 4, 2), [1, 1, 2]);
        assert_eq!(allocate(&[(4, 0), (4, 0)], 0, 1), [0, 0]);
    }

    // =========================================================================
    // Splitting
    // =========================================================================

    #[test]
    fn new_tree_is_a_single_leaf() {
        let primary = WindowId::next();
        let tree = LayoutTree::new(primary, 12, 6);
        assert_eq!(
            tree.placements(),
            [Placement {
                window: primary,
                x: 0,
                y: 0,
                width: 12,
                height: 6,
            }]
        );
        assert!(tree.separator_rows().is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn split_puts_new_window_on_top() {
        let primary = WindowId::next();
        let window = WindowId::next();
        let mut tree = LayoutTree::new(primary, 12, 8);
        tree.split(primary, window, Orientation::Rows, SplitSize::Rows(2))
            .unwrap();

        assert_eq!(tree.windows(), [window, primary]);
        assert_eq!(heights(&tree), [3, 4]);
        assert_eq!(tree.y_position_of(window), Some(0));
        assert_eq!(tree.y_position_of(primary), Some(4));
        assert_eq!(tree.separator_rows(), [3]);
    }

    #[test]
    fn split_by_percent_uses_stack_height() {
        let primary = WindowId::next();
        let window = WindowId::next();
        let mut tree = LayoutTree::new(primary, 12, 10);
        tree.split(primary, window, Orientation::Rows, SplitSize::Percent(50))
            .unwrap();
        assert_eq!(heights(&tree), [6, 3]);
    }

    #[test]
    fn split_into_existing_stack_shrinks_rows() {
        let (tree, [top, middle, primary]) = three_windows(12, 12);
        assert_eq!(tree.windows(), [top, middle, primary]);
        assert_eq!(heights(&tree), [3, 2, 5]);
        assert_eq!(tree.separator_rows(), [3, 6]);
    }

    #[test]
    fn equal_requests_keep_bottom_row() {
        let (mut tree, _) = three_windows(12, 12);
        pin_requests(&mut tree, &[2, 2, 2]);
        tree.resize(12, 7);
        assert_eq!(heights(&tree), [2, 1, 2]);
        assert_eq!(tree.separator_rows(), [2, 4]);
    }

    #[test]
    fn column_split_is_unsupported() {
        let primary = WindowId::next();
        let mut tree = LayoutTree::new(primary, 12, 8);
        let err = tree
            .split(primary, WindowId::next(), Orientation::Columns, SplitSize::Rows(2))
            .unwrap_err();
        assert_eq!(err, LayoutError::UnsupportedOrientation(Orientation::Columns));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn split_rejects_unknown_and_duplicate_windows() {
        let primary = WindowId::next();
        let stranger = WindowId::next();
        let mut tree = LayoutTree::new(primary, 12, 8);
        assert_eq!(
            tree.split(stranger, WindowId::next(), Orientation::Rows, SplitSize::Rows(1)),
            Err(LayoutError::WindowNotFound(stranger))
        );
        assert_eq!(
            tree.split(primary, primary, Orientation::Rows, SplitSize::Rows(1)),
            Err(LayoutError::DuplicateWindow(primary))
        );
    }

    // =========================================================================
    // Resizing
    // =========================================================================

    #[test]
    fn resize_window_takes_rows_from_neighbour() {
        let primary = WindowId::next();
        let window = WindowId::next();
        let mut tree = LayoutTree::new(primary, 12, 8);
        tree.split(primary, window, Orientation::Rows, SplitSize::Rows(2))
            .unwrap();
        tree.resize_window(window, 4).unwrap();
        assert_eq!(heights(&tree), [4, 3]);
    }

    #[test]
    fn resize_keeps_requests() {
        let primary = WindowId::next();
        let window = WindowId::next();
        let mut tree = LayoutTree::new(primary, 12, 8);
        tree.split(primary, window, Orientation::Rows, SplitSize::Rows(2))
            .unwrap();
        tree.resize(20, 20);
        assert_eq!(heights(&tree), [3, 16]);
        assert!(tree.placements().iter().all(|p| p.width == 20));
        tree.resize(20, 8);
        assert_eq!(heights(&tree), [3, 4]);
    }

    // =========================================================================
    // Closing
    // =========================================================================

    #[test]
    fn closing_the_only_split_restores_single_leaf() {
        let primary = WindowId::next();
        let window = WindowId::next();
        let mut tree = LayoutTree::new(primary, 12, 6);
        let before = tree.placements();

        tree.split(primary, window, Orientation::Rows, SplitSize::Rows(2))
            .unwrap();
        tree.close(window).unwrap();

        assert_eq!(tree.placements(), before);
        assert!(matches!(
            tree.node(tree.root()).map(|n| &n.kind),
            Some(NodeKind::Leaf { .. })
        ));
        tree.resize(12, 9);
        assert_eq!(heights(&tree), [9]);
    }

    #[test]
    fn closing_middle_window_keeps_stack() {
        let (mut tree, [top, middle, primary]) = three_windows(12, 12);
        tree.close(middle).unwrap();
        assert_eq!(tree.windows(), [top, primary]);
        assert_eq!(heights(&tree), [3, 8]);
        assert_eq!(tree.separator_rows(), [3]);
    }

    #[test]
    fn closing_primary_or_stranger_fails() {
        let (mut tree, [_, _, primary]) = three_windows(12, 12);
        assert_eq!(tree.close(primary), Err(LayoutError::CannotClosePrimary));
        let stranger = WindowId::next();
        assert_eq!(tree.close(stranger), Err(LayoutError::WindowNotFound(stranger)));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn unsplit_is_idempotent() {
        let (mut tree, [top, _, primary]) = three_windows(12, 12);
        tree.unsplit();
        tree.unsplit();
        assert_eq!(tree.windows(), [primary]);
        assert_eq!(heights(&tree), [12]);
        assert!(!tree.contains(top));

        tree.split(primary, top, Orientation::Rows, SplitSize::Rows(2))
            .unwrap();
        assert_eq!(tree.windows(), [top, primary]);
    }

    // =========================================================================
    // Neighbours
    // =========================================================================

    #[test]
    fn neighbours_are_clamped() {
        let (tree, [top, middle, primary]) = three_windows(12, 12);
        assert_eq!(tree.window_above(primary, 1), Some(middle));
        assert_eq!(tree.window_above(primary, 5), Some(top));
        assert_eq!(tree.window_below(top, 2), Some(primary));
        assert_eq!(tree.window_below(primary, 1), Some(primary));
        assert_eq!(tree.window_above(WindowId::next(), 1), None);
    }
}
