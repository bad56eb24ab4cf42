//! The binary-space-partition tree behind the dwindle layout.
//!
//! Nodes live in an arena indexed by [`NodeId`]; parent links are plain
//! back-references into the same arena. Every leaf holds exactly one tiled
//! window, every split exactly two children. The tree itself is pure
//! geometry state: committing rectangles to windows and the scene graph is
//! the layout's job.

use smallvec::SmallVec;

use crate::utils::{Axis, Direction, Point, Rectangle};
use crate::window::Window;
use crate::CoreError;

use super::DwindleConfig;

/// Index of a node in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct NodeId(usize);

/// Per-container overrides for how splits behave
#[derive(Debug, Clone, Copy)]
pub(super) struct NodeHints {
    /// Split along this axis instead of the smart choice
    pub force_split_axis: Option<Axis>,
    /// Lower clamp for the split ratio
    pub min_ratio: f32,
    /// Upper clamp for the split ratio
    pub max_ratio: f32,
}

/// An in-flight transition of a node towards a new rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct NodeAnimation {
    pub target: Rectangle,
    pub start_time: u32,
    pub duration: u32,
}

#[derive(Debug)]
enum NodeKind {
    Leaf {
        window: Window,
    },
    Split {
        children: [NodeId; 2],
        axis: Axis,
        ratio: f32,
    },
}

#[derive(Debug)]
struct Node {
    parent: Option<NodeId>,
    kind: NodeKind,
    rect: Rectangle,
    hints: NodeHints,
    animation: Option<NodeAnimation>,
}

impl Node {
    fn new(kind: NodeKind, hints: NodeHints) -> Node {
        Node {
            parent: None,
            kind,
            rect: Rectangle::default(),
            hints,
            animation: None,
        }
    }
}

/// The per-workspace BSP tree
#[derive(Debug, Default)]
pub(super) struct DwindleTree {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    root: Option<NodeId>,
}

impl DwindleTree {
    pub fn new() -> DwindleTree {
        DwindleTree::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    fn node(&self, id: NodeId) -> &Node {
        self.slots[id.0].as_ref().expect("stale node id")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.slots[id.0].as_mut().expect("stale node id")
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                NodeId(idx)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        self.slots[id.0] = None;
        self.free.push(id.0);
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn node_rect(&self, id: NodeId) -> Rectangle {
        self.node(id).rect
    }

    #[cfg(test)]
    pub fn node_animation(&self, id: NodeId) -> Option<(Rectangle, u32, u32)> {
        self.node(id)
            .animation
            .map(|a| (a.target, a.start_time, a.duration))
    }

    /// Number of nodes currently transitioning towards a new rectangle
    pub fn animating_nodes(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|node| node.animation.is_some())
            .count()
    }

    pub fn split_ratio(&self, id: NodeId) -> Option<f32> {
        match self.node(id).kind {
            NodeKind::Split { ratio, .. } => Some(ratio),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn split_axis(&self, id: NodeId) -> Option<Axis> {
        match self.node(id).kind {
            NodeKind::Split { axis, .. } => Some(axis),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn second_child(&self, id: NodeId) -> Option<NodeId> {
        match self.node(id).kind {
            NodeKind::Split { children, .. } => Some(children[1]),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Pin (or clear) the axis used the next time this node is split
    pub fn set_force_split_axis(&mut self, id: NodeId, axis: Option<Axis>) {
        self.node_mut(id).hints.force_split_axis = axis;
    }

    /// The leaf currently holding `window`
    pub fn find_window(&self, window: &Window) -> Option<NodeId> {
        let mut stack: SmallVec<[NodeId; 16]> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            match &self.node(id).kind {
                NodeKind::Leaf { window: w } if w == window => return Some(id),
                NodeKind::Leaf { .. } => {}
                NodeKind::Split { children, .. } => stack.extend(children.iter().copied()),
            }
        }
        None
    }

    /// Number of windows held by the tree
    pub fn window_count(&self) -> usize {
        self.leaf_windows().len()
    }

    /// Longest root-to-leaf path, in nodes
    pub fn depth(&self) -> usize {
        fn depth_of(tree: &DwindleTree, id: NodeId) -> usize {
            match &tree.node(id).kind {
                NodeKind::Leaf { .. } => 1,
                NodeKind::Split { children, .. } => {
                    1 + depth_of(tree, children[0]).max(depth_of(tree, children[1]))
                }
            }
        }
        self.root.map(|root| depth_of(self, root)).unwrap_or(0)
    }

    /// All windows in tile order (in-order walk of the tree)
    pub fn leaf_windows(&self) -> Vec<Window> {
        let mut windows = Vec::new();
        self.walk_leaves(|_, window, _| windows.push(window.clone()));
        windows
    }

    /// All windows in tile order together with their computed rectangles
    pub fn leaves_with_rects(&self) -> Vec<(Window, Rectangle)> {
        let mut leaves = Vec::new();
        self.walk_leaves(|_, window, rect| leaves.push((window.clone(), rect)));
        leaves
    }

    fn walk_leaves(&self, mut f: impl FnMut(NodeId, &Window, Rectangle)) {
        fn walk(
            tree: &DwindleTree,
            id: NodeId,
            f: &mut impl FnMut(NodeId, &Window, Rectangle),
        ) {
            let node = tree.node(id);
            match &node.kind {
                NodeKind::Leaf { window } => f(id, window, node.rect),
                NodeKind::Split { children, .. } => {
                    walk(tree, children[0], f);
                    walk(tree, children[1], f);
                }
            }
        }
        if let Some(root) = self.root {
            walk(self, root, &mut f);
        }
    }

    /// Insert `window` by splitting the target node.
    ///
    /// `target` is normally the focused leaf; without one the root is
    /// split. The split axis follows the target's forced axis if set,
    /// otherwise the smart rule: wider-than-tall splits horizontally,
    /// everything else vertically. With a `direction` of `Left` or `Up` the
    /// new window takes the leading slot, otherwise the trailing one.
    pub fn insert_window(
        &mut self,
        window: Window,
        target: Option<NodeId>,
        direction: Option<Direction>,
        config: &DwindleConfig,
    ) -> NodeId {
        let hints = NodeHints {
            force_split_axis: None,
            min_ratio: config.min_split_ratio,
            max_ratio: config.max_split_ratio,
        };
        let leaf = self.alloc(Node::new(NodeKind::Leaf { window }, hints));

        let Some(root) = self.root else {
            self.root = Some(leaf);
            return leaf;
        };
        let target = target.unwrap_or(root);

        let target_node = self.node(target);
        let axis = target_node.hints.force_split_axis.unwrap_or_else(|| {
            if !config.smart_split || target_node.rect.width > target_node.rect.height {
                Axis::Horizontal
            } else {
                Axis::Vertical
            }
        });
        let new_first = direction.map(|d| !d.is_forward()).unwrap_or(false);
        let children = if new_first {
            [leaf, target]
        } else {
            [target, leaf]
        };

        let grandparent = self.node(target).parent;
        let rect = self.node(target).rect;
        let container = self.alloc(Node::new(
            NodeKind::Split {
                children,
                axis,
                ratio: config.default_split_ratio.clamp(hints.min_ratio, hints.max_ratio),
            },
            hints,
        ));
        self.node_mut(container).parent = grandparent;
        self.node_mut(container).rect = rect;
        self.node_mut(target).parent = Some(container);
        self.node_mut(leaf).parent = Some(container);

        match grandparent {
            Some(gp) => self.replace_child(gp, target, container),
            None => self.root = Some(container),
        }

        leaf
    }

    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        if let NodeKind::Split { children, .. } = &mut self.node_mut(parent).kind {
            for child in children.iter_mut() {
                if *child == old {
                    *child = new;
                    return;
                }
            }
        }
        unreachable!("replace_child called with a non-child");
    }

    /// Remove `window`'s leaf, merging its parent away.
    ///
    /// Returns false when the window is not in the tree.
    pub fn remove_window(&mut self, window: &Window) -> bool {
        let Some(leaf) = self.find_window(window) else {
            return false;
        };

        match self.node(leaf).parent {
            None => {
                // the leaf was the root
                self.root = None;
            }
            Some(parent) => {
                let NodeKind::Split { children, .. } = &self.node(parent).kind else {
                    unreachable!("a leaf's parent is always a split");
                };
                let sibling = if children[0] == leaf {
                    children[1]
                } else {
                    children[0]
                };
                let grandparent = self.node(parent).parent;
                self.node_mut(sibling).parent = grandparent;
                match grandparent {
                    Some(gp) => self.replace_child(gp, parent, sibling),
                    None => self.root = Some(sibling),
                }
                self.release(parent);
            }
        }
        self.release(leaf);
        true
    }

    /// Exchange the windows of two leaves; the structure is untouched
    pub fn swap_windows(&mut self, a: &Window, b: &Window) -> bool {
        let (Some(node_a), Some(node_b)) = (self.find_window(a), self.find_window(b)) else {
            return false;
        };
        if node_a == node_b {
            return true;
        }
        let set = |tree: &mut DwindleTree, id: NodeId, win: Window| {
            if let NodeKind::Leaf { window } = &mut tree.node_mut(id).kind {
                *window = win;
            }
        };
        set(self, node_a, b.clone());
        set(self, node_b, a.clone());
        true
    }

    /// Set a container's split ratio, clamped to its hints
    pub fn set_split_ratio(&mut self, id: NodeId, new_ratio: f32) {
        let hints = self.node(id).hints;
        if let NodeKind::Split { ratio, .. } = &mut self.node_mut(id).kind {
            *ratio = new_ratio.clamp(hints.min_ratio, hints.max_ratio);
        }
    }

    /// Adjust a container's split ratio by `delta`, or to `delta` if `exact`
    pub fn adjust_split_ratio(&mut self, id: NodeId, delta: f32, exact: bool) {
        let current = match self.split_ratio(id) {
            Some(ratio) => ratio,
            None => return,
        };
        let new_ratio = if exact { delta } else { current + delta };
        self.set_split_ratio(id, new_ratio);
    }

    /// Recompute the rectangle of every node from `area`.
    ///
    /// `inner_gap` is inserted between every sibling pair: the region is cut
    /// at `floor(len × ratio)` and the leading child gives up `ceil(gap/2)`,
    /// the trailing one `floor(gap/2)`, so adjacent tiles end up exactly
    /// `inner_gap` apart. When `animation` carries a duration, nodes whose
    /// rectangle changed record the new one as their transition target.
    pub fn recalculate(
        &mut self,
        area: Rectangle,
        inner_gap: i32,
        now_ms: u32,
        animation: Option<u32>,
    ) {
        if let Some(root) = self.root {
            self.recalc_node(root, area, inner_gap, now_ms, animation);
        }
    }

    fn recalc_node(
        &mut self,
        id: NodeId,
        rect: Rectangle,
        gap: i32,
        now_ms: u32,
        animation: Option<u32>,
    ) {
        {
            let node = self.node_mut(id);
            let previous = node.rect;
            node.animation = match animation {
                Some(duration) if previous != rect && previous != Rectangle::default() => {
                    Some(NodeAnimation {
                        target: rect,
                        start_time: now_ms,
                        duration,
                    })
                }
                _ => None,
            };
            node.rect = rect;
        }

        let split = match &self.node(id).kind {
            NodeKind::Split {
                children,
                axis,
                ratio,
            } => Some((*children, *axis, *ratio)),
            NodeKind::Leaf { .. } => None,
        };
        if let Some((children, axis, ratio)) = split {
            let (first, second) = split_rects(rect, axis, ratio, gap);
            self.recalc_node(children[0], first, gap, now_ms, animation);
            self.recalc_node(children[1], second, gap, now_ms, animation);
        }
    }

    /// The next (or previous) window in tile order, wrapping at the ends
    pub fn next_window(&self, current: &Window, reverse: bool) -> Option<Window> {
        let windows = self.leaf_windows();
        let idx = windows.iter().position(|w| w == current)?;
        if windows.len() < 2 {
            return None;
        }
        let next = if reverse {
            (idx + windows.len() - 1) % windows.len()
        } else {
            (idx + 1) % windows.len()
        };
        Some(windows[next].clone())
    }

    /// The visually adjacent window in `direction`, if any.
    ///
    /// Ascends to the first ancestor splitting along the requested axis
    /// whose child slot opposes the movement, then descends into the
    /// sibling towards the leaf nearest the origin window.
    pub fn directional_neighbor(&self, window: &Window, direction: Direction) -> Option<Window> {
        let leaf = self.find_window(window)?;
        let origin = self.node(leaf).rect.center();

        let mut current = leaf;
        loop {
            let parent = self.parent(current)?;
            if let NodeKind::Split { children, axis, .. } = &self.node(parent).kind {
                let slot = usize::from(children[1] == current);
                let crosses = *axis == direction.axis()
                    && ((direction.is_forward() && slot == 0)
                        || (!direction.is_forward() && slot == 1));
                if crosses {
                    let sibling = children[1 - slot];
                    return Some(self.descend_towards(sibling, direction, origin));
                }
            }
            current = parent;
        }
    }

    fn descend_towards(&self, start: NodeId, direction: Direction, origin: Point) -> Window {
        let mut id = start;
        loop {
            match &self.node(id).kind {
                NodeKind::Leaf { window } => return window.clone(),
                NodeKind::Split { children, axis, .. } => {
                    id = if *axis == direction.axis() {
                        // take the side facing the origin window
                        if direction.is_forward() {
                            children[0]
                        } else {
                            children[1]
                        }
                    } else {
                        // stay in the origin's row or column
                        let c0 = self.node(children[0]).rect.center();
                        let c1 = self.node(children[1]).rect.center();
                        let (d0, d1) = match axis {
                            Axis::Horizontal => {
                                ((c0.x - origin.x).abs(), (c1.x - origin.x).abs())
                            }
                            Axis::Vertical => ((c0.y - origin.y).abs(), (c1.y - origin.y).abs()),
                        };
                        if d0 <= d1 {
                            children[0]
                        } else {
                            children[1]
                        }
                    };
                }
            }
        }
    }

    /// Check the structural invariants of the tree.
    ///
    /// Purely observational: a violation is reported, never repaired.
    pub fn validate(&self) -> Result<(), CoreError> {
        let Some(root) = self.root else {
            let live = self.slots.iter().filter(|slot| slot.is_some()).count();
            if live != 0 {
                return Err(CoreError::invariant(
                    "dwindle",
                    format!("empty tree holds {live} orphaned nodes"),
                ));
            }
            return Ok(());
        };

        if self.node(root).parent.is_some() {
            return Err(CoreError::invariant("dwindle", "root has a parent"));
        }

        let mut seen_windows: Vec<usize> = Vec::new();
        let mut visited = 0usize;
        let mut stack: SmallVec<[NodeId; 16]> = SmallVec::new();
        stack.push(root);
        while let Some(id) = stack.pop() {
            visited += 1;
            match &self.node(id).kind {
                NodeKind::Leaf { window } => {
                    if seen_windows.contains(&window.id()) {
                        return Err(CoreError::invariant(
                            "dwindle",
                            format!("window {} appears in more than one leaf", window.id()),
                        ));
                    }
                    seen_windows.push(window.id());
                }
                NodeKind::Split { children, ratio, .. } => {
                    let hints = self.node(id).hints;
                    if *ratio < hints.min_ratio || *ratio > hints.max_ratio {
                        return Err(CoreError::invariant(
                            "dwindle",
                            format!("split ratio {ratio} escaped its clamp"),
                        ));
                    }
                    for child in children {
                        if self.slots.get(child.0).map(Option::is_none).unwrap_or(true) {
                            return Err(CoreError::invariant(
                                "dwindle",
                                "split references a released node",
                            ));
                        }
                        if self.node(*child).parent != Some(id) {
                            return Err(CoreError::invariant(
                                "dwindle",
                                "child does not point back at its parent",
                            ));
                        }
                        stack.push(*child);
                    }
                }
            }
        }

        let live = self.slots.iter().filter(|slot| slot.is_some()).count();
        if live != visited {
            return Err(CoreError::invariant(
                "dwindle",
                format!("{} nodes allocated but {visited} reachable", live),
            ));
        }
        Ok(())
    }

    /// A structural fingerprint for comparing tree shapes in tests
    #[cfg(test)]
    pub fn shape(&self) -> String {
        fn fmt(tree: &DwindleTree, id: NodeId, out: &mut String) {
            match &tree.node(id).kind {
                NodeKind::Leaf { window } => out.push_str(&format!("w{}", window.id())),
                NodeKind::Split {
                    children,
                    axis,
                    ratio,
                } => {
                    out.push_str(match axis {
                        Axis::Horizontal => "h(",
                        Axis::Vertical => "v(",
                    });
                    fmt(tree, children[0], out);
                    out.push_str(&format!(" {ratio:.2} "));
                    fmt(tree, children[1], out);
                    out.push(')');
                }
            }
        }
        let mut out = String::new();
        if let Some(root) = self.root {
            fmt(self, root, &mut out);
        }
        out
    }
}

/// Cut `rect` in two along `axis` with exactly `gap` pixels between the
/// parts. The leading part is `floor(len × ratio)` long before the gap is
/// carved out of both sides of the cut.
fn split_rects(rect: Rectangle, axis: Axis, ratio: f32, gap: i32) -> (Rectangle, Rectangle) {
    let lead = gap - gap / 2;
    let trail = gap / 2;
    match axis {
        Axis::Horizontal => {
            let first = (rect.width as f32 * ratio).floor() as i32;
            (
                Rectangle::new(rect.x, rect.y, (first - lead).max(0), rect.height),
                Rectangle::new(
                    rect.x + first + trail,
                    rect.y,
                    (rect.width - first - trail).max(0),
                    rect.height,
                ),
            )
        }
        Axis::Vertical => {
            let first = (rect.height as f32 * ratio).floor() as i32;
            (
                Rectangle::new(rect.x, rect.y, rect.width, (first - lead).max(0)),
                Rectangle::new(
                    rect.x,
                    rect.y + first + trail,
                    rect.width,
                    (rect.height - first - trail).max(0),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::adapter::SurfaceHandle;

    #[derive(Debug)]
    struct NullSurface;

    impl SurfaceHandle for NullSurface {
        fn configure(&self, _geometry: Rectangle) {}
        fn set_maximized(&self, _maximized: bool) {}
        fn set_fullscreen(&self, _fullscreen: bool) {}
        fn set_minimized(&self, _minimized: bool) {}
    }

    fn window() -> Window {
        Window::new(Arc::new(NullSurface))
    }

    fn config() -> DwindleConfig {
        DwindleConfig::default()
    }

    const AREA: Rectangle = Rectangle::new(0, 0, 1000, 600);

    #[test]
    fn first_window_becomes_root_leaf() {
        let mut tree = DwindleTree::new();
        let a = window();
        tree.insert_window(a.clone(), None, None, &config());
        tree.recalculate(AREA, 10, 0, None);

        assert_eq!(tree.window_count(), 1);
        assert_eq!(tree.leaves_with_rects(), vec![(a, AREA)]);
        tree.validate().unwrap();
    }

    #[test]
    fn second_window_splits_the_wider_axis() {
        let mut tree = DwindleTree::new();
        let (a, b) = (window(), window());
        tree.insert_window(a.clone(), None, None, &config());
        tree.recalculate(AREA, 10, 0, None);
        tree.insert_window(b.clone(), None, None, &config());
        tree.recalculate(AREA, 10, 0, None);

        let leaves = tree.leaves_with_rects();
        assert_eq!(leaves[0], (a, Rectangle::new(0, 0, 495, 600)));
        assert_eq!(leaves[1], (b, Rectangle::new(505, 0, 495, 600)));
        // the gap between the siblings is exactly the inner gap
        assert_eq!(leaves[1].1.x - leaves[0].1.right(), 10);
        tree.validate().unwrap();
    }

    #[test]
    fn insert_remove_roundtrip_restores_the_shape() {
        let mut tree = DwindleTree::new();
        let (a, b, c) = (window(), window(), window());
        tree.insert_window(a.clone(), None, None, &config());
        tree.recalculate(AREA, 10, 0, None);
        tree.insert_window(b.clone(), None, None, &config());
        tree.recalculate(AREA, 10, 0, None);
        let before = tree.shape();

        let target = tree.find_window(&a);
        tree.insert_window(c.clone(), target, None, &config());
        tree.recalculate(AREA, 10, 0, None);
        assert_eq!(tree.window_count(), 3);
        tree.validate().unwrap();

        assert!(tree.remove_window(&c));
        tree.recalculate(AREA, 10, 0, None);
        assert_eq!(tree.shape(), before);
        tree.validate().unwrap();
    }

    #[test]
    fn remove_merges_the_parent_away() {
        let mut tree = DwindleTree::new();
        let (a, b) = (window(), window());
        tree.insert_window(a.clone(), None, None, &config());
        tree.recalculate(AREA, 10, 0, None);
        tree.insert_window(b.clone(), None, None, &config());
        tree.recalculate(AREA, 10, 0, None);

        assert!(tree.remove_window(&b));
        tree.recalculate(AREA, 10, 0, None);
        assert_eq!(tree.leaves_with_rects(), vec![(a, AREA)]);
        tree.validate().unwrap();
    }

    #[test]
    fn removing_an_unknown_window_is_refused() {
        let mut tree = DwindleTree::new();
        tree.insert_window(window(), None, None, &config());
        assert!(!tree.remove_window(&window()));
        assert_eq!(tree.window_count(), 1);
    }

    #[test]
    fn swap_exchanges_only_the_windows() {
        let mut tree = DwindleTree::new();
        let (a, b) = (window(), window());
        tree.insert_window(a.clone(), None, None, &config());
        tree.recalculate(AREA, 0, 0, None);
        tree.insert_window(b.clone(), None, None, &config());
        tree.recalculate(AREA, 0, 0, None);
        let rects_before: Vec<_> = tree.leaves_with_rects().iter().map(|(_, r)| *r).collect();

        assert!(tree.swap_windows(&a, &b));
        tree.recalculate(AREA, 0, 0, None);
        let leaves = tree.leaves_with_rects();
        assert_eq!(leaves[0].0, b);
        assert_eq!(leaves[1].0, a);
        assert_eq!(
            leaves.iter().map(|(_, r)| *r).collect::<Vec<_>>(),
            rects_before
        );
        tree.validate().unwrap();
    }

    #[test]
    fn ratio_is_clamped_to_hints() {
        let mut tree = DwindleTree::new();
        let (a, b) = (window(), window());
        tree.insert_window(a.clone(), None, None, &config());
        tree.recalculate(AREA, 0, 0, None);
        tree.insert_window(b, None, None, &config());
        tree.recalculate(AREA, 0, 0, None);

        let container = tree.parent(tree.find_window(&a).unwrap()).unwrap();
        tree.adjust_split_ratio(container, 5.0, true);
        assert_eq!(tree.split_ratio(container), Some(0.9));
        tree.adjust_split_ratio(container, -5.0, false);
        assert_eq!(tree.split_ratio(container), Some(0.1));
        tree.validate().unwrap();
    }

    #[test]
    fn union_of_leaves_covers_the_area_minus_gaps() {
        let mut tree = DwindleTree::new();
        let windows: Vec<_> = (0..5).map(|_| window()).collect();
        for w in &windows {
            let target = tree.find_window(&windows[0]);
            tree.insert_window(w.clone(), target, None, &config());
            tree.recalculate(AREA, 10, 0, None);
        }
        tree.validate().unwrap();

        let leaves = tree.leaves_with_rects();
        // pairwise disjoint interiors
        for (i, (_, a)) in leaves.iter().enumerate() {
            for (_, b) in leaves.iter().skip(i + 1) {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
        // the tiled area is fully accounted for by tiles and gaps
        let tiles: i32 = leaves.iter().map(|(_, r)| r.width * r.height).sum();
        assert!(tiles < AREA.width * AREA.height);
        for (_, rect) in &leaves {
            assert!(rect.x >= AREA.x && rect.right() <= AREA.right());
            assert!(rect.y >= AREA.y && rect.bottom() <= AREA.bottom());
        }
    }

    #[test]
    fn directional_navigation_finds_the_adjacent_tile() {
        let mut tree = DwindleTree::new();
        let (a, b, c) = (window(), window(), window());
        tree.insert_window(a.clone(), None, None, &config());
        tree.recalculate(AREA, 10, 0, None);
        tree.insert_window(b.clone(), None, None, &config());
        tree.recalculate(AREA, 10, 0, None);
        // split a's tile vertically: a above, c below, b to the right
        let target = tree.find_window(&a);
        tree.insert_window(c.clone(), target, None, &config());
        tree.recalculate(AREA, 10, 0, None);

        assert_eq!(tree.directional_neighbor(&a, Direction::Right), Some(b.clone()));
        assert_eq!(tree.directional_neighbor(&a, Direction::Down), Some(c.clone()));
        assert_eq!(tree.directional_neighbor(&c, Direction::Up), Some(a.clone()));
        // b's center sits a hair closer to c's row than to a's
        assert_eq!(tree.directional_neighbor(&b, Direction::Left), Some(c.clone()));
        assert_eq!(tree.directional_neighbor(&b, Direction::Right), None);
        assert_eq!(tree.directional_neighbor(&a, Direction::Left), None);
    }

    #[test]
    fn a_forced_axis_overrides_the_smart_split() {
        let mut tree = DwindleTree::new();
        let (a, b) = (window(), window());
        tree.insert_window(a.clone(), None, None, &config());
        tree.recalculate(AREA, 0, 0, None);
        // the area is wide, but the hint forces a stack
        let leaf = tree.find_window(&a).unwrap();
        tree.set_force_split_axis(leaf, Some(Axis::Vertical));
        tree.insert_window(b.clone(), Some(leaf), None, &config());
        tree.recalculate(AREA, 0, 0, None);

        let leaves = tree.leaves_with_rects();
        assert_eq!(leaves[0], (a, Rectangle::new(0, 0, 1000, 300)));
        assert_eq!(leaves[1], (b, Rectangle::new(0, 300, 1000, 300)));
    }

    #[test]
    fn cyclic_navigation_wraps() {
        let mut tree = DwindleTree::new();
        let (a, b, c) = (window(), window(), window());
        for w in [&a, &b, &c] {
            tree.insert_window(w.clone(), None, None, &config());
            tree.recalculate(AREA, 10, 0, None);
        }

        let order = tree.leaf_windows();
        let last = order.last().unwrap().clone();
        assert_eq!(tree.next_window(&last, false), Some(order[0].clone()));
        assert_eq!(tree.next_window(&order[0], true), Some(last));
    }

    #[test]
    fn recalculate_records_animation_targets() {
        let mut tree = DwindleTree::new();
        let a = window();
        tree.insert_window(a.clone(), None, None, &config());
        tree.recalculate(AREA, 10, 100, Some(250));
        // first layout: nothing to animate from
        let leaf = tree.find_window(&a).unwrap();
        assert_eq!(tree.node_animation(leaf), None);

        let smaller = Rectangle::new(0, 0, 500, 600);
        tree.recalculate(smaller, 10, 200, Some(250));
        assert_eq!(tree.node_animation(leaf), Some((smaller, 200, 250)));

        // unchanged geometry clears the record
        tree.recalculate(smaller, 10, 300, Some(250));
        assert_eq!(tree.node_animation(leaf), None);
    }
}
