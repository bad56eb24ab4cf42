//! The dwindle layout: binary-space-partition tiling.
//!
//! Each workspace gets its own BSP tree; inserting a window splits the
//! focused tile along its longer axis, removing one merges the emptied
//! container away. Workspace state, the per-workspace tree data, and the
//! layout are three distinct types: the layout owns the tree data in a map
//! keyed by [`WorkspaceId`], nothing is reached through casts.

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::utils::{Axis, Direction, ReservedArea, ResizeCorner, Size};
use crate::window::Window;
use crate::workspace::{Workspace, WorkspaceId};
use crate::CoreError;

use super::{Layout, LayoutContext, LayoutKind};

mod tree;

use tree::DwindleTree;

/// Tunables of the dwindle layout
#[derive(Debug, Clone)]
pub struct DwindleConfig {
    /// Split the longer axis of the target tile instead of always
    /// splitting horizontally
    pub smart_split: bool,
    /// Split the focused tile; with this off new windows always split the
    /// whole tree
    pub use_active_for_splits: bool,
    /// Ratio a fresh split starts out with
    pub default_split_ratio: f32,
    /// Lower clamp for split ratios
    pub min_split_ratio: f32,
    /// Upper clamp for split ratios
    pub max_split_ratio: f32,
    /// Skip the outer gaps while a workspace holds a single window
    pub no_gaps_when_only: bool,
    /// Record transition targets for tiles whose rectangle changed
    pub animate_splits: bool,
    /// Duration of those transitions, in milliseconds
    pub split_animation_duration: u32,
}

impl Default for DwindleConfig {
    fn default() -> Self {
        DwindleConfig {
            smart_split: true,
            use_active_for_splits: true,
            default_split_ratio: 0.5,
            min_split_ratio: 0.1,
            max_split_ratio: 0.9,
            no_gaps_when_only: false,
            animate_splits: true,
            split_animation_duration: 250,
        }
    }
}

/// Counters kept while the layout runs
#[derive(Debug, Clone, Copy, Default)]
pub struct DwindleStats {
    /// Number of splits performed
    pub total_splits: u32,
    /// Number of merges performed
    pub total_merges: u32,
    /// Number of workspace recalculations
    pub total_recalcs: u32,
}

#[derive(Debug, Default)]
struct DwindleData {
    tree: DwindleTree,
    focused: Option<Window>,
}

/// The dwindle [`Layout`] implementation
#[derive(Debug, Default)]
pub struct DwindleLayout {
    config: DwindleConfig,
    data: IndexMap<WorkspaceId, DwindleData>,
    stats: DwindleStats,
}

impl DwindleLayout {
    /// Create a dwindle layout with default configuration
    pub fn new() -> DwindleLayout {
        DwindleLayout::default()
    }

    /// Create a dwindle layout with the given configuration
    pub fn with_config(config: DwindleConfig) -> DwindleLayout {
        DwindleLayout {
            config,
            ..DwindleLayout::default()
        }
    }

    /// The active configuration
    pub fn config(&self) -> &DwindleConfig {
        &self.config
    }

    /// Mutable access to the configuration.
    ///
    /// Changes apply from the next operation on; recalculate afterwards.
    pub fn config_mut(&mut self) -> &mut DwindleConfig {
        &mut self.config
    }

    /// Counters accumulated since creation
    pub fn stats(&self) -> DwindleStats {
        self.stats
    }

    /// Log the accumulated counters at info level
    pub fn log_statistics(&self) {
        info!(
            splits = self.stats.total_splits,
            merges = self.stats.total_merges,
            recalcs = self.stats.total_recalcs,
            "dwindle layout statistics"
        );
    }

    /// The next (or, with `reverse`, the previous) window in tile order,
    /// wrapping at the ends
    pub fn next_window(
        &self,
        workspace: WorkspaceId,
        current: &Window,
        reverse: bool,
    ) -> Option<Window> {
        self.data
            .get(&workspace)
            .and_then(|data| data.tree.next_window(current, reverse))
    }

    /// Pin the split axis used the next time `window`'s tile is split,
    /// overriding the smart rule. `None` restores it.
    pub fn set_force_split_axis(
        &mut self,
        workspace: WorkspaceId,
        window: &Window,
        axis: Option<Axis>,
    ) {
        let data = self.data_mut(workspace);
        let Some(leaf) = data.tree.find_window(window) else {
            warn!(window = window.id(), "split-axis hint for a window outside the tree");
            return;
        };
        data.tree.set_force_split_axis(leaf, axis);
    }

    fn data_mut(&mut self, workspace: WorkspaceId) -> &mut DwindleData {
        self.data.entry(workspace).or_default()
    }
}

impl Layout for DwindleLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Dwindle
    }

    fn name(&self) -> &str {
        "dwindle"
    }

    fn on_enable(&mut self) {
        info!("dwindle layout enabled");
    }

    fn on_disable(&mut self) {
        info!("dwindle layout disabled");
    }

    fn on_window_created_tiling(
        &mut self,
        workspace: &Workspace,
        window: &Window,
        direction: Option<Direction>,
    ) {
        let config = self.config.clone();
        let data = self.data_mut(workspace.id());
        if data.tree.find_window(window).is_some() {
            warn!(window = window.id(), "window already tiled, ignoring insert");
            return;
        }

        let target = if config.use_active_for_splits {
            data.focused
                .as_ref()
                .and_then(|focused| data.tree.find_window(focused))
        } else {
            None
        };
        let was_empty = data.tree.is_empty();
        data.tree
            .insert_window(window.clone(), target, direction, &config);
        if was_empty {
            data.focused = Some(window.clone());
        }
        self.stats.total_splits += 1;
        debug!(
            window = window.id(),
            workspace = workspace.id().0,
            "inserted window into dwindle tree"
        );
    }

    fn on_window_removed_tiling(&mut self, workspace: &Workspace, window: &Window) {
        let data = self.data_mut(workspace.id());
        if !data.tree.remove_window(window) {
            warn!(window = window.id(), "window not found in dwindle tree");
            return;
        }
        if data.focused.as_ref() == Some(window) {
            data.focused = None;
        }
        self.stats.total_merges += 1;
        debug!(
            window = window.id(),
            workspace = workspace.id().0,
            "removed window from dwindle tree"
        );
    }

    fn on_window_focus_change(&mut self, workspace: &Workspace, window: &Window) {
        self.data_mut(workspace.id()).focused = Some(window.clone());
    }

    fn is_window_tiled(&self, window: &Window) -> bool {
        !window.is_floating()
    }

    #[profiling::function]
    fn recalculate_workspace(&mut self, workspace: &Workspace, ctx: &mut LayoutContext<'_>) {
        let animate = self
            .config
            .animate_splits
            .then_some(self.config.split_animation_duration);
        let no_gaps_when_only = self.config.no_gaps_when_only;
        let (windows, depth, animating) = {
            let data = self.data_mut(workspace.id());
            if data.tree.is_empty() {
                return;
            }

            let mut area = ctx.area;
            if !(no_gaps_when_only && data.tree.window_count() == 1) {
                area = area.shrink(&ReservedArea {
                    top: ctx.gaps.top,
                    bottom: ctx.gaps.bottom,
                    left: ctx.gaps.left,
                    right: ctx.gaps.right,
                });
            }

            data.tree
                .recalculate(area, ctx.gaps.inner, ctx.now_ms, animate);
            for (window, rect) in data.tree.leaves_with_rects() {
                if window.is_maximized() || window.is_fullscreen() {
                    // pinned geometry, the tile is kept for the restore
                    continue;
                }
                window.commit_geometry(rect);
                if let Some(node) = window.scene_node() {
                    ctx.scene.set_position(node, rect.loc());
                }
            }
            (
                data.tree.window_count(),
                data.tree.depth(),
                data.tree.animating_nodes(),
            )
        };
        self.stats.total_recalcs += 1;
        debug!(
            workspace = workspace.id().0,
            windows,
            depth,
            animating,
            "recalculated dwindle tree"
        );
    }

    fn resize_active_window(
        &mut self,
        workspace: &Workspace,
        window: &Window,
        delta_x: f64,
        delta_y: f64,
        _corner: ResizeCorner,
        ctx: &mut LayoutContext<'_>,
    ) {
        let data = self.data_mut(workspace.id());
        let Some(leaf) = data.tree.find_window(window) else {
            warn!(window = window.id(), "resize of a window outside the tree");
            return;
        };
        let Some(parent) = data.tree.parent(leaf) else {
            // a lone window fills the workspace, nothing to resize against
            return;
        };

        let parent_rect = data.tree.node_rect(parent);
        let second_child = data.tree.second_child(parent) == Some(leaf);
        let mut delta = match data.tree.split_axis(parent) {
            Some(Axis::Horizontal) => delta_x as f32 / parent_rect.width.max(1) as f32,
            Some(Axis::Vertical) => delta_y as f32 / parent_rect.height.max(1) as f32,
            None => return,
        };
        if second_child {
            delta = -delta;
        }
        data.tree.adjust_split_ratio(parent, delta, false);
        self.recalculate_workspace(workspace, ctx);
    }

    fn switch_windows(
        &mut self,
        workspace: &Workspace,
        a: &Window,
        b: &Window,
        ctx: &mut LayoutContext<'_>,
    ) {
        let data = self.data_mut(workspace.id());
        if !data.tree.swap_windows(a, b) {
            warn!(a = a.id(), b = b.id(), "switch with a window outside the tree");
            return;
        }
        self.recalculate_workspace(workspace, ctx);
    }

    fn move_window_to(
        &mut self,
        workspace: &Workspace,
        window: &Window,
        direction: Direction,
        _silent: bool,
        ctx: &mut LayoutContext<'_>,
    ) -> Result<(), CoreError> {
        let data = self.data_mut(workspace.id());
        let Some(neighbor) = data.tree.directional_neighbor(window, direction) else {
            warn!(window = window.id(), %direction, "no neighbor in that direction");
            return Ok(());
        };
        data.tree.swap_windows(window, &neighbor);
        self.recalculate_workspace(workspace, ctx);
        Ok(())
    }

    fn alter_split_ratio(
        &mut self,
        workspace: &Workspace,
        window: &Window,
        ratio: f32,
        exact: bool,
        ctx: &mut LayoutContext<'_>,
    ) {
        let data = self.data_mut(workspace.id());
        let parent = data
            .tree
            .find_window(window)
            .and_then(|leaf| data.tree.parent(leaf));
        let Some(parent) = parent else {
            warn!(window = window.id(), "no container to alter the ratio of");
            return;
        };
        data.tree.adjust_split_ratio(parent, ratio, exact);
        self.recalculate_workspace(workspace, ctx);
    }

    fn next_window_candidate(&self, workspace: &Workspace, current: &Window) -> Option<Window> {
        self.data
            .get(&workspace.id())
            .and_then(|data| data.tree.next_window(current, false))
    }

    fn predict_size_for_new_window_tiled(&self) -> Size {
        Size::new(800, 600)
    }

    fn validate_workspace(&self, workspace: &Workspace) -> Result<(), CoreError> {
        let Some(data) = self.data.get(&workspace.id()) else {
            return Ok(());
        };
        data.tree.validate()?;

        // exactly one leaf per tiled window of the workspace
        let tree_windows = data.tree.leaf_windows();
        for window in workspace.windows() {
            let tiled = !window.is_floating();
            let in_tree = tree_windows.contains(&window);
            if tiled && !in_tree {
                return Err(CoreError::invariant(
                    "dwindle",
                    format!("tiled window {} has no leaf", window.id()),
                ));
            }
            if !tiled && in_tree {
                return Err(CoreError::invariant(
                    "dwindle",
                    format!("floating window {} sits in the tree", window.id()),
                ));
            }
        }
        Ok(())
    }
}
