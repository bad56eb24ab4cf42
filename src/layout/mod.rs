//! Layout dispatch.
//!
//! Window arrangement is pluggable: every layout implements the [`Layout`]
//! trait and the [`LayoutManager`] dispatches to whichever one is active.
//! Dispatch happens per workspace and per event, not per window access, so
//! the virtual-call cost is negligible.
//!
//! Only the dwindle layout (see [`dwindle`]) ships with this crate; the
//! other [`LayoutKind`]s are namespace reservations a compositor can
//! register its own implementations under.

use std::fmt;

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::adapter::SceneGraph;
use crate::gaps::GapValues;
use crate::utils::{Direction, Rectangle, ResizeCorner, Size};
use crate::window::Window;
use crate::workspace::Workspace;
use crate::CoreError;

pub mod dwindle;

pub use self::dwindle::DwindleLayout;

/// The set of layout slots known to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// Binary-space-partition tiling
    Dwindle,
    /// Master/stack tiling
    Master,
    /// Regular grid
    Grid,
    /// Spiral tiling
    Spiral,
    /// No tiling at all
    Floating,
    /// A compositor-provided layout
    Custom,
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LayoutKind::Dwindle => "dwindle",
            LayoutKind::Master => "master",
            LayoutKind::Grid => "grid",
            LayoutKind::Spiral => "spiral",
            LayoutKind::Floating => "floating",
            LayoutKind::Custom => "custom",
        })
    }
}

/// Per-window rendering hints a layout may request from the renderer
#[derive(Debug, Clone, Copy)]
pub struct RenderHints {
    /// Draw the border as a gradient
    pub border_gradient: bool,
    /// Treat the window as opaque regardless of its buffer format
    pub force_opaque: bool,
    /// Suppress rounded corners for this window
    pub disable_rounded_corners: bool,
    /// The layout draws its own shadow for this window
    pub custom_shadow: bool,
    /// Alpha the renderer should apply on top of the window's own opacity
    pub alpha_override: f32,
}

impl Default for RenderHints {
    fn default() -> Self {
        RenderHints {
            border_gradient: false,
            force_opaque: false,
            disable_rounded_corners: false,
            custom_shadow: false,
            alpha_override: 1.0,
        }
    }
}

/// Everything a layout needs to turn tree state into window geometry.
///
/// Built by the shell for each dispatched call; `area` is the output's
/// usable rectangle (reserved insets already subtracted) and `gaps` the
/// current values of the output's gap state.
pub struct LayoutContext<'a> {
    /// Usable rectangle of the workspace's output
    pub area: Rectangle,
    /// Current gap values of the output
    pub gaps: GapValues,
    /// Current timestamp, for geometry animation targets
    pub now_ms: u32,
    /// The downstream scene graph, for node repositioning
    pub scene: &'a mut dyn SceneGraph,
}

impl fmt::Debug for LayoutContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutContext")
            .field("area", &self.area)
            .field("gaps", &self.gaps)
            .field("now_ms", &self.now_ms)
            .finish_non_exhaustive()
    }
}

/// A window arrangement strategy.
///
/// Implementations keep their own per-workspace data; the shell guarantees
/// that all calls happen from the single dispatch task and that windows
/// survive layout switches.
pub trait Layout: fmt::Debug {
    /// The slot this layout registers under
    fn kind(&self) -> LayoutKind;

    /// The human-readable name of this layout
    fn name(&self) -> &str;

    /// Called when this layout becomes the active one
    fn on_enable(&mut self) {}

    /// Called when another layout takes over
    fn on_disable(&mut self) {}

    /// A window appeared on `workspace`.
    ///
    /// The default forwards tiled windows to
    /// [`Layout::on_window_created_tiling`] and ignores floating ones.
    fn on_window_created(
        &mut self,
        workspace: &Workspace,
        window: &Window,
        direction: Option<Direction>,
    ) {
        if !window.is_floating() {
            self.on_window_created_tiling(workspace, window, direction);
        }
    }

    /// A tiled window appeared on `workspace` and wants a tile
    fn on_window_created_tiling(
        &mut self,
        workspace: &Workspace,
        window: &Window,
        direction: Option<Direction>,
    );

    /// A window disappeared from `workspace`
    fn on_window_removed(&mut self, workspace: &Workspace, window: &Window) {
        if !window.is_floating() {
            self.on_window_removed_tiling(workspace, window);
        }
    }

    /// A tiled window disappeared and its tile should be reclaimed
    fn on_window_removed_tiling(&mut self, workspace: &Workspace, window: &Window);

    /// Keyboard focus moved to `window`
    fn on_window_focus_change(&mut self, _workspace: &Workspace, _window: &Window) {}

    /// Whether this layout manages `window` as a tile
    fn is_window_tiled(&self, window: &Window) -> bool;

    /// Recompute and commit geometry for every tile of `workspace`
    fn recalculate_workspace(&mut self, workspace: &Workspace, ctx: &mut LayoutContext<'_>);

    /// Recompute geometry after a change localized to `window`.
    ///
    /// Recalculating the whole workspace is always correct; that is the
    /// default.
    fn recalculate_window(
        &mut self,
        workspace: &Workspace,
        _window: &Window,
        ctx: &mut LayoutContext<'_>,
    ) {
        self.recalculate_workspace(workspace, ctx);
    }

    /// Recompute every given workspace of one monitor
    fn recalculate_monitor(&mut self, workspaces: &[Workspace], ctx: &mut LayoutContext<'_>) {
        for workspace in workspaces {
            self.recalculate_workspace(workspace, ctx);
        }
    }

    /// Resize `window` by dragging the given corner by `(delta_x, delta_y)`
    fn resize_active_window(
        &mut self,
        workspace: &Workspace,
        window: &Window,
        delta_x: f64,
        delta_y: f64,
        corner: ResizeCorner,
        ctx: &mut LayoutContext<'_>,
    );

    /// Exchange the positions of two windows
    fn switch_windows(
        &mut self,
        workspace: &Workspace,
        a: &Window,
        b: &Window,
        ctx: &mut LayoutContext<'_>,
    );

    /// Move `window` one tile in `direction`.
    ///
    /// With `silent` set the caller will not shift focus to follow the
    /// window. Layouts without a concept of direction return
    /// [`CoreError::NotSupported`].
    fn move_window_to(
        &mut self,
        _workspace: &Workspace,
        _window: &Window,
        _direction: Direction,
        _silent: bool,
        _ctx: &mut LayoutContext<'_>,
    ) -> Result<(), CoreError> {
        Err(CoreError::NotSupported {
            layout: "generic",
        })
    }

    /// Adjust the split ratio of the container holding `window`.
    ///
    /// With `exact` set, `ratio` replaces the current value; otherwise it
    /// is added to it.
    fn alter_split_ratio(
        &mut self,
        workspace: &Workspace,
        window: &Window,
        ratio: f32,
        exact: bool,
        ctx: &mut LayoutContext<'_>,
    );

    /// The window focus should move to after `current`, if any.
    ///
    /// Layouts without an ordering return `None`.
    fn next_window_candidate(&self, workspace: &Workspace, current: &Window) -> Option<Window>;

    /// Rendering hints for `window`
    fn render_hints(&self, _window: &Window) -> RenderHints {
        RenderHints::default()
    }

    /// The size a new tiled window is expected to receive
    fn predict_size_for_new_window_tiled(&self) -> Size {
        Size::new(800, 600)
    }

    /// Check this layout's internal invariants for `workspace`.
    ///
    /// Purely observational; implementations must not repair anything.
    fn validate_workspace(&self, _workspace: &Workspace) -> Result<(), CoreError> {
        Ok(())
    }
}

/// Owns the registered layouts and the choice of the active one
#[derive(Debug)]
pub struct LayoutManager {
    layouts: IndexMap<LayoutKind, Box<dyn Layout>>,
    current: LayoutKind,
}

impl Default for LayoutManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutManager {
    /// Create a manager with the dwindle layout registered and active
    pub fn new() -> LayoutManager {
        let mut layouts: IndexMap<LayoutKind, Box<dyn Layout>> = IndexMap::new();
        let mut dwindle = DwindleLayout::new();
        dwindle.on_enable();
        layouts.insert(LayoutKind::Dwindle, Box::new(dwindle));
        LayoutManager {
            layouts,
            current: LayoutKind::Dwindle,
        }
    }

    /// Register (or replace) a layout implementation.
    ///
    /// Replacing the active layout is rejected; switch away first.
    pub fn register(&mut self, layout: Box<dyn Layout>) -> Result<(), CoreError> {
        let kind = layout.kind();
        if kind == self.current && self.layouts.contains_key(&kind) {
            return Err(CoreError::invalid(format!(
                "cannot replace the active layout {kind}"
            )));
        }
        info!(layout = %kind, "registering layout");
        self.layouts.insert(kind, layout);
        Ok(())
    }

    /// Make another layout the active one.
    ///
    /// The outgoing layout is disabled before the incoming one is enabled.
    /// Windows are not destroyed by a switch; the caller is expected to
    /// recalculate afterwards.
    pub fn switch_to(&mut self, kind: LayoutKind) -> Result<(), CoreError> {
        if kind == self.current {
            return Ok(());
        }
        if !self.layouts.contains_key(&kind) {
            warn!(layout = %kind, "switch to unregistered layout rejected");
            return Err(CoreError::invalid(format!("no {kind} layout registered")));
        }
        self.layouts
            .get_mut(&self.current)
            .expect("current layout is always registered")
            .on_disable();
        self.current = kind;
        self.layouts
            .get_mut(&self.current)
            .expect("just checked the key")
            .on_enable();
        info!(layout = %kind, "switched layout");
        Ok(())
    }

    /// The kind of the active layout
    pub fn current_kind(&self) -> LayoutKind {
        self.current
    }

    /// The active layout
    pub fn current(&self) -> &dyn Layout {
        &**self
            .layouts
            .get(&self.current)
            .expect("current layout is always registered")
    }

    /// The active layout, mutably
    pub fn current_mut(&mut self) -> &mut dyn Layout {
        &mut **self
            .layouts
            .get_mut(&self.current)
            .expect("current layout is always registered")
    }

    /// Look up a registered layout by kind
    pub fn get(&self, kind: LayoutKind) -> Option<&dyn Layout> {
        self.layouts.get(&kind).map(|l| &**l)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug)]
    struct RecordingLayout {
        kind: LayoutKind,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingLayout {
        fn push(&self, event: &str) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{event}", self.kind));
        }
    }

    impl Layout for RecordingLayout {
        fn kind(&self) -> LayoutKind {
            self.kind
        }
        fn name(&self) -> &str {
            "recording"
        }
        fn on_enable(&mut self) {
            self.push("enable");
        }
        fn on_disable(&mut self) {
            self.push("disable");
        }
        fn on_window_created_tiling(
            &mut self,
            _workspace: &Workspace,
            _window: &Window,
            _direction: Option<Direction>,
        ) {
        }
        fn on_window_removed_tiling(&mut self, _workspace: &Workspace, _window: &Window) {}
        fn is_window_tiled(&self, _window: &Window) -> bool {
            false
        }
        fn recalculate_workspace(&mut self, _workspace: &Workspace, _ctx: &mut LayoutContext<'_>) {}
        fn resize_active_window(
            &mut self,
            _workspace: &Workspace,
            _window: &Window,
            _delta_x: f64,
            _delta_y: f64,
            _corner: ResizeCorner,
            _ctx: &mut LayoutContext<'_>,
        ) {
        }
        fn switch_windows(
            &mut self,
            _workspace: &Workspace,
            _a: &Window,
            _b: &Window,
            _ctx: &mut LayoutContext<'_>,
        ) {
        }
        fn alter_split_ratio(
            &mut self,
            _workspace: &Workspace,
            _window: &Window,
            _ratio: f32,
            _exact: bool,
            _ctx: &mut LayoutContext<'_>,
        ) {
        }
        fn next_window_candidate(&self, _workspace: &Workspace, _current: &Window) -> Option<Window> {
            None
        }
    }

    #[test]
    fn switching_disables_the_outgoing_layout_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut manager = LayoutManager::new();
        manager
            .register(Box::new(RecordingLayout {
                kind: LayoutKind::Grid,
                log: log.clone(),
            }))
            .unwrap();
        manager
            .register(Box::new(RecordingLayout {
                kind: LayoutKind::Master,
                log: log.clone(),
            }))
            .unwrap();

        manager.switch_to(LayoutKind::Grid).unwrap();
        manager.switch_to(LayoutKind::Master).unwrap();
        assert_eq!(
            log.lock().unwrap().as_slice(),
            ["grid:enable", "grid:disable", "master:enable"]
        );
        assert_eq!(manager.current_kind(), LayoutKind::Master);
    }

    #[test]
    fn switching_to_an_unregistered_kind_fails() {
        let mut manager = LayoutManager::new();
        assert!(manager.switch_to(LayoutKind::Spiral).is_err());
        assert_eq!(manager.current_kind(), LayoutKind::Dwindle);
    }

    #[test]
    fn replacing_the_active_layout_is_rejected() {
        let mut manager = LayoutManager::new();
        let result = manager.register(Box::new(DwindleLayout::new()));
        assert!(matches!(result, Err(CoreError::InvalidArgument { .. })));
    }
}
