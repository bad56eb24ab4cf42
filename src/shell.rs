//! The shell: the surface the embedding compositor drives.
//!
//! [`Shell`] owns the window/workspace/output collections and the four core
//! engines (layout dispatch, window rules, smart gaps, effects), and wires
//! the external adapters through them. Every entry point runs to completion
//! on the caller's dispatch task before returning; ordering inside window
//! creation is fixed: rules apply, the tree inserts, geometry recalculates,
//! then the scene is committed.

use smallvec::SmallVec;
use tracing::{debug, error, info, warn};

use crate::adapter::{EffectsRenderer, SceneGraph};
use crate::effects::EffectsManager;
use crate::gaps::{GapContext, SmartGaps};
use crate::layout::{LayoutContext, LayoutKind, LayoutManager, RenderHints};
use crate::output::{Output, OutputId};
use crate::rules::{RuleApplyEnv, RulesManager};
use crate::utils::{Clock, Direction, Point, Rectangle, ResizeCorner};
use crate::window::Window;
use crate::workspace::{Workspace, WorkspaceId};
use crate::CoreError;

/// Frame ticks between two runs of the observational tree validator
const VALIDATE_EVERY_FRAMES: u64 = 600;

/// The compositor-facing entry point of the window-management core
#[derive(Debug)]
pub struct Shell {
    scene: Box<dyn SceneGraph>,
    renderer: Box<dyn EffectsRenderer>,
    outputs: Vec<Output>,
    workspaces: Vec<Workspace>,
    visible: Vec<(OutputId, WorkspaceId)>,
    windows: Vec<Window>,
    focused: Option<Window>,
    active_output: Option<OutputId>,
    layouts: LayoutManager,
    rules: RulesManager,
    gaps: SmartGaps,
    effects: EffectsManager,
    clock: Clock,
    next_workspace_id: u32,
    frame_counter: u64,
}

impl Shell {
    /// Create a shell around the compositor's scene graph and effects
    /// renderer.
    ///
    /// The built-in default rules and gap profiles are installed; replace
    /// them through [`Shell::load_rules_file`] and the accessors.
    pub fn new(scene: Box<dyn SceneGraph>, renderer: Box<dyn EffectsRenderer>) -> Shell {
        Shell {
            scene,
            renderer,
            outputs: Vec::new(),
            workspaces: Vec::new(),
            visible: Vec::new(),
            windows: Vec::new(),
            focused: None,
            active_output: None,
            layouts: LayoutManager::new(),
            rules: RulesManager::with_defaults(),
            gaps: SmartGaps::new(),
            effects: EffectsManager::new(),
            clock: Clock::new(),
            next_workspace_id: 0,
            frame_counter: 0,
        }
    }

    /// The layout dispatcher
    pub fn layouts(&self) -> &LayoutManager {
        &self.layouts
    }

    /// The layout dispatcher, mutably
    pub fn layouts_mut(&mut self) -> &mut LayoutManager {
        &mut self.layouts
    }

    /// The rules engine
    pub fn rules(&self) -> &RulesManager {
        &self.rules
    }

    /// The rules engine, mutably
    pub fn rules_mut(&mut self) -> &mut RulesManager {
        &mut self.rules
    }

    /// The gap engine
    pub fn gaps(&self) -> &SmartGaps {
        &self.gaps
    }

    /// The gap engine, mutably
    pub fn gaps_mut(&mut self) -> &mut SmartGaps {
        &mut self.gaps
    }

    /// The effects controller
    pub fn effects(&self) -> &EffectsManager {
        &self.effects
    }

    /// The effects controller, mutably
    pub fn effects_mut(&mut self) -> &mut EffectsManager {
        &mut self.effects
    }

    /// The known outputs
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// The known workspaces
    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    /// The known windows, in creation order
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// The window holding keyboard focus, if any
    pub fn focused_window(&self) -> Option<&Window> {
        self.focused.as_ref()
    }

    /// Look up a workspace by id
    pub fn workspace(&self, id: WorkspaceId) -> Option<&Workspace> {
        self.workspaces.iter().find(|ws| ws.id() == id)
    }

    /// The workspace currently shown on an output
    pub fn visible_workspace(&self, output: OutputId) -> Option<&Workspace> {
        self.visible
            .iter()
            .find(|(o, _)| *o == output)
            .and_then(|(_, ws)| self.workspace(*ws))
    }

    /// Register an output and give it an initial, visible workspace.
    ///
    /// The first output registered becomes the active one.
    pub fn add_output(&mut self, output: Output) -> WorkspaceId {
        let output_id = output.id();
        info!(output = %output.name(), "output added");
        self.outputs.push(output);
        if self.active_output.is_none() {
            self.active_output = Some(output_id);
        }
        let workspace = self.create_workspace_internal(output_id);
        self.visible.push((output_id, workspace));
        workspace
    }

    /// Create an additional workspace on an output
    pub fn create_workspace(&mut self, output: OutputId) -> Result<WorkspaceId, CoreError> {
        if !self.outputs.iter().any(|o| o.id() == output) {
            return Err(CoreError::invalid("workspace on an unknown output"));
        }
        Ok(self.create_workspace_internal(output))
    }

    fn create_workspace_internal(&mut self, output: OutputId) -> WorkspaceId {
        let id = WorkspaceId(self.next_workspace_id);
        self.next_workspace_id += 1;
        let name = format!("workspace_{}", id.0);
        debug!(workspace = %name, "workspace created");
        self.workspaces.push(Workspace::new(id, name, output));
        id
    }

    fn output(&self, id: OutputId) -> Option<&Output> {
        self.outputs.iter().find(|o| o.id() == id)
    }

    fn gap_context(&self, output: &Output) -> GapContext {
        let visible = self.visible_workspace(output.id());
        let focused_here = self
            .focused
            .as_ref()
            .and_then(|w| w.output())
            .map(|o| o == output.id())
            .unwrap_or(false);
        GapContext {
            window_count: visible.map(|ws| ws.window_count()).unwrap_or(0),
            tiled_count: visible.map(|ws| ws.tiled_count()).unwrap_or(0),
            floating_count: visible.map(|ws| ws.floating_count()).unwrap_or(0),
            has_fullscreen: visible.map(|ws| ws.has_fullscreen()).unwrap_or(false),
            focused: focused_here,
            screen_size: output.geometry().size(),
            density: output.dpi(),
            workspace_name: visible.map(|ws| ws.name().to_owned()).unwrap_or_default(),
            output_name: output.name().to_owned(),
        }
    }

    /// Rebuild the gap context of an output and re-adapt its gap state
    fn refresh_gaps(&mut self, output: OutputId) -> bool {
        let Some(output_handle) = self.output(output).cloned() else {
            return false;
        };
        let context = self.gap_context(&output_handle);
        let now = self.clock.now_ms();
        self.gaps.update_output(output, &context, now)
    }

    fn recalculate_workspace(&mut self, workspace: WorkspaceId) {
        let Some(ws) = self.workspace(workspace).cloned() else {
            return;
        };
        let Some(output) = self.output(ws.output()).cloned() else {
            return;
        };
        let gaps = self.gaps.current_values(output.id());
        let now_ms = self.clock.now_ms();
        let Shell { scene, layouts, .. } = self;
        let mut ctx = LayoutContext {
            area: output.usable_geometry(),
            gaps,
            now_ms,
            scene: scene.as_mut(),
        };
        layouts.current_mut().recalculate_workspace(&ws, &mut ctx);
    }

    fn refresh_and_recalculate(&mut self, workspace: WorkspaceId) {
        let output = self.workspace(workspace).map(|ws| ws.output());
        if let Some(output) = output {
            self.refresh_gaps(output);
        }
        self.recalculate_workspace(workspace);
    }

    /// A new toplevel appeared.
    ///
    /// The window is classified by the rules engine, inserted into its
    /// workspace and layout, given effect resources, and the affected
    /// workspace is recalculated.
    pub fn handle_new_window(&mut self, window: Window, direction: Option<Direction>) {
        let Some(active) = self.active_output else {
            warn!(window = window.id(), "new window without any output, ignoring");
            return;
        };
        let output = self
            .output(active)
            .cloned()
            .expect("the active output is always registered");
        info!(window = window.id(), "new window");
        self.windows.push(window.clone());

        // rule-free default placement: the predicted tile size, centered
        let usable = output.usable_geometry();
        let predicted = self.layouts.current().predict_size_for_new_window_tiled();
        window.set_geometry(Rectangle::from_loc_and_size(
            Point::new(
                usable.x + (usable.width - predicted.w) / 2,
                usable.y + (usable.height - predicted.h) / 2,
            ),
            predicted,
        ));

        let known: SmallVec<[WorkspaceId; 8]> =
            self.workspaces.iter().map(|ws| ws.id()).collect();
        let outcome = {
            let Shell { scene, rules, .. } = self;
            let mut env = RuleApplyEnv {
                scene: scene.as_mut(),
                workspace_rect: usable,
                output_rect: output.geometry(),
                known_workspaces: &known,
            };
            rules.apply_to_window(&window, &mut env)
        };

        let target = outcome
            .as_ref()
            .and_then(|o| o.target_workspace)
            .or_else(|| self.visible_workspace(active).map(|ws| ws.id()));
        let Some(target) = target else {
            warn!(window = window.id(), "no workspace to place the window on");
            return;
        };
        let Some(ws) = self.workspace(target).cloned() else {
            return;
        };
        ws.add_window(&window);
        self.layouts
            .current_mut()
            .on_window_created(&ws, &window, direction);

        {
            let Shell {
                scene,
                renderer,
                effects,
                ..
            } = self;
            effects.init_window(&window, renderer.as_mut(), scene.as_mut());
            if let Some(outcome) = &outcome {
                effects.apply_rule_overrides(&window, outcome.effects);
            }
            let opacity = window.opacity();
            if opacity < 1.0 {
                effects.set_window_opacity(&window, opacity, scene.as_mut());
            }
        }

        self.refresh_and_recalculate(target);
        if window.is_floating() && !window.is_maximized() && !window.is_fullscreen() {
            // floating windows are not laid out, push their geometry now
            window.commit_geometry(window.geometry());
        }
    }

    /// A toplevel went away.
    ///
    /// Effects tear down with the window; its tile merges away and the
    /// workspace is recalculated.
    pub fn handle_window_destroyed(&mut self, window: &Window) {
        info!(window = window.id(), "window destroyed");
        {
            let Shell {
                scene,
                renderer,
                effects,
                ..
            } = self;
            effects.destroy_window(window, renderer.as_mut(), scene.as_mut());
        }
        if let Some(node) = window.scene_node() {
            self.scene.destroy(node);
            window.set_scene_node(None);
        }

        let workspace = window.workspace().and_then(|id| self.workspace(id).cloned());
        if let Some(ws) = workspace {
            self.layouts.current_mut().on_window_removed(&ws, window);
            ws.remove_window(window);
            self.windows.retain(|w| w != window);
            if self.focused.as_ref() == Some(window) {
                self.focused = None;
            }
            self.refresh_and_recalculate(ws.id());
        } else {
            self.windows.retain(|w| w != window);
            if self.focused.as_ref() == Some(window) {
                self.focused = None;
            }
        }
    }

    /// Keyboard focus moved.
    ///
    /// Rules are not re-applied; the layout learns the new split target,
    /// focus-dependent opacity and gaps re-adapt.
    pub fn handle_focus_change(&mut self, window: Option<&Window>) {
        if self.focused.as_ref() == window {
            return;
        }
        if let Some(previous) = self.focused.take() {
            let Shell { scene, effects, .. } = self;
            effects.on_focus_change(&previous, false, scene.as_mut());
        }
        self.focused = window.cloned();

        let Some(window) = window else {
            return;
        };
        debug!(window = window.id(), "focus changed");
        if let Some(ws) = window.workspace().and_then(|id| self.workspace(id).cloned()) {
            self.layouts.current_mut().on_window_focus_change(&ws, window);
        }
        {
            let Shell { scene, effects, .. } = self;
            effects.on_focus_change(window, true, scene.as_mut());
        }
        if let Some(output) = window.output() {
            self.active_output = Some(output);
            if self.refresh_gaps(output) {
                if let Some(ws) = self.visible_workspace(output).map(|ws| ws.id()) {
                    self.recalculate_workspace(ws);
                }
            }
        }
    }

    /// Show another workspace on its output
    pub fn handle_workspace_switch(&mut self, workspace: WorkspaceId) -> Result<(), CoreError> {
        let Some(ws) = self.workspace(workspace).cloned() else {
            warn!(workspace = workspace.0, "switch to unknown workspace");
            return Err(CoreError::invalid(format!(
                "workspace {} does not exist",
                workspace.0
            )));
        };
        let output = ws.output();
        for (o, visible) in self.visible.iter_mut() {
            if *o == output {
                *visible = workspace;
            }
        }
        self.active_output = Some(output);
        info!(workspace = workspace.0, "workspace switched");

        // only the visible workspace's windows stay enabled in the scene
        for candidate in &self.workspaces {
            if candidate.output() != output {
                continue;
            }
            let shown = candidate.id() == workspace;
            for window in candidate.windows() {
                if let Some(node) = window.scene_node() {
                    self.scene.set_enabled(node, shown);
                }
            }
        }

        self.refresh_gaps(output);
        self.recalculate_workspace(workspace);
        Ok(())
    }

    /// An output's geometry, insets or density changed; every workspace
    /// rooted on it is recalculated
    pub fn handle_output_changed(&mut self, output: OutputId) {
        let Some(output_handle) = self.output(output).cloned() else {
            warn!("change reported for an unknown output");
            return;
        };
        debug!(output = %output_handle.name(), "output changed");
        self.refresh_gaps(output);
        let affected: Vec<Workspace> = self
            .workspaces
            .iter()
            .filter(|ws| ws.output() == output)
            .cloned()
            .collect();
        let gaps = self.gaps.current_values(output);
        let now_ms = self.clock.now_ms();
        let Shell { scene, layouts, .. } = self;
        let mut ctx = LayoutContext {
            area: output_handle.usable_geometry(),
            gaps,
            now_ms,
            scene: scene.as_mut(),
        };
        layouts.current_mut().recalculate_monitor(&affected, &mut ctx);
    }

    /// A window entered or left fullscreen
    pub fn handle_fullscreen_toggle(&mut self, window: &Window, fullscreen: bool) {
        let Some(output) = window.output().and_then(|id| self.output(id).cloned()) else {
            warn!(window = window.id(), "fullscreen toggle for an unplaced window");
            return;
        };
        window.set_fullscreen(fullscreen, output.geometry());
        if let Some(node) = window.scene_node() {
            self.scene.set_position(node, window.geometry().loc());
        }
        if let Some(workspace) = window.workspace() {
            self.refresh_and_recalculate(workspace);
        }
    }

    /// Resize a tiled window by dragging `corner`
    pub fn resize_window(&mut self, window: &Window, delta_x: f64, delta_y: f64, corner: ResizeCorner) {
        self.with_layout_ctx(window, |layout, ws, ctx| {
            layout.resize_active_window(ws, window, delta_x, delta_y, corner, ctx);
        });
    }

    /// Exchange the tiles of two windows
    pub fn swap_windows(&mut self, a: &Window, b: &Window) {
        self.with_layout_ctx(a, |layout, ws, ctx| {
            layout.switch_windows(ws, a, b, ctx);
        });
    }

    /// Move a window one tile in `direction`
    pub fn move_window(
        &mut self,
        window: &Window,
        direction: Direction,
        silent: bool,
    ) -> Result<(), CoreError> {
        let mut result = Ok(());
        self.with_layout_ctx(window, |layout, ws, ctx| {
            result = layout.move_window_to(ws, window, direction, silent, ctx);
        });
        result
    }

    /// Adjust (or set, with `exact`) the split ratio above a window
    pub fn alter_split_ratio(&mut self, window: &Window, ratio: f32, exact: bool) {
        self.with_layout_ctx(window, |layout, ws, ctx| {
            layout.alter_split_ratio(ws, window, ratio, exact, ctx);
        });
    }

    /// The next focus candidate after `current` in the active layout
    pub fn next_window(&self, current: &Window) -> Option<Window> {
        let ws = current.workspace().and_then(|id| self.workspace(id))?;
        self.layouts.current().next_window_candidate(ws, current)
    }

    /// Rendering hints the active layout requests for a window
    pub fn render_hints(&self, window: &Window) -> RenderHints {
        self.layouts.current().render_hints(window)
    }

    /// Switch the active layout; windows survive, everything recalculates
    pub fn switch_layout(&mut self, kind: LayoutKind) -> Result<(), CoreError> {
        self.layouts.switch_to(kind)?;
        let all: SmallVec<[WorkspaceId; 8]> = self.workspaces.iter().map(|ws| ws.id()).collect();
        for workspace in all {
            self.recalculate_workspace(workspace);
        }
        Ok(())
    }

    fn with_layout_ctx(
        &mut self,
        window: &Window,
        f: impl FnOnce(&mut dyn crate::layout::Layout, &Workspace, &mut LayoutContext<'_>),
    ) {
        let Some(ws) = window.workspace().and_then(|id| self.workspace(id).cloned()) else {
            warn!(window = window.id(), "layout operation on an unplaced window");
            return;
        };
        let Some(output) = self.output(ws.output()).cloned() else {
            return;
        };
        let gaps = self.gaps.current_values(output.id());
        let now_ms = self.clock.now_ms();
        let Shell { scene, layouts, .. } = self;
        let mut ctx = LayoutContext {
            area: output.usable_geometry(),
            gaps,
            now_ms,
            scene: scene.as_mut(),
        };
        f(layouts.current_mut(), &ws, &mut ctx);
    }

    /// Load (or fall back to defaults) the rules file at `path`
    pub fn load_rules_file(&mut self, path: impl AsRef<std::path::Path>) -> Result<(), CoreError> {
        self.rules.load_file(path)
    }

    /// Re-parse the rules file; on failure the active rules stay in place
    pub fn reload_rules(&mut self) -> Result<(), CoreError> {
        self.rules.reload()
    }

    /// Advance one frame: gap animations step, due effect updates run, dirty
    /// shadow/blur targets render.
    ///
    /// Returns whether anything still wants a further frame.
    #[profiling::function]
    pub fn frame_tick(&mut self, now_ms: u32) -> bool {
        // gap animations first, so effect updates see final geometry
        let changed = self.gaps.tick(now_ms);
        for output in changed {
            if let Some(ws) = self.visible_workspace(output).map(|ws| ws.id()) {
                self.recalculate_workspace(ws);
            }
        }

        {
            let Shell {
                scene,
                renderer,
                effects,
                windows,
                ..
            } = self;
            for window in windows.iter() {
                if effects.update_window(window, now_ms, scene.as_mut()) {
                    effects.render_window(window, renderer.as_mut(), scene.as_mut(), now_ms);
                }
            }
        }
        self.effects.frame_done(now_ms);

        self.frame_counter += 1;
        if self.frame_counter % VALIDATE_EVERY_FRAMES == 0 {
            self.validate();
        }

        self.gaps.is_animating() || self.effects.any_pending(&self.windows)
    }

    /// Run the observational validators over every workspace, logging any
    /// violation. The state is never modified.
    pub fn validate(&self) {
        for workspace in &self.workspaces {
            if let Err(err) = self.layouts.current().validate_workspace(workspace) {
                error!(workspace = workspace.id().0, %err, "layout validation failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::adapter::{
        BlurPassParams, Color, FramebufferId, SceneNodeId, ShadowPassParams, SurfaceHandle,
        TextureId,
    };
    use crate::utils::Size;
    use crate::window::WindowIdentity;

    #[derive(Debug, Default)]
    struct TestScene {
        next_node: u64,
        positions: HashMap<SceneNodeId, Point>,
    }

    impl TestScene {
        fn next(&mut self) -> SceneNodeId {
            self.next_node += 1;
            SceneNodeId(self.next_node)
        }
    }

    impl SceneGraph for TestScene {
        fn create_tree(&mut self, _parent: Option<SceneNodeId>) -> SceneNodeId {
            self.next()
        }
        fn create_rect(&mut self, _parent: SceneNodeId, _size: Size, _color: Color) -> SceneNodeId {
            self.next()
        }
        fn set_position(&mut self, node: SceneNodeId, position: Point) {
            self.positions.insert(node, position);
        }
        fn set_rect_size(&mut self, _node: SceneNodeId, _size: Size) {}
        fn place_below(&mut self, _node: SceneNodeId, _reference: SceneNodeId) {}
        fn set_enabled(&mut self, _node: SceneNodeId, _enabled: bool) {}
        fn destroy(&mut self, node: SceneNodeId) {
            self.positions.remove(&node);
        }
        fn surface_texture(&mut self, window: &Window) -> Option<TextureId> {
            window.is_mapped().then_some(TextureId(0))
        }
    }

    #[derive(Debug, Clone, Default)]
    struct RenderCounters(Arc<Mutex<(u32, u32)>>);

    impl RenderCounters {
        fn shadow_passes(&self) -> u32 {
            self.0.lock().unwrap().0
        }
    }

    #[derive(Debug, Default)]
    struct TestRenderer {
        next_id: u64,
        counters: RenderCounters,
    }

    impl EffectsRenderer for TestRenderer {
        fn create_texture(&mut self, _size: Size) -> Result<TextureId, CoreError> {
            self.next_id += 1;
            Ok(TextureId(self.next_id))
        }
        fn create_framebuffer(&mut self, _texture: TextureId) -> Result<FramebufferId, CoreError> {
            self.next_id += 1;
            Ok(FramebufferId(self.next_id))
        }
        fn destroy_texture(&mut self, _texture: TextureId) {}
        fn destroy_framebuffer(&mut self, _framebuffer: FramebufferId) {}
        fn render_shadow(
            &mut self,
            _params: &ShadowPassParams,
            _source: TextureId,
            _target: FramebufferId,
        ) -> Result<(), CoreError> {
            self.counters.0.lock().unwrap().0 += 1;
            Ok(())
        }
        fn render_blur(
            &mut self,
            _params: &BlurPassParams,
            _source: TextureId,
            _target: FramebufferId,
        ) -> Result<(), CoreError> {
            self.counters.0.lock().unwrap().1 += 1;
            Ok(())
        }
        fn restore_default_framebuffer(&mut self) {}
    }

    #[derive(Debug, Default)]
    struct TestSurface {
        configures: Mutex<Vec<Rectangle>>,
        maximized: Mutex<bool>,
        fullscreen: Mutex<bool>,
    }

    impl SurfaceHandle for TestSurface {
        fn configure(&self, geometry: Rectangle) {
            self.configures.lock().unwrap().push(geometry);
        }
        fn set_maximized(&self, maximized: bool) {
            *self.maximized.lock().unwrap() = maximized;
        }
        fn set_fullscreen(&self, fullscreen: bool) {
            *self.fullscreen.lock().unwrap() = fullscreen;
        }
        fn set_minimized(&self, _minimized: bool) {}
    }

    /// A 1920×1080 output with no reserved area, inner gap 10, outer gap 5,
    /// gap animation off
    fn shell_1080p() -> (Shell, RenderCounters, WorkspaceId) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        let counters = RenderCounters::default();
        let renderer = TestRenderer {
            next_id: 0,
            counters: counters.clone(),
        };
        let mut shell = Shell::new(Box::new(TestScene::default()), Box::new(renderer));
        // a single static profile, so focus and count changes never swing
        // the selection away from inner 10 / outer 5
        for name in ["adaptive", "compact", "spacious"] {
            shell.gaps_mut().remove_profile(name);
        }
        shell.gaps_mut().profile_mut("default").unwrap().animation.enabled = false;
        let workspace = shell.add_output(Output::new("HDMI-A-1", Rectangle::new(0, 0, 1920, 1080)));
        (shell, counters, workspace)
    }

    fn anonymous_window() -> (Window, Arc<TestSurface>) {
        let surface = Arc::new(TestSurface::default());
        (Window::new(surface.clone()), surface)
    }

    fn named_window(app_id: &str) -> (Window, Arc<TestSurface>) {
        let (window, surface) = anonymous_window();
        window.set_identity(WindowIdentity {
            app_id: Some(app_id.into()),
            class: Some(app_id.into()),
            title: Some("main".into()),
            instance: None,
        });
        (window, surface)
    }

    fn shadow_last_update(window: &Window) -> u32 {
        window.with_effects(|effects| {
            effects
                .as_ref()
                .and_then(|e| e.shadow())
                .map(|s| s.last_update_ms)
                .unwrap_or(0)
        })
    }

    #[test]
    fn s1_first_window_fills_the_workspace() {
        let (mut shell, _, _) = shell_1080p();
        let (a, surface) = anonymous_window();
        shell.handle_new_window(a.clone(), None);

        assert_eq!(a.geometry(), Rectangle::new(5, 5, 1910, 1070));
        assert_eq!(
            surface.configures.lock().unwrap().last().copied(),
            Some(Rectangle::new(5, 5, 1910, 1070))
        );
        shell.validate();
    }

    #[test]
    fn s2_two_windows_split_horizontally_with_the_exact_inner_gap() {
        let (mut shell, _, _) = shell_1080p();
        let (a, _) = anonymous_window();
        let (b, _) = anonymous_window();
        shell.handle_new_window(a.clone(), None);
        shell.handle_new_window(b.clone(), None);

        let (ra, rb) = (a.geometry(), b.geometry());
        assert_eq!(ra, Rectangle::new(5, 5, 950, 1070));
        assert_eq!(rb, Rectangle::new(965, 5, 950, 1070));
        // the gap between the siblings is exactly the inner gap and the
        // content rectangle is fully accounted for
        assert_eq!(rb.x - ra.right(), 10);
        assert_eq!(ra.width + 10 + rb.width, 1910);
        assert!(!ra.overlaps(&rb));
    }

    #[test]
    fn s3_third_window_splits_the_focused_tile_vertically() {
        let (mut shell, _, _) = shell_1080p();
        let (a, _) = anonymous_window();
        let (b, _) = anonymous_window();
        let (c, _) = anonymous_window();
        shell.handle_new_window(a.clone(), None);
        shell.handle_focus_change(Some(&a));
        shell.handle_new_window(b.clone(), None);
        shell.handle_focus_change(Some(&a));
        shell.handle_new_window(c.clone(), None);

        assert_eq!(b.geometry(), Rectangle::new(965, 5, 950, 1070));
        assert_eq!(a.geometry(), Rectangle::new(5, 5, 950, 530));
        assert_eq!(c.geometry(), Rectangle::new(5, 545, 950, 530));
    }

    #[test]
    fn s4_removal_collapses_the_parent_container() {
        let (mut shell, _, _) = shell_1080p();
        let (a, _) = anonymous_window();
        let (b, _) = anonymous_window();
        let (c, _) = anonymous_window();
        shell.handle_new_window(a.clone(), None);
        shell.handle_focus_change(Some(&a));
        shell.handle_new_window(b.clone(), None);
        shell.handle_focus_change(Some(&a));
        shell.handle_new_window(c.clone(), None);

        shell.handle_window_destroyed(&b);

        assert_eq!(a.geometry(), Rectangle::new(5, 5, 1910, 530));
        assert_eq!(c.geometry(), Rectangle::new(5, 545, 1910, 530));
        shell.validate();
    }

    #[test]
    fn s5_rule_dispatch_maximizes_and_saves_the_default_placement() {
        let (mut shell, _, _) = shell_1080p();
        let ws1 = shell.create_workspace(shell.outputs()[0].id()).unwrap();
        shell.handle_workspace_switch(ws1).unwrap();
        shell
            .rules_mut()
            .load_str("[fox]\napp_id=\"firefox\"\nworkspace=1\nposition=maximized\npriority=100\n")
            .unwrap();

        let (window, surface) = named_window("firefox");
        shell.handle_new_window(window.clone(), None);

        assert!(window.is_maximized());
        assert_eq!(window.workspace(), Some(ws1));
        // the workspace rectangle, not the gap-shrunk content rectangle
        assert_eq!(window.geometry(), Rectangle::new(0, 0, 1920, 1080));
        // the rule-free default placement survives for the restore
        assert_eq!(
            window.saved_geometry(),
            Some(Rectangle::new(560, 240, 800, 600))
        );
        assert!(*surface.maximized.lock().unwrap());
    }

    #[test]
    fn s6_smart_gaps_collapse_and_return() {
        let (mut shell, _, _) = shell_1080p();
        shell.gaps_mut().set_smart_gaps(true, true);

        let (a, _) = anonymous_window();
        shell.handle_new_window(a.clone(), None);
        assert_eq!(a.geometry(), Rectangle::new(0, 0, 1920, 1080));

        let (b, _) = anonymous_window();
        shell.handle_new_window(b.clone(), None);
        assert_eq!(a.geometry(), Rectangle::new(5, 5, 950, 1070));
        assert_eq!(b.geometry(), Rectangle::new(965, 5, 950, 1070));
    }

    #[test]
    fn s7_effect_updates_respect_the_sixty_hertz_throttle() {
        let (mut shell, counters, _) = shell_1080p();
        let (window, _) = anonymous_window();
        shell.handle_new_window(window.clone(), None);
        window.set_mapped(true);

        // first tick renders the freshly configured resources
        shell.frame_tick(1000);
        assert_eq!(counters.shadow_passes(), 1);
        assert_eq!(shadow_last_update(&window), 1000);
        assert!(!shell.effects().window_needs_update(&window));

        // a clean window ticks without rendering
        shell.frame_tick(1020);
        assert_eq!(counters.shadow_passes(), 1);

        // the window resizes: targets are stale, but 10 ms after the last
        // update the throttle suppresses the render
        window.commit_geometry(Rectangle::new(0, 0, 640, 480));
        assert!(shell.effects().window_needs_update(&window));
        shell.frame_tick(1030);
        assert_eq!(counters.shadow_passes(), 1);
        assert!(shell.effects().window_needs_update(&window));

        // 20 ms after the last update the render goes through
        shell.frame_tick(1040);
        assert_eq!(counters.shadow_passes(), 2);
        assert_eq!(shadow_last_update(&window), 1040);
        assert!(!shell.effects().window_needs_update(&window));
    }

    #[test]
    fn pip_rule_floats_into_the_bottom_right_corner() {
        let (mut shell, _, _) = shell_1080p();
        let (mpv, _) = named_window("mpv");
        shell.handle_new_window(mpv.clone(), None);

        assert!(mpv.is_floating());
        assert!(mpv.is_pip());
        // the media rule sizes it medium and pins it bottom-right
        let geometry = mpv.geometry();
        assert_eq!(geometry.size(), Size::new(800, 600));
        assert_eq!(geometry.x, 1920 - 800 - 50);
        assert_eq!(geometry.y, 1080 - 600 - 50);

        // floating windows never enter the tree
        let (tiled, _) = anonymous_window();
        shell.handle_new_window(tiled.clone(), None);
        assert_eq!(tiled.geometry(), Rectangle::new(5, 5, 1910, 1070));
        shell.validate();
    }

    #[test]
    fn reserved_area_shrinks_the_usable_rectangle() {
        let (mut shell, _, _) = shell_1080p();
        let (a, _) = anonymous_window();
        shell.handle_new_window(a.clone(), None);
        assert_eq!(a.geometry(), Rectangle::new(5, 5, 1910, 1070));

        // a 30 px status bar claims the top edge
        let output = shell.outputs()[0].clone();
        output.set_reserved_area(crate::utils::ReservedArea {
            top: 30,
            ..Default::default()
        });
        shell.handle_output_changed(output.id());
        assert_eq!(a.geometry(), Rectangle::new(5, 35, 1910, 1040));
    }

    #[test]
    fn fullscreen_toggle_saves_and_restores() {
        let (mut shell, _, _) = shell_1080p();
        let (a, _) = anonymous_window();
        let (b, _) = anonymous_window();
        shell.handle_new_window(a.clone(), None);
        shell.handle_new_window(b.clone(), None);
        let tiled = a.geometry();

        shell.handle_fullscreen_toggle(&a, true);
        assert_eq!(a.geometry(), Rectangle::new(0, 0, 1920, 1080));

        shell.handle_fullscreen_toggle(&a, false);
        assert_eq!(a.geometry(), tiled);
    }

    #[test]
    fn gap_animation_steps_through_frame_ticks() {
        let (mut shell, _, _) = shell_1080p();
        shell
            .gaps_mut()
            .profile_mut("default")
            .unwrap()
            .animation
            .enabled = true;
        shell.gaps_mut().set_smart_gaps(true, true);

        // the single-window collapse animates in; let it settle
        let (a, _) = anonymous_window();
        shell.handle_new_window(a.clone(), None);
        let now = shell.clock.now_ms();
        shell.frame_tick(now.saturating_add(20_000));
        assert_eq!(a.geometry(), Rectangle::new(0, 0, 1920, 1080));

        // the second window lifts the collapse; the new values animate in
        let (b, _) = anonymous_window();
        shell.handle_new_window(b.clone(), None);
        assert!(shell.gaps().is_animating());

        shell.frame_tick(now.saturating_add(40_000));
        assert!(!shell.gaps().is_animating());
        assert_eq!(a.geometry(), Rectangle::new(5, 5, 950, 1070));
        assert_eq!(b.geometry(), Rectangle::new(965, 5, 950, 1070));
    }

    #[test]
    fn directional_move_swaps_tiles() {
        let (mut shell, _, _) = shell_1080p();
        let (a, _) = anonymous_window();
        let (b, _) = anonymous_window();
        shell.handle_new_window(a.clone(), None);
        shell.handle_new_window(b.clone(), None);
        let (left, right) = (a.geometry(), b.geometry());

        shell.move_window(&a, Direction::Right, false).unwrap();
        assert_eq!(a.geometry(), right);
        assert_eq!(b.geometry(), left);

        // no neighbor further right: a silent no-op
        shell.move_window(&a, Direction::Right, false).unwrap();
        assert_eq!(a.geometry(), right);
    }

    #[test]
    fn next_window_wraps_around_the_workspace() {
        let (mut shell, _, _) = shell_1080p();
        let (a, _) = anonymous_window();
        let (b, _) = anonymous_window();
        shell.handle_new_window(a.clone(), None);
        shell.handle_new_window(b.clone(), None);

        assert_eq!(shell.next_window(&a), Some(b.clone()));
        assert_eq!(shell.next_window(&b), Some(a.clone()));
    }

    #[test]
    fn switching_to_an_unregistered_layout_is_rejected() {
        let (mut shell, _, _) = shell_1080p();
        assert!(matches!(
            shell.switch_layout(LayoutKind::Master),
            Err(CoreError::InvalidArgument { .. })
        ));
        assert_eq!(shell.layouts().current_kind(), LayoutKind::Dwindle);
    }
}
