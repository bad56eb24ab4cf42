//! The realtime effects controller.
//!
//! Every window owns an optional [`WindowEffects`] block: an offscreen
//! shadow target, a two-pass blur target and a scene sub-tree holding the
//! shadow rectangle stacked below the window. The controller manages the
//! lifecycles of those resources, the dirtying rules that keep them in
//! sync with window geometry, and the 60 Hz throttle that batches the
//! actual GPU work into the per-frame tick.
//!
//! GPU failures are never fatal: a window whose framebuffer comes back
//! incomplete or whose shader pass fails is downgraded to the no-effects
//! path (the scene still shows the raw window) with the block kept around,
//! marked disabled.

use tracing::{debug, error, info};

use crate::adapter::{
    BlurPassParams, Color, EffectsRenderer, SceneGraph, SceneNodeId, ShadowPassParams,
};
use crate::rules::RuleEffectOverrides;
use crate::utils::{Point, Rectangle, Size};
use crate::window::Window;

mod resources;

pub use resources::{BlurResources, ShadowResources};

/// Milliseconds that must pass between effect updates of one window
const UPDATE_THRESHOLD_MS: u32 = 16;

/// Global drop-shadow settings
#[derive(Debug, Clone, Copy)]
pub struct ShadowConfig {
    /// Whether shadows render at all
    pub enabled: bool,
    /// Gaussian radius of the shadow edge; also pads the offscreen target
    pub blur_radius: i32,
    /// Offset of the shadow from the window
    pub offset: Point,
    /// Overall shadow opacity
    pub opacity: f32,
    /// Shadow color
    pub color: Color,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        ShadowConfig {
            enabled: true,
            blur_radius: 10,
            offset: Point::new(5, 5),
            opacity: 0.5,
            color: [0.0, 0.0, 0.0, 0.5],
        }
    }
}

/// Global background-blur settings
#[derive(Debug, Clone, Copy)]
pub struct BlurConfig {
    /// Whether blur renders at all
    pub enabled: bool,
    /// Gaussian radius of both passes
    pub radius: i32,
    /// Only blur the focused window
    pub focus_only: bool,
    /// Blend intensity of the blurred result
    pub intensity: f32,
}

impl Default for BlurConfig {
    fn default() -> Self {
        BlurConfig {
            enabled: true,
            radius: 15,
            focus_only: false,
            intensity: 0.7,
        }
    }
}

/// Focus-dependent window opacity settings
#[derive(Debug, Clone, Copy)]
pub struct TransparencyConfig {
    /// Whether focus changes adjust opacity
    pub enabled: bool,
    /// Opacity of the focused window
    pub focused_opacity: f32,
    /// Opacity of visible but unfocused windows
    pub unfocused_opacity: f32,
    /// Opacity of windows on invisible workspaces
    pub inactive_opacity: f32,
}

impl Default for TransparencyConfig {
    fn default() -> Self {
        TransparencyConfig {
            enabled: false,
            focused_opacity: 1.0,
            unfocused_opacity: 0.9,
            inactive_opacity: 0.8,
        }
    }
}

/// The global effect configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectsConfig {
    /// Drop-shadow settings
    pub shadow: ShadowConfig,
    /// Background-blur settings
    pub blur: BlurConfig,
    /// Focus-dependent opacity settings
    pub transparency: TransparencyConfig,
}

#[derive(Debug, Clone, Copy)]
struct OpacityAnimation {
    start: f32,
    target: f32,
    start_time: u32,
    duration: u32,
}

/// The per-window effect state and GPU resources.
///
/// Owned by the window; configured at creation, rendered once the window
/// maps.
#[derive(Debug)]
pub struct WindowEffects {
    enabled: bool,
    shadow: Option<ShadowResources>,
    blur: Option<BlurResources>,
    shadow_tree: Option<SceneNodeId>,
    shadow_rect: Option<SceneNodeId>,
    // local copies; rule overrides detach these from the global config
    shadow_config: ShadowConfig,
    blur_config: BlurConfig,
    animations_enabled: bool,
    current_opacity: f32,
    opacity_animation: Option<OpacityAnimation>,
    last_frame_ms: u32,
}

impl WindowEffects {
    /// Whether the effects path is active for this window
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The shadow resource set, if allocation succeeded
    pub fn shadow(&self) -> Option<&ShadowResources> {
        self.shadow.as_ref()
    }

    /// The blur resource set, if allocation succeeded
    pub fn blur(&self) -> Option<&BlurResources> {
        self.blur.as_ref()
    }

    /// The effective shadow configuration of this window
    pub fn shadow_config(&self) -> &ShadowConfig {
        &self.shadow_config
    }

    /// The effective blur configuration of this window
    pub fn blur_config(&self) -> &BlurConfig {
        &self.blur_config
    }

    /// The opacity the effects path currently applies
    pub fn current_opacity(&self) -> f32 {
        self.current_opacity
    }

    /// Whether an enabled resource set still waits for a render
    pub fn needs_update(&self) -> bool {
        (self.shadow_config.enabled
            && self.shadow.as_ref().map(|s| s.needs_update).unwrap_or(false))
            || (self.blur_config.enabled
                && self.blur.as_ref().map(|b| b.needs_update).unwrap_or(false))
    }

    fn shadow_size_for(&self, window_size: Size) -> Size {
        Size::new(
            window_size.w + 2 * self.shadow_config.blur_radius,
            window_size.h + 2 * self.shadow_config.blur_radius,
        )
    }
}

/// Drives every window's effect resources from the shared frame tick
#[derive(Debug, Default)]
pub struct EffectsManager {
    config: EffectsConfig,
    frame_count: u32,
    last_fps_window_ms: u32,
}

impl EffectsManager {
    /// A manager with default configuration
    pub fn new() -> EffectsManager {
        EffectsManager::default()
    }

    /// A manager with the given configuration
    pub fn with_config(config: EffectsConfig) -> EffectsManager {
        EffectsManager {
            config,
            ..EffectsManager::default()
        }
    }

    /// The global configuration
    pub fn config(&self) -> &EffectsConfig {
        &self.config
    }

    /// Mutable access to the global configuration.
    ///
    /// Windows that received per-rule overrides keep their local copies.
    pub fn config_mut(&mut self) -> &mut EffectsConfig {
        &mut self.config
    }

    /// Acquire shadow and blur resources for a window and hook its shadow
    /// into the scene.
    ///
    /// On allocation failure the window is downgraded to the no-effects
    /// path: the block stays present, marked disabled.
    pub fn init_window(
        &self,
        window: &Window,
        renderer: &mut dyn EffectsRenderer,
        scene: &mut dyn SceneGraph,
    ) {
        let window_size = window.geometry().size();
        let shadow_config = self.config.shadow;
        let blur_config = self.config.blur;

        let shadow_size = Size::new(
            window_size.w + 2 * shadow_config.blur_radius,
            window_size.h + 2 * shadow_config.blur_radius,
        );
        let shadow = ShadowResources::create(renderer, shadow_size);
        let blur = shadow
            .is_ok()
            .then(|| BlurResources::create(renderer, window_size));

        let (shadow, blur, enabled) = match (shadow, blur) {
            (Ok(shadow), Some(Ok(blur))) => (Some(shadow), Some(blur), true),
            (Err(err), _) => {
                error!(window = window.id(), %err, "shadow resources failed, disabling effects");
                (None, None, false)
            }
            (Ok(shadow), Some(Err(err))) => {
                error!(window = window.id(), %err, "blur resources failed, disabling effects");
                shadow.destroy(renderer);
                (None, None, false)
            }
            (Ok(_), None) => unreachable!("blur allocation runs whenever the shadow worked"),
        };

        let (shadow_tree, shadow_rect) = if enabled {
            let tree = scene.create_tree(None);
            let rect = scene.create_rect(tree, shadow_size, shadow_config.color);
            if let Some(window_node) = window.scene_node() {
                scene.place_below(tree, window_node);
            }
            let geometry = window.geometry();
            scene.set_position(
                rect,
                Point::new(
                    geometry.x + shadow_config.offset.x,
                    geometry.y + shadow_config.offset.y,
                ),
            );
            (Some(tree), Some(rect))
        } else {
            (None, None)
        };

        window.with_effects(|effects| {
            *effects = Some(WindowEffects {
                enabled,
                shadow,
                blur,
                shadow_tree,
                shadow_rect,
                shadow_config,
                blur_config,
                animations_enabled: true,
                current_opacity: window.opacity(),
                opacity_animation: None,
                last_frame_ms: 0,
            });
        });
        if enabled {
            debug!(window = window.id(), "window effects initialized");
        }
    }

    /// Tear down a window's effect resources and scene nodes
    pub fn destroy_window(
        &self,
        window: &Window,
        renderer: &mut dyn EffectsRenderer,
        scene: &mut dyn SceneGraph,
    ) {
        window.with_effects(|effects| {
            let Some(effects) = effects.take() else {
                return;
            };
            if let Some(shadow) = &effects.shadow {
                shadow.destroy(renderer);
            }
            if let Some(blur) = &effects.blur {
                blur.destroy(renderer);
            }
            if let Some(tree) = effects.shadow_tree {
                scene.destroy(tree);
            }
            debug!(window = window.id(), "window effects destroyed");
        });
    }

    /// Force both resource sets of a window dirty
    pub fn mark_dirty(&self, window: &Window) {
        window.with_effects(|effects| {
            if let Some(effects) = effects {
                if let Some(shadow) = &mut effects.shadow {
                    shadow.needs_update = true;
                }
                if let Some(blur) = &mut effects.blur {
                    blur.needs_update = true;
                }
            }
        });
    }

    /// Whether the throttle lets this window update at `now_ms`
    pub fn should_update(&self, window: &Window, now_ms: u32) -> bool {
        window.with_effects(|effects| {
            effects
                .as_ref()
                .map(|e| now_ms.saturating_sub(e.last_frame_ms) >= UPDATE_THRESHOLD_MS)
                .unwrap_or(false)
        })
    }

    /// Detach a window's effect configuration per rule overrides.
    ///
    /// The copies only ever restrict the global config; re-enabling a
    /// feature globally later does not resurrect it on this window.
    pub fn apply_rule_overrides(&self, window: &Window, overrides: RuleEffectOverrides) {
        if !overrides.any() {
            return;
        }
        window.with_effects(|effects| {
            let Some(effects) = effects else { return };
            if overrides.disable_shadows {
                effects.shadow_config.enabled = false;
                info!(window = window.id(), "shadows disabled by rule");
            }
            if overrides.disable_blur {
                effects.blur_config.enabled = false;
                info!(window = window.id(), "blur disabled by rule");
            }
            if overrides.disable_animations {
                effects.animations_enabled = false;
                effects.opacity_animation = None;
            }
            if let Some(shadow) = &mut effects.shadow {
                shadow.needs_update = true;
            }
            if let Some(blur) = &mut effects.blur {
                blur.needs_update = true;
            }
        });
    }

    /// Apply an opacity directly, keeping the scene in sync
    pub fn set_window_opacity(&self, window: &Window, opacity: f32, scene: &mut dyn SceneGraph) {
        let opacity = opacity.clamp(0.0, 1.0);
        window.set_opacity(opacity);
        window.with_effects(|effects| {
            if let Some(effects) = effects {
                effects.current_opacity = opacity;
                effects.opacity_animation = None;
            }
        });
        if let Some(node) = window.scene_node() {
            scene.set_enabled(node, opacity > 0.0);
        }
    }

    /// Schedule a timed opacity transition for a window.
    ///
    /// The transition shares the frame tick with the gap animator; a newer
    /// target replaces an in-flight one. Windows whose animations a rule
    /// disabled jump straight to the target.
    pub fn animate_opacity(
        &self,
        window: &Window,
        target: f32,
        duration_ms: u32,
        now_ms: u32,
        scene: &mut dyn SceneGraph,
    ) {
        let target = target.clamp(0.0, 1.0);
        let animate = window.with_effects(|effects| match effects {
            Some(effects) if effects.animations_enabled && duration_ms > 0 => {
                effects.opacity_animation = Some(OpacityAnimation {
                    start: effects.current_opacity,
                    target,
                    start_time: now_ms,
                    duration: duration_ms,
                });
                true
            }
            _ => false,
        });
        if !animate {
            self.set_window_opacity(window, target, scene);
        }
    }

    /// Re-apply the focus-dependent opacity to a window
    pub fn on_focus_change(&self, window: &Window, focused: bool, scene: &mut dyn SceneGraph) {
        let transparency = self.config.transparency;
        if !transparency.enabled {
            return;
        }
        let target = if focused {
            transparency.focused_opacity
        } else {
            transparency.unfocused_opacity
        };
        self.set_window_opacity(window, target, scene);
    }

    /// Per-frame update of one window: throttle, geometry-change dirtying,
    /// shadow repositioning and opacity transitions.
    ///
    /// Returns whether the window passed the throttle this tick.
    pub fn update_window(&self, window: &Window, now_ms: u32, scene: &mut dyn SceneGraph) -> bool {
        if !self.should_update(window, now_ms) {
            return false;
        }
        let geometry = window.geometry();

        let opacity_sample = window.with_effects(|effects| {
            let effects = effects.as_mut()?;
            effects.last_frame_ms = now_ms;

            // a resized window invalidates both cached targets
            let shadow_size = effects.shadow_size_for(geometry.size());
            if let Some(shadow) = &mut effects.shadow {
                if shadow.size() != shadow_size {
                    shadow.needs_update = true;
                }
            }
            if let Some(blur) = &mut effects.blur {
                if blur.size() != geometry.size() {
                    blur.needs_update = true;
                }
            }

            let animation = effects.opacity_animation?;
            let progress = if animation.duration == 0 {
                1.0
            } else {
                (now_ms.saturating_sub(animation.start_time) as f32 / animation.duration as f32)
                    .clamp(0.0, 1.0)
            };
            let value = animation.start + (animation.target - animation.start) * progress;
            effects.current_opacity = value;
            if progress >= 1.0 {
                effects.opacity_animation = None;
            }
            Some(value)
        });

        self.sync_shadow_node(window, geometry, scene);
        if let Some(opacity) = opacity_sample {
            window.set_opacity(opacity);
            if let Some(node) = window.scene_node() {
                scene.set_enabled(node, opacity > 0.0);
            }
        }
        true
    }

    fn sync_shadow_node(&self, window: &Window, geometry: Rectangle, scene: &mut dyn SceneGraph) {
        window.with_effects(|effects| {
            let Some(effects) = effects else { return };
            let Some(rect) = effects.shadow_rect else { return };
            scene.set_position(
                rect,
                Point::new(
                    geometry.x + effects.shadow_config.offset.x,
                    geometry.y + effects.shadow_config.offset.y,
                ),
            );
            scene.set_rect_size(rect, effects.shadow_size_for(geometry.size()));
        });
    }

    /// Render a window's dirty shadow and blur targets.
    ///
    /// Stale targets are reallocated at the current window size first. A
    /// failing pass downgrades the window to the no-effects path. Returns
    /// whether any pass ran.
    pub fn render_window(
        &self,
        window: &Window,
        renderer: &mut dyn EffectsRenderer,
        scene: &mut dyn SceneGraph,
        now_ms: u32,
    ) -> bool {
        if !window.is_mapped() {
            return false;
        }
        let Some(source) = scene.surface_texture(window) else {
            return false;
        };
        let geometry = window.geometry();

        let outcome: Result<bool, crate::CoreError> = window.with_effects(|effects| {
            let Some(effects) = effects.as_mut() else {
                return Ok(false);
            };
            if !effects.enabled {
                return Ok(false);
            }
            let mut rendered = false;

            if effects.shadow_config.enabled {
                let wanted = effects.shadow_size_for(geometry.size());
                let shadow_config = effects.shadow_config;
                if let Some(shadow) = &mut effects.shadow {
                    if shadow.needs_update {
                        if shadow.size() != wanted {
                            shadow.destroy(renderer);
                            *shadow = ShadowResources::create(renderer, wanted)?;
                        }
                        renderer.render_shadow(
                            &ShadowPassParams {
                                offset_x: shadow_config.offset.x,
                                offset_y: shadow_config.offset.y,
                                blur_radius: shadow_config.blur_radius,
                                opacity: shadow_config.opacity,
                                color: shadow_config.color,
                                size: wanted,
                            },
                            source,
                            shadow.framebuffer,
                        )?;
                        shadow.needs_update = false;
                        shadow.last_update_ms = now_ms;
                        rendered = true;
                    }
                }
            }

            if effects.blur_config.enabled {
                let blur_config = effects.blur_config;
                if let Some(blur) = &mut effects.blur {
                    if blur.needs_update {
                        if blur.size() != geometry.size() {
                            blur.destroy(renderer);
                            *blur = BlurResources::create(renderer, geometry.size())?;
                        }
                        let params = BlurPassParams {
                            radius: blur_config.radius,
                            intensity: blur_config.intensity,
                            horizontal: true,
                            size: blur.size(),
                        };
                        renderer.render_blur(&params, source, blur.framebuffer_h)?;
                        renderer.render_blur(
                            &BlurPassParams {
                                horizontal: false,
                                ..params
                            },
                            blur.texture_h,
                            blur.framebuffer_v,
                        )?;
                        blur.needs_update = false;
                        rendered = true;
                    }
                }
            }
            Ok(rendered)
        });
        renderer.restore_default_framebuffer();

        match outcome {
            Ok(rendered) => rendered,
            Err(err) => {
                error!(window = window.id(), %err, "effect render failed, disabling effects");
                window.with_effects(|effects| {
                    if let Some(effects) = effects {
                        effects.enabled = false;
                    }
                });
                false
            }
        }
    }

    /// Whether a window's effect targets are stale: either explicitly
    /// dirtied, or their cached dimensions no longer match the window
    pub fn window_needs_update(&self, window: &Window) -> bool {
        let size = window.geometry().size();
        window.with_effects(|effects| {
            let Some(effects) = effects.as_ref() else {
                return false;
            };
            if !effects.enabled {
                return false;
            }
            effects.needs_update()
                || (effects.shadow_config.enabled
                    && effects
                        .shadow
                        .as_ref()
                        .map(|s| s.size() != effects.shadow_size_for(size))
                        .unwrap_or(false))
                || (effects.blur_config.enabled
                    && effects
                        .blur
                        .as_ref()
                        .map(|b| b.size() != size)
                        .unwrap_or(false))
        })
    }

    /// Whether any window in `windows` still has stale targets or a
    /// running opacity transition
    pub fn any_pending(&self, windows: &[Window]) -> bool {
        windows.iter().any(|window| {
            self.window_needs_update(window)
                || window.with_effects(|effects| {
                    effects
                        .as_ref()
                        .map(|e| e.opacity_animation.is_some())
                        .unwrap_or(false)
                })
        })
    }

    /// Book-keeping at the end of a frame; logs the effect frame rate once
    /// a second at debug level
    pub fn frame_done(&mut self, now_ms: u32) {
        self.frame_count += 1;
        if now_ms.saturating_sub(self.last_fps_window_ms) >= 1000 {
            debug!(frames = self.frame_count, "effect frames in the last second");
            self.frame_count = 0;
            self.last_fps_window_ms = now_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::adapter::{FramebufferId, SurfaceHandle, TextureId};
    use crate::CoreError;

    #[derive(Debug)]
    struct NullSurface;

    impl SurfaceHandle for NullSurface {
        fn configure(&self, _geometry: Rectangle) {}
        fn set_maximized(&self, _maximized: bool) {}
        fn set_fullscreen(&self, _fullscreen: bool) {}
        fn set_minimized(&self, _minimized: bool) {}
    }

    #[derive(Debug, Default)]
    struct NullScene {
        next: u64,
    }

    impl SceneGraph for NullScene {
        fn create_tree(&mut self, _parent: Option<SceneNodeId>) -> SceneNodeId {
            self.next += 1;
            SceneNodeId(self.next)
        }
        fn create_rect(&mut self, _parent: SceneNodeId, _size: Size, _color: Color) -> SceneNodeId {
            self.next += 1;
            SceneNodeId(self.next)
        }
        fn set_position(&mut self, _node: SceneNodeId, _position: Point) {}
        fn set_rect_size(&mut self, _node: SceneNodeId, _size: Size) {}
        fn place_below(&mut self, _node: SceneNodeId, _reference: SceneNodeId) {}
        fn set_enabled(&mut self, _node: SceneNodeId, _enabled: bool) {}
        fn destroy(&mut self, _node: SceneNodeId) {}
        fn surface_texture(&mut self, window: &Window) -> Option<TextureId> {
            window.is_mapped().then_some(TextureId(0))
        }
    }

    #[derive(Debug, Default)]
    struct CountingRenderer {
        next: u64,
        fail_framebuffers: bool,
        live_textures: i32,
        live_framebuffers: i32,
        shadow_passes: u32,
    }

    impl EffectsRenderer for CountingRenderer {
        fn create_texture(&mut self, _size: Size) -> Result<TextureId, CoreError> {
            self.next += 1;
            self.live_textures += 1;
            Ok(TextureId(self.next))
        }
        fn create_framebuffer(&mut self, _texture: TextureId) -> Result<FramebufferId, CoreError> {
            if self.fail_framebuffers {
                return Err(CoreError::InvariantViolation {
                    subsystem: "renderer",
                    reason: "framebuffer incomplete".into(),
                });
            }
            self.next += 1;
            self.live_framebuffers += 1;
            Ok(FramebufferId(self.next))
        }
        fn destroy_texture(&mut self, _texture: TextureId) {
            self.live_textures -= 1;
        }
        fn destroy_framebuffer(&mut self, _framebuffer: FramebufferId) {
            self.live_framebuffers -= 1;
        }
        fn render_shadow(
            &mut self,
            _params: &ShadowPassParams,
            _source: TextureId,
            _target: FramebufferId,
        ) -> Result<(), CoreError> {
            self.shadow_passes += 1;
            Ok(())
        }
        fn render_blur(
            &mut self,
            _params: &BlurPassParams,
            _source: TextureId,
            _target: FramebufferId,
        ) -> Result<(), CoreError> {
            Ok(())
        }
        fn restore_default_framebuffer(&mut self) {}
    }

    fn window() -> Window {
        let window = Window::new(Arc::new(NullSurface));
        window.set_geometry(Rectangle::new(0, 0, 800, 600));
        window
    }

    #[test]
    fn init_allocates_both_resource_sets() {
        let manager = EffectsManager::new();
        let mut renderer = CountingRenderer::default();
        let mut scene = NullScene::default();
        let w = window();

        manager.init_window(&w, &mut renderer, &mut scene);
        w.with_effects(|effects| {
            let effects = effects.as_ref().unwrap();
            assert!(effects.is_enabled());
            let shadow = effects.shadow().unwrap();
            // the shadow target is padded by the blur radius on every side
            assert_eq!((shadow.width, shadow.height), (820, 620));
            assert_eq!(effects.blur().unwrap().width, 800);
            assert!(effects.needs_update());
        });

        manager.destroy_window(&w, &mut renderer, &mut scene);
        assert_eq!(renderer.live_textures, 0);
        assert_eq!(renderer.live_framebuffers, 0);
        assert!(w.with_effects(|effects| effects.is_none()));
    }

    #[test]
    fn incomplete_framebuffer_downgrades_to_the_no_effects_path() {
        let manager = EffectsManager::new();
        let mut renderer = CountingRenderer {
            fail_framebuffers: true,
            ..CountingRenderer::default()
        };
        let mut scene = NullScene::default();
        let w = window();

        manager.init_window(&w, &mut renderer, &mut scene);
        // nothing leaked, the block is present but disabled
        assert_eq!(renderer.live_textures, 0);
        w.with_effects(|effects| {
            let effects = effects.as_ref().unwrap();
            assert!(!effects.is_enabled());
            assert!(effects.shadow().is_none());
        });
        assert!(!manager.window_needs_update(&w));
    }

    #[test]
    fn rule_overrides_detach_the_local_config() {
        let manager = EffectsManager::new();
        let mut renderer = CountingRenderer::default();
        let mut scene = NullScene::default();
        let first = window();
        let second = window();
        manager.init_window(&first, &mut renderer, &mut scene);
        manager.init_window(&second, &mut renderer, &mut scene);

        manager.apply_rule_overrides(
            &first,
            RuleEffectOverrides {
                disable_shadows: true,
                disable_blur: false,
                disable_animations: false,
            },
        );

        first.with_effects(|effects| {
            assert!(!effects.as_ref().unwrap().shadow_config().enabled);
        });
        // the other window and the global config are untouched
        second.with_effects(|effects| {
            assert!(effects.as_ref().unwrap().shadow_config().enabled);
        });
        assert!(manager.config().shadow.enabled);
    }

    #[test]
    fn disabled_shadow_renders_only_the_blur() {
        let manager = EffectsManager::new();
        let mut renderer = CountingRenderer::default();
        let mut scene = NullScene::default();
        let w = window();
        w.set_mapped(true);
        manager.init_window(&w, &mut renderer, &mut scene);
        manager.apply_rule_overrides(
            &w,
            RuleEffectOverrides {
                disable_shadows: true,
                disable_blur: false,
                disable_animations: false,
            },
        );

        assert!(manager.render_window(&w, &mut renderer, &mut scene, 100));
        assert_eq!(renderer.shadow_passes, 0);
        // the shadow flag stays set, only blur was allowed to render
        w.with_effects(|effects| {
            let effects = effects.as_ref().unwrap();
            assert!(effects.shadow().unwrap().needs_update);
            assert!(!effects.blur().unwrap().needs_update);
        });
    }

    #[test]
    fn opacity_transitions_advance_with_the_tick() {
        let manager = EffectsManager::new();
        let mut renderer = CountingRenderer::default();
        let mut scene = NullScene::default();
        let w = window();
        manager.init_window(&w, &mut renderer, &mut scene);

        manager.animate_opacity(&w, 0.5, 100, 1000, &mut scene);
        assert!(manager.update_window(&w, 1050, &mut scene));
        let mid = w.opacity();
        assert!(mid < 1.0 && mid > 0.5, "mid-flight opacity was {mid}");

        assert!(manager.update_window(&w, 1100, &mut scene));
        assert_eq!(w.opacity(), 0.5);
        w.with_effects(|effects| {
            assert!(effects.as_ref().unwrap().opacity_animation.is_none());
        });
    }
}
