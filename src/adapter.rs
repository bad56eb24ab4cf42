//! Adapter traits over the external collaborators.
//!
//! The core never talks to wayland clients, the scene graph, or the GPU
//! directly. The embedding compositor implements the traits in this module
//! and hands them to [`Shell`](crate::shell::Shell); everything the core
//! does to the outside world goes through them. This keeps the geometry and
//! state machinery testable without a running compositor.

use std::fmt;

use crate::utils::{Point, Rectangle, Size};
use crate::window::Window;
use crate::CoreError;

/// An RGBA color with premultiplied-alpha-agnostic float channels
pub type Color = [f32; 4];

/// Handle to a node in the downstream scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneNodeId(
    /// The raw node id
    pub u64,
);

/// Handle to a GPU texture owned by the downstream renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(
    /// The raw texture id
    pub u64,
);

/// Handle to a GPU framebuffer owned by the downstream renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferId(
    /// The raw framebuffer id
    pub u64,
);

/// The downstream scene graph.
///
/// Node handles returned from the create methods stay valid until
/// explicitly destroyed. Destroying a node destroys its sub-tree.
pub trait SceneGraph: fmt::Debug {
    /// Create an empty grouping node, optionally under a parent
    fn create_tree(&mut self, parent: Option<SceneNodeId>) -> SceneNodeId;
    /// Create a solid colored rectangle node under the given parent
    fn create_rect(&mut self, parent: SceneNodeId, size: Size, color: Color) -> SceneNodeId;
    /// Move a node to the given position
    fn set_position(&mut self, node: SceneNodeId, position: Point);
    /// Resize a rectangle node
    fn set_rect_size(&mut self, node: SceneNodeId, size: Size);
    /// Restack `node` directly below `reference` in its parent
    fn place_below(&mut self, node: SceneNodeId, reference: SceneNodeId);
    /// Enable or disable a node and its sub-tree
    fn set_enabled(&mut self, node: SceneNodeId, enabled: bool);
    /// Destroy a node and its sub-tree
    fn destroy(&mut self, node: SceneNodeId);
    /// Get the current content texture of a window's surface, if it has one
    fn surface_texture(&mut self, window: &Window) -> Option<TextureId>;
}

/// The client-facing side of a toplevel surface.
///
/// One of these backs every [`Window`]; the core uses it to ask the client
/// for resizes and to signal state changes. All methods are requests, the
/// client acknowledges them asynchronously through the normal surface
/// commit flow.
pub trait SurfaceHandle: fmt::Debug + Send + Sync {
    /// Ask the client to take on the given geometry
    fn configure(&self, geometry: Rectangle);
    /// Signal the maximized state to the client
    fn set_maximized(&self, maximized: bool);
    /// Signal the fullscreen state to the client
    fn set_fullscreen(&self, fullscreen: bool);
    /// Signal the minimized state to the client
    fn set_minimized(&self, minimized: bool);
    /// Whether the underlying surface still exists
    fn alive(&self) -> bool {
        true
    }
}

/// Parameters for one shadow render pass
#[derive(Debug, Clone, Copy)]
pub struct ShadowPassParams {
    /// Horizontal offset of the shadow in pixels
    pub offset_x: i32,
    /// Vertical offset of the shadow in pixels
    pub offset_y: i32,
    /// Gaussian radius of the shadow edge
    pub blur_radius: i32,
    /// Overall shadow opacity
    pub opacity: f32,
    /// Shadow color
    pub color: Color,
    /// Output dimensions of the pass
    pub size: Size,
}

/// Parameters for one blur render pass
#[derive(Debug, Clone, Copy)]
pub struct BlurPassParams {
    /// Gaussian radius
    pub radius: i32,
    /// Blend intensity of the blurred result
    pub intensity: f32,
    /// True for the horizontal pass, false for the vertical one
    pub horizontal: bool,
    /// Output dimensions of the pass
    pub size: Size,
}

/// The GPU side of the effects pipeline.
///
/// The effects controller owns the lifecycle of its textures and
/// framebuffers through this trait but never touches GL state itself. The
/// currently bound framebuffer is implicit global state; implementations of
/// the render methods must leave the default framebuffer bound when they
/// return, and [`EffectsRenderer::restore_default_framebuffer`] is called
/// by the controller as a backstop after every batch of passes.
pub trait EffectsRenderer: fmt::Debug {
    /// Allocate an RGBA texture of the given size
    fn create_texture(&mut self, size: Size) -> Result<TextureId, CoreError>;
    /// Allocate a framebuffer with the given texture as its color attachment.
    ///
    /// Returns [`CoreError::InvariantViolation`] if the framebuffer is
    /// incomplete.
    fn create_framebuffer(&mut self, texture: TextureId) -> Result<FramebufferId, CoreError>;
    /// Release a texture
    fn destroy_texture(&mut self, texture: TextureId);
    /// Release a framebuffer
    fn destroy_framebuffer(&mut self, framebuffer: FramebufferId);
    /// Render a colored, offset, blurred silhouette of `source` into `target`
    fn render_shadow(
        &mut self,
        params: &ShadowPassParams,
        source: TextureId,
        target: FramebufferId,
    ) -> Result<(), CoreError>;
    /// Render one Gaussian blur pass of `source` into `target`
    fn render_blur(
        &mut self,
        params: &BlurPassParams,
        source: TextureId,
        target: FramebufferId,
    ) -> Result<(), CoreError>;
    /// Rebind the default framebuffer
    fn restore_default_framebuffer(&mut self);
}
