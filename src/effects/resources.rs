//! GPU resource sets backing the per-window effects.
//!
//! Allocation goes through the [`EffectsRenderer`] adapter and is
//! transactional: when any piece of a set fails, everything already
//! allocated for it is released before the error propagates.

use crate::adapter::{EffectsRenderer, FramebufferId, TextureId};
use crate::utils::Size;
use crate::CoreError;

/// Offscreen target for the rendered shadow of one window
#[derive(Debug)]
pub struct ShadowResources {
    /// Color texture the shadow is rendered into
    pub texture: TextureId,
    /// Framebuffer wrapping that texture
    pub framebuffer: FramebufferId,
    /// Configured width (window width plus twice the blur radius)
    pub width: i32,
    /// Configured height (window height plus twice the blur radius)
    pub height: i32,
    /// The content no longer matches the window
    pub needs_update: bool,
    /// When the shadow last rendered successfully
    pub last_update_ms: u32,
}

impl ShadowResources {
    pub(super) fn create(
        renderer: &mut dyn EffectsRenderer,
        size: Size,
    ) -> Result<ShadowResources, CoreError> {
        let texture = renderer.create_texture(size)?;
        let framebuffer = match renderer.create_framebuffer(texture) {
            Ok(framebuffer) => framebuffer,
            Err(err) => {
                renderer.destroy_texture(texture);
                return Err(err);
            }
        };
        Ok(ShadowResources {
            texture,
            framebuffer,
            width: size.w,
            height: size.h,
            needs_update: true,
            last_update_ms: 0,
        })
    }

    pub(super) fn destroy(&self, renderer: &mut dyn EffectsRenderer) {
        renderer.destroy_framebuffer(self.framebuffer);
        renderer.destroy_texture(self.texture);
    }

    pub(super) fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Ping-pong targets for the two-pass Gaussian blur of one window
#[derive(Debug)]
pub struct BlurResources {
    /// Output of the horizontal pass
    pub texture_h: TextureId,
    /// Framebuffer for the horizontal pass
    pub framebuffer_h: FramebufferId,
    /// Output of the vertical pass (the final blur)
    pub texture_v: TextureId,
    /// Framebuffer for the vertical pass
    pub framebuffer_v: FramebufferId,
    /// Configured width (the window width)
    pub width: i32,
    /// Configured height (the window height)
    pub height: i32,
    /// The content no longer matches the window
    pub needs_update: bool,
}

impl BlurResources {
    pub(super) fn create(
        renderer: &mut dyn EffectsRenderer,
        size: Size,
    ) -> Result<BlurResources, CoreError> {
        let texture_h = renderer.create_texture(size)?;
        let framebuffer_h = match renderer.create_framebuffer(texture_h) {
            Ok(framebuffer) => framebuffer,
            Err(err) => {
                renderer.destroy_texture(texture_h);
                return Err(err);
            }
        };
        let texture_v = match renderer.create_texture(size) {
            Ok(texture) => texture,
            Err(err) => {
                renderer.destroy_framebuffer(framebuffer_h);
                renderer.destroy_texture(texture_h);
                return Err(err);
            }
        };
        let framebuffer_v = match renderer.create_framebuffer(texture_v) {
            Ok(framebuffer) => framebuffer,
            Err(err) => {
                renderer.destroy_texture(texture_v);
                renderer.destroy_framebuffer(framebuffer_h);
                renderer.destroy_texture(texture_h);
                return Err(err);
            }
        };
        Ok(BlurResources {
            texture_h,
            framebuffer_h,
            texture_v,
            framebuffer_v,
            width: size.w,
            height: size.h,
            needs_update: true,
        })
    }

    pub(super) fn destroy(&self, renderer: &mut dyn EffectsRenderer) {
        renderer.destroy_framebuffer(self.framebuffer_h);
        renderer.destroy_framebuffer(self.framebuffer_v);
        renderer.destroy_texture(self.texture_h);
        renderer.destroy_texture(self.texture_v);
    }

    pub(super) fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}
