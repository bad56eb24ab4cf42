//! Window handles.
//!
//! A [`Window`] is a cheaply clonable handle to one toplevel. The embedding
//! compositor creates it around a [`SurfaceHandle`] when a client surface
//! is associated, hands it to [`Shell::handle_new_window`], and drops its
//! copies after [`Shell::handle_window_destroyed`].
//!
//! [`Shell::handle_new_window`]: crate::shell::Shell::handle_new_window
//! [`Shell::handle_window_destroyed`]: crate::shell::Shell::handle_window_destroyed

use std::{
    hash::{Hash, Hasher},
    sync::{Arc, Mutex},
};

use crate::adapter::{SceneNodeId, SurfaceHandle};
use crate::effects::WindowEffects;
use crate::output::OutputId;
use crate::utils::Rectangle;
use crate::workspace::WorkspaceId;

crate::utils::ids::id_gen!(next_window_id, WINDOW_ID);

/// The client-visible identity of a window.
///
/// Every field may be absent and may change over the window's lifetime.
#[derive(Debug, Clone, Default)]
pub struct WindowIdentity {
    /// The wayland app id
    pub app_id: Option<String>,
    /// The window class (X11 clients; usually mirrors the app id)
    pub class: Option<String>,
    /// The window title
    pub title: Option<String>,
    /// The instance name (X11 clients)
    pub instance: Option<String>,
}

#[derive(Debug)]
struct WindowState {
    identity: WindowIdentity,
    geometry: Rectangle,
    floating: bool,
    maximized: bool,
    fullscreen: bool,
    saved_geometry: Option<Rectangle>,
    workspace: Option<WorkspaceId>,
    output: Option<OutputId>,
    opacity: f32,
    mapped: bool,
    pip: bool,
    scene_node: Option<SceneNodeId>,
}

#[derive(Debug)]
struct WindowInner {
    id: usize,
    surface: Arc<dyn SurfaceHandle>,
    state: Mutex<WindowState>,
    effects: Mutex<Option<WindowEffects>>,
}

/// Represents a single application window
#[derive(Debug, Clone)]
pub struct Window(Arc<WindowInner>);

impl PartialEq for Window {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Window {}

impl Hash for Window {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl Window {
    /// Construct a new [`Window`] around a client surface
    pub fn new(surface: Arc<dyn SurfaceHandle>) -> Window {
        Window(Arc::new(WindowInner {
            id: next_window_id(),
            surface,
            state: Mutex::new(WindowState {
                identity: WindowIdentity::default(),
                geometry: Rectangle::default(),
                floating: false,
                maximized: false,
                fullscreen: false,
                saved_geometry: None,
                workspace: None,
                output: None,
                opacity: 1.0,
                mapped: false,
                pip: false,
                scene_node: None,
            }),
            effects: Mutex::new(None),
        }))
    }

    /// The process-unique id of this window
    pub fn id(&self) -> usize {
        self.0.id
    }

    /// Whether the underlying surface still exists
    pub fn alive(&self) -> bool {
        self.0.surface.alive()
    }

    /// The client identity used for rule matching
    pub fn identity(&self) -> WindowIdentity {
        self.0.state.lock().unwrap().identity.clone()
    }

    /// Replace the client identity.
    ///
    /// Clients update titles and app ids at any time; rules are only
    /// re-evaluated on window creation, so this does not re-trigger them.
    pub fn set_identity(&self, identity: WindowIdentity) {
        self.0.state.lock().unwrap().identity = identity;
    }

    /// The current geometry of this window
    pub fn geometry(&self) -> Rectangle {
        self.0.state.lock().unwrap().geometry
    }

    /// Update the stored geometry without notifying the client
    pub fn set_geometry(&self, geometry: Rectangle) {
        self.0.state.lock().unwrap().geometry = geometry;
    }

    /// Update the stored geometry and ask the client to take it on
    pub fn commit_geometry(&self, geometry: Rectangle) {
        self.0.state.lock().unwrap().geometry = geometry;
        self.0.surface.configure(geometry);
    }

    /// Whether this window floats above the tiled layer
    pub fn is_floating(&self) -> bool {
        self.0.state.lock().unwrap().floating
    }

    /// Move this window into or out of the floating layer
    pub fn set_floating(&self, floating: bool) {
        self.0.state.lock().unwrap().floating = floating;
    }

    /// Whether this window is maximized
    pub fn is_maximized(&self) -> bool {
        self.0.state.lock().unwrap().maximized
    }

    /// Maximize this window to `area`, or restore its pre-maximize
    /// geometry.
    ///
    /// The geometry in effect before maximizing is saved and comes back on
    /// restore. The client is signalled and configured.
    pub fn set_maximized(&self, maximized: bool, area: Rectangle) {
        let restore = {
            let mut state = self.0.state.lock().unwrap();
            if state.maximized == maximized {
                return;
            }
            state.maximized = maximized;
            if maximized {
                state.saved_geometry = Some(state.geometry);
                state.geometry = area;
                None
            } else {
                state.saved_geometry.take().map(|saved| {
                    state.geometry = saved;
                    saved
                })
            }
        };
        self.0.surface.set_maximized(maximized);
        if maximized {
            self.0.surface.configure(area);
        } else if let Some(saved) = restore {
            self.0.surface.configure(saved);
        }
    }

    /// Whether this window covers its whole output
    pub fn is_fullscreen(&self) -> bool {
        self.0.state.lock().unwrap().fullscreen
    }

    /// Fullscreen this window onto `area`, or restore its pre-fullscreen
    /// geometry
    pub fn set_fullscreen(&self, fullscreen: bool, area: Rectangle) {
        let restore = {
            let mut state = self.0.state.lock().unwrap();
            if state.fullscreen == fullscreen {
                return;
            }
            state.fullscreen = fullscreen;
            if fullscreen {
                state.saved_geometry = Some(state.geometry);
                state.geometry = area;
                None
            } else {
                state.saved_geometry.take().map(|saved| {
                    state.geometry = saved;
                    saved
                })
            }
        };
        self.0.surface.set_fullscreen(fullscreen);
        if fullscreen {
            self.0.surface.configure(area);
        } else if let Some(saved) = restore {
            self.0.surface.configure(saved);
        }
    }

    /// The geometry saved before the last maximize/fullscreen, if any
    pub fn saved_geometry(&self) -> Option<Rectangle> {
        self.0.state.lock().unwrap().saved_geometry
    }

    /// The workspace this window currently belongs to
    pub fn workspace(&self) -> Option<WorkspaceId> {
        self.0.state.lock().unwrap().workspace
    }

    pub(crate) fn set_workspace(&self, workspace: Option<WorkspaceId>) {
        self.0.state.lock().unwrap().workspace = workspace;
    }

    /// The output this window currently shows on
    pub fn output(&self) -> Option<OutputId> {
        self.0.state.lock().unwrap().output
    }

    pub(crate) fn set_output(&self, output: Option<OutputId>) {
        self.0.state.lock().unwrap().output = output;
    }

    /// The current opacity of this window
    pub fn opacity(&self) -> f32 {
        self.0.state.lock().unwrap().opacity
    }

    pub(crate) fn set_opacity(&self, opacity: f32) {
        self.0.state.lock().unwrap().opacity = opacity.clamp(0.0, 1.0);
    }

    /// Whether the window's surface has been mapped.
    ///
    /// Effects are configured for unmapped windows but only rendered once
    /// the window maps.
    pub fn is_mapped(&self) -> bool {
        self.0.state.lock().unwrap().mapped
    }

    /// Mark the window's surface as mapped or unmapped
    pub fn set_mapped(&self, mapped: bool) {
        self.0.state.lock().unwrap().mapped = mapped;
    }

    /// Whether this window is in picture-in-picture mode
    pub fn is_pip(&self) -> bool {
        self.0.state.lock().unwrap().pip
    }

    pub(crate) fn set_pip(&self, pip: bool) {
        self.0.state.lock().unwrap().pip = pip;
    }

    /// The scene node the compositor created for this window, if any
    pub fn scene_node(&self) -> Option<SceneNodeId> {
        self.0.state.lock().unwrap().scene_node
    }

    /// Associate the compositor's scene node for this window
    pub fn set_scene_node(&self, node: Option<SceneNodeId>) {
        self.0.state.lock().unwrap().scene_node = node;
    }

    /// The client-facing surface behind this window
    pub fn surface(&self) -> &Arc<dyn SurfaceHandle> {
        &self.0.surface
    }

    pub(crate) fn with_effects<T>(&self, f: impl FnOnce(&mut Option<WindowEffects>) -> T) -> T {
        f(&mut self.0.effects.lock().unwrap())
    }
}
