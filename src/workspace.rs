//! Workspace handles.
//!
//! A [`Workspace`] groups the windows shown together on one output. Ids are
//! assigned monotonically by the shell; window rules address workspaces by
//! these ids.

use std::sync::{Arc, Mutex};

use crate::output::OutputId;
use crate::window::Window;

/// Identifier of a [`Workspace`], assigned monotonically at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkspaceId(
    /// The raw workspace number, as referenced by window rules
    pub u32,
);

#[derive(Debug)]
struct WorkspaceState {
    output: OutputId,
    windows: Vec<Window>,
}

#[derive(Debug)]
struct WorkspaceInner {
    id: WorkspaceId,
    name: String,
    state: Mutex<WorkspaceState>,
}

/// A logical grouping of windows on one output
#[derive(Debug, Clone)]
pub struct Workspace(Arc<WorkspaceInner>);

impl PartialEq for Workspace {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Workspace {}

impl Workspace {
    pub(crate) fn new(id: WorkspaceId, name: impl Into<String>, output: OutputId) -> Workspace {
        Workspace(Arc::new(WorkspaceInner {
            id,
            name: name.into(),
            state: Mutex::new(WorkspaceState {
                output,
                windows: Vec::new(),
            }),
        }))
    }

    /// The id of this workspace
    pub fn id(&self) -> WorkspaceId {
        self.0.id
    }

    /// The name of this workspace (used by gap profile patterns)
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The output this workspace is attached to
    pub fn output(&self) -> OutputId {
        self.0.state.lock().unwrap().output
    }

    /// The windows of this workspace, in creation order
    pub fn windows(&self) -> Vec<Window> {
        self.0.state.lock().unwrap().windows.clone()
    }

    /// Number of windows on this workspace
    pub fn window_count(&self) -> usize {
        self.0.state.lock().unwrap().windows.len()
    }

    /// Number of tiled, non-fullscreen windows on this workspace
    pub fn tiled_count(&self) -> usize {
        self.0
            .state
            .lock()
            .unwrap()
            .windows
            .iter()
            .filter(|w| !w.is_floating() && !w.is_fullscreen())
            .count()
    }

    /// Number of floating windows on this workspace
    pub fn floating_count(&self) -> usize {
        self.0
            .state
            .lock()
            .unwrap()
            .windows
            .iter()
            .filter(|w| w.is_floating())
            .count()
    }

    /// Whether any window on this workspace is fullscreen
    pub fn has_fullscreen(&self) -> bool {
        self.0
            .state
            .lock()
            .unwrap()
            .windows
            .iter()
            .any(|w| w.is_fullscreen())
    }

    pub(crate) fn add_window(&self, window: &Window) {
        let mut state = self.0.state.lock().unwrap();
        if !state.windows.contains(window) {
            state.windows.push(window.clone());
        }
        drop(state);
        window.set_workspace(Some(self.0.id));
        window.set_output(Some(self.output()));
    }

    pub(crate) fn remove_window(&self, window: &Window) {
        let mut state = self.0.state.lock().unwrap();
        state.windows.retain(|w| w != window);
        drop(state);
        if window.workspace() == Some(self.0.id) {
            window.set_workspace(None);
            window.set_output(None);
        }
    }

    /// Whether the given window belongs to this workspace
    pub fn contains(&self, window: &Window) -> bool {
        self.0.state.lock().unwrap().windows.contains(window)
    }
}
