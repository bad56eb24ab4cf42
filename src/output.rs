//! Output handles.
//!
//! An [`Output`] abstracts one physical display surface: its rectangle in
//! the global coordinate space, the insets reserved by panels and bars, and
//! the properties the gap engine adapts to (name, DPI). The embedding
//! compositor owns mode setting and output layout; it updates these handles
//! and calls [`Shell::handle_output_changed`] when something moved.
//!
//! [`Shell::handle_output_changed`]: crate::shell::Shell::handle_output_changed

use std::{
    hash::{Hash, Hasher},
    sync::{Arc, Mutex},
};

use crate::utils::{Rectangle, ReservedArea};

crate::utils::ids::id_gen!(next_output_id, OUTPUT_ID);

/// Identifier of an [`Output`], stable for the life of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputId(usize);

#[derive(Debug)]
struct OutputState {
    geometry: Rectangle,
    reserved: ReservedArea,
    dpi: f32,
}

#[derive(Debug)]
struct OutputInner {
    id: OutputId,
    name: String,
    state: Mutex<OutputState>,
}

/// Represents one physical display
#[derive(Debug, Clone)]
pub struct Output(Arc<OutputInner>);

impl PartialEq for Output {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Output {}

impl Hash for Output {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl Output {
    /// Create a new [`Output`] with the given name and rectangle.
    ///
    /// The DPI defaults to the standard 96; the gap engine treats anything
    /// else as a high- or low-density display.
    pub fn new(name: impl Into<String>, geometry: Rectangle) -> Output {
        Output(Arc::new(OutputInner {
            id: OutputId(next_output_id()),
            name: name.into(),
            state: Mutex::new(OutputState {
                geometry,
                reserved: ReservedArea::default(),
                dpi: 96.0,
            }),
        }))
    }

    /// The id of this output
    pub fn id(&self) -> OutputId {
        self.0.id
    }

    /// The display name of this output
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The full rectangle of this output in the global space
    pub fn geometry(&self) -> Rectangle {
        self.0.state.lock().unwrap().geometry
    }

    /// Change the rectangle of this output.
    ///
    /// Call [`Shell::handle_output_changed`] afterwards so every workspace
    /// rooted here is recalculated.
    ///
    /// [`Shell::handle_output_changed`]: crate::shell::Shell::handle_output_changed
    pub fn set_geometry(&self, geometry: Rectangle) {
        self.0.state.lock().unwrap().geometry = geometry;
    }

    /// The insets reserved for panels and bars
    pub fn reserved_area(&self) -> ReservedArea {
        self.0.state.lock().unwrap().reserved
    }

    /// Change the reserved insets
    pub fn set_reserved_area(&self, reserved: ReservedArea) {
        self.0.state.lock().unwrap().reserved = reserved;
    }

    /// The rectangle left after subtracting the reserved insets
    pub fn usable_geometry(&self) -> Rectangle {
        let state = self.0.state.lock().unwrap();
        state.geometry.shrink(&state.reserved)
    }

    /// The pixel density of this output
    pub fn dpi(&self) -> f32 {
        self.0.state.lock().unwrap().dpi
    }

    /// Change the pixel density of this output
    pub fn set_dpi(&self, dpi: f32) {
        self.0.state.lock().unwrap().dpi = dpi;
    }
}
