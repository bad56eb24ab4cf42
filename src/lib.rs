#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]
// Allow acronyms like BSP
#![allow(clippy::upper_case_acronyms)]

//! # Tessera: the window-management core of a tiling wayland compositor
//!
//! This crate contains the subsystems that decide where windows live on the
//! screen, when they are drawn, and how they respond to input-driven state
//! changes. It does not talk to wayland clients, render pixels, or route
//! input; those belong to the embedding compositor, which drives this crate
//! through the adapter traits in [`adapter`] and the entry points on
//! [`shell::Shell`].
//!
//! ## Structure of the crate
//!
//! The tiling engine lives in [`layout`]: a pluggable [`layout::Layout`]
//! trait dispatched per workspace, with the dwindle (binary-space-partition)
//! implementation in [`layout::dwindle`]. Window classification and initial
//! placement are handled by the declarative rules engine in [`rules`],
//! inter-window spacing by the profile-driven gap controller in [`gaps`],
//! and per-window shadow/blur resources by [`effects`].
//!
//! ## The event loop and state handling
//!
//! Tessera assumes the embedding compositor drives everything from a single
//! cooperative event-dispatch task, as is natural for a wayland compositor.
//! All tree mutations, rule matching, gap computation and effect dirtying
//! happen synchronously inside the [`shell::Shell`] entry point that
//! triggered them; the per-frame tick ([`shell::Shell::frame_tick`])
//! advances every animation from a single monotonic clock and returns
//! whether another frame is wanted. No subsystem spawns tasks or installs
//! timers of its own.

pub mod adapter;
pub mod effects;
mod errors;
pub mod gaps;
pub mod layout;
pub mod output;
pub mod rules;
pub mod shell;
pub mod utils;
pub mod window;
pub mod workspace;

pub use errors::CoreError;
