//! egui application: state, controller, and renderer.

/// Controller owning all mutable state and background jobs.
pub mod controller;
/// Render-friendly state tree consumed by the renderer.
pub mod state;
/// egui renderer.
pub mod ui;
/// Pure derivations from loaded data to view rows.
pub mod view_model;
