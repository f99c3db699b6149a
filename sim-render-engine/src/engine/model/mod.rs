//! Read-only access to the loaded physics model.
//!
//! The physics engine describes a model as a flat, column-oriented record
//! set: every entity kind (body, geom, mesh, material, texture, light,
//! actuator, keyframe) is a block of parallel arrays addressed by
//! `id * stride [+ component]`. Nothing in this module owns physics
//! semantics; it is the data contract the viewer consumes.
//!
//! - [`manifest`] holds the raw columns plus structural validation.
//! - [`views`] wraps them in per-entity accessor structs so the rest of the
//!   crate never touches stride arithmetic.
//! - [`simulation`] owns the live state (joint positions, controls, body
//!   world poses) and its teardown discipline.

pub mod manifest;
pub mod simulation;
pub mod views;
