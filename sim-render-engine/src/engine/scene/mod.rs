//! Scene synthesis: turning the flat model description into the render
//! engine's entity hierarchy.
//!
//! Runs once per model (re)load. Geoms become renderable child entities of
//! their owning body nodes, geometry/material/texture resources are built
//! lazily and memoized in per-call caches, lights attach to the world body,
//! and finally every body parents into the tree under the world anchor.

pub mod geometry;
pub mod lights;
pub mod material;
pub mod sync;
pub mod synthesize;
