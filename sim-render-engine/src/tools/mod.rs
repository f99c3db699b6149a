/// Pointer-driven grab/drag and highlight interaction against the scene.
pub mod drag;

/// Keyboard actions carried over from the reference viewer.
pub mod shortcuts;
