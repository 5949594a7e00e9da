//! Frame render boundary
//!
//! The display is a pure consumer: once per tick the shell hands it a
//! snapshot of panel state and it produces nothing back into the core.
//! The trait is generic over the snapshot type so this crate stays
//! independent of the core's view structs.

/// Renders one frame from a state snapshot.
pub trait Renderer<V> {
    /// Draw a complete frame
    fn render(&mut self, view: &V);
}
