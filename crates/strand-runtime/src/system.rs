//! Runtime system trait

use strand_core::Result;

use crate::environment::{Environment, InstanceSink, MeshSink};

/// Everything a system sees during one tick
pub struct FrameContext<'a> {
    pub env: &'a dyn Environment,
    pub meshes: &'a mut dyn MeshSink,
    pub instances: &'a mut dyn InstanceSink,
}

/// A system that can be ticked by the host's update loop
///
/// Systems are updated in registration order, once per frame.
pub trait RuntimeSystem {
    /// Called once before the first update
    fn initialize(&mut self, ctx: &mut FrameContext<'_>) -> Result<()>;

    /// Called once per frame
    fn update(&mut self, ctx: &mut FrameContext<'_>, dt: f64) -> Result<()>;

    /// Called when the system is being shut down
    fn shutdown(&mut self) -> Result<()>;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
