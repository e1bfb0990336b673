//! Capabilities the core uses to talk to the shell.
//!
//! Render is Crux's built-in capability, used directly since it is all the
//! view needs. Backend and Timer are ours.

mod backend;
mod timer;

pub use self::backend::{
    Backend, BackendError, BackendOperation, BackendOutput, BackendResult,
};
pub use self::timer::{Timer, TimerOperation, TimerOutput};
pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub backend: Backend<Event>,
    pub timer: Timer<Event>,
}
