//! Headless scroll animations.
//!
//! Nothing here knows about a browser. The engine turns scroll positions,
//! pointer positions and clock ticks into per-element [`Style`]s and class
//! toggles; a page script (or the `wasm` bindings) applies them.

pub mod easing;
pub mod interactions;
pub mod orchestrator;
pub mod recorder;
pub mod style;
pub mod timeline;
pub mod trigger;

pub use easing::Ease;
pub use orchestrator::{BlogCardElement, ClassChange, Frame, ScrollOrchestrator};
pub use recorder::{
    Recorder, ReplaySchedule, ReplayStep, ScrollEvent, load_trace, replay_schedule, save_trace,
};
pub use style::{Style, StyleProps};
pub use timeline::{Position, Timeline, TweenVars};
pub use trigger::{Bounds, ScrollTrigger, TriggerEvent, TriggerPoint};
