// Core module - transport-independent message logic
pub mod codec;
pub mod message;
pub mod sync;

pub use message::{FieldKind, FieldValue, Message};
pub use sync::{IoHooks, NoopHooks};
