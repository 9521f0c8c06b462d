//! RoboCom Library
//!
//! Robot controller communication bridge: a binary message codec and
//! blocking serial link toward the motor microcontroller, and a TCP
//! push server delivering the same messages as JSON lines to the
//! supervising GUI.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use crate::core::codec;
pub use crate::core::message::{FieldKind, FieldValue, Message};
pub use crate::core::sync::{IoHooks, NoopHooks};
pub use crate::domain::config::RobocomConfig;
pub use crate::domain::error::{ComError, ComResult, ProtocolError};
pub use crate::infrastructure::serial::SerialLink;
pub use crate::infrastructure::tcp::SocketServer;
