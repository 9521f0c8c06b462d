// Serial module - blocking link to the motor controller
pub mod link;

pub use link::SerialLink;
