// Infrastructure module - transport and platform plumbing
pub mod logging;
pub mod serial;
pub mod tcp;
