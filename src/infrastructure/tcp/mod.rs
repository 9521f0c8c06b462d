// TCP module - push server for the supervising GUI
pub mod server;

pub use server::SocketServer;
