//! Post directory: CRUD access to a collection of posts over tarpc.

pub mod config;
pub mod directory;
pub mod error;
pub mod logging;
pub mod post;
pub mod rpc;
pub mod shared_types;
pub mod store;

pub use directory::PostDirectory;
pub use error::{RpcStatus, ServiceError, StatusCode};
pub use post::PostItem;
pub use rpc::PostServer;
pub use shared_types::*;
