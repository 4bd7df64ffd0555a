pub mod config;
pub mod error;
pub mod rpc;
pub mod transport;

pub use config::{ClientConfig, Credentials};
pub use error::{RpcError, ServerError};
pub use rpc::RpcClient;
