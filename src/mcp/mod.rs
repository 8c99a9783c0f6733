pub mod codec;
pub mod registry;
pub mod server;
pub mod tools;
pub mod types;

pub use server::{McpServer, RpcMethod};
pub use types::{ContentEnvelope, Outcome, RequestEnvelope, ResponseEnvelope};
