pub mod session;
pub mod transport;
pub mod types;

pub use session::{Session, SessionStatus, HANDSHAKE_TIMEOUT};
pub use transport::{spawn_process, ConnectionParams};
pub use types::{ToolArguments, ToolCallRequest, ToolCallResponse, ToolContent};
