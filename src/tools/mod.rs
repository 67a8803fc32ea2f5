pub mod alerting;
pub mod filter;
pub mod football;
pub mod social;
pub mod toolbox;

pub use alerting::AlertClient;
pub use football::FootballClient;
pub use social::{Attachments, SocialBridge};
pub use toolbox::{ToolDescriptor, ToolProvider, Toolbox};
