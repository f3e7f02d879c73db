pub mod arguments;
pub mod classifier;
pub mod detail;
pub mod links;
pub mod logs;

pub use arguments::SerializedArguments;
pub use detail::{ActionLink, ArgumentsPanel, DetailRow, ViewModel};
pub use links::{ActionKind, ApiLinks, LinkResolver};
pub use logs::LogEntry;
