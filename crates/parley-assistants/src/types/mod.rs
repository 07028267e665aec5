pub mod content;
pub mod message;
pub mod run;

pub use content::MessageContent;
pub use message::{NewMessage, Role, SortOrder, ThreadDeleted, ThreadMessage};
pub use run::{Run, RunLastError, RunStatus};
