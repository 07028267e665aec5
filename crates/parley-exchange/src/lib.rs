pub mod error;
pub mod exchange;
pub mod extract;
pub mod poll;
pub mod orchestrator;
pub mod builder;

pub use builder::ExchangeOrchestratorBuilder;
pub use error::{ErrorKind, ExchangeError, Result};
pub use exchange::{Exchange, SimpleMessage, ThreadResolution};
pub use orchestrator::{ExchangeOrchestrator, DEFAULT_GREETING};
pub use poll::{CompletionState, PollSchedule};
