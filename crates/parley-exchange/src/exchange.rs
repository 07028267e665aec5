use parley_assistants::Role;
use serde::Serialize;

/// Which thread an exchange ended up on and how it got there
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadResolution {
    /// No thread id was given, a new thread was created
    Created(String),
    /// The given thread accepted the message
    Continued(String),
    /// The given thread could not be continued, a new one replaced it
    Recovered {
        thread_id: String,
        stale_thread_id: String,
    },
}

impl ThreadResolution {
    /// Thread the answer lives on
    pub fn thread_id(&self) -> &str {
        match self {
            ThreadResolution::Created(thread_id)
            | ThreadResolution::Continued(thread_id)
            | ThreadResolution::Recovered { thread_id, .. } => thread_id,
        }
    }
}

/// Outcome of one `ask`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub thread: ThreadResolution,
    pub answer: String,
}

impl Exchange {
    pub fn new(thread: ThreadResolution, answer: impl Into<String>) -> Self {
        Self {
            thread,
            answer: answer.into(),
        }
    }

    pub fn thread_id(&self) -> &str {
        self.thread.thread_id()
    }

    pub fn was_recovered(&self) -> bool {
        matches!(self.thread, ThreadResolution::Recovered { .. })
    }
}

/// Role/text pair as shown in a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleMessage {
    pub role: Role,
    pub content: String,
}

impl SimpleMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}
