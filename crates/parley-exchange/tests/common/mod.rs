//! In-memory assistant service driven by a status script.
#![allow(dead_code)]

use async_trait::async_trait;
use parley_assistants::{
    AssistantsError, ConversationClient, MessageContent, NewMessage, Role, Run, RunStatus,
    SortOrder, ThreadDeleted, ThreadMessage,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateThreadAndRun { assistant_id: String, seed: Vec<NewMessage> },
    AppendMessage { thread_id: String, content: String },
    StartRun { thread_id: String },
    GetRun { run_id: String },
    ListMessages { thread_id: String, order: SortOrder },
    DeleteThread { thread_id: String },
}

#[derive(Debug, Clone, Copy)]
pub enum Failure {
    NotFound,
    Api(u16),
}

impl Failure {
    fn error(self, resource: &str) -> AssistantsError {
        match self {
            Failure::NotFound => AssistantsError::NotFound(resource.to_string()),
            Failure::Api(status) => AssistantsError::Api {
                status,
                message: format!("scripted failure for {}", resource),
            },
        }
    }
}

struct RunScript {
    thread_id: String,
    statuses: VecDeque<RunStatus>,
    answered: bool,
}

struct State {
    threads: HashMap<String, Vec<ThreadMessage>>,
    runs: HashMap<String, RunScript>,
    statuses: Vec<RunStatus>,
    reply: Option<MessageContent>,
    create_failure: Option<Failure>,
    append_failure: Option<Failure>,
    list_failure: Option<Failure>,
    delete_confirms: bool,
    calls: Vec<Call>,
    next_id: usize,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}_{}", prefix, self.next_id)
    }

    fn push_message(&mut self, thread_id: &str, role: Role, content: MessageContent) -> ThreadMessage {
        let id = self.next_id("msg");
        let message = ThreadMessage::new(id, thread_id, role, vec![content]);
        self.threads
            .entry(thread_id.to_string())
            .or_default()
            .push(message.clone());
        message
    }

    fn start_run(&mut self, thread_id: &str) -> Run {
        let run_id = self.next_id("run");
        let statuses = self.statuses.iter().copied().collect();
        self.runs.insert(
            run_id.clone(),
            RunScript {
                thread_id: thread_id.to_string(),
                statuses,
                answered: false,
            },
        );
        self.advance(&run_id)
    }

    /// Next scripted status; the last one repeats forever
    fn advance(&mut self, run_id: &str) -> Run {
        let script = self.runs.get_mut(run_id).expect("unknown run");
        let status = if script.statuses.len() > 1 {
            script.statuses.pop_front().unwrap()
        } else {
            script
                .statuses
                .front()
                .copied()
                .unwrap_or(RunStatus::Completed)
        };
        let thread_id = script.thread_id.clone();
        let reply_due = status.is_success() && !script.answered;
        if reply_due {
            script.answered = true;
        }

        if reply_due {
            let content = self
                .reply
                .clone()
                .unwrap_or_else(|| MessageContent::text(self.reply_for(&thread_id)));
            self.push_message(&thread_id, Role::Assistant, content);
        }

        Run::new(run_id, thread_id, status)
    }

    fn reply_for(&self, thread_id: &str) -> String {
        let question = self
            .threads
            .get(thread_id)
            .and_then(|messages| messages.iter().rev().find(|m| m.role == Role::User))
            .and_then(|message| message.first_content())
            .and_then(|content| content.as_text())
            .unwrap_or_default();
        format!("Reply to: {}", question)
    }
}

pub struct ScriptedClient {
    state: Mutex<State>,
}

impl ScriptedClient {
    /// Every run completes as soon as it starts
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                threads: HashMap::new(),
                runs: HashMap::new(),
                statuses: vec![RunStatus::Completed],
                reply: None,
                create_failure: None,
                append_failure: None,
                list_failure: None,
                delete_confirms: true,
                calls: Vec::new(),
                next_id: 0,
            }),
        }
    }

    /// Status returned by the start call, then one per `get_run`
    pub fn with_run_statuses(self, statuses: Vec<RunStatus>) -> Self {
        self.state.lock().unwrap().statuses = statuses;
        self
    }

    pub fn with_reply_content(self, content: MessageContent) -> Self {
        self.state.lock().unwrap().reply = Some(content);
        self
    }

    pub fn with_thread(self, thread_id: &str, messages: Vec<(Role, MessageContent)>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.threads.insert(thread_id.to_string(), Vec::new());
            for (role, content) in messages {
                state.push_message(thread_id, role, content);
            }
        }
        self
    }

    pub fn failing_create(self, failure: Failure) -> Self {
        self.state.lock().unwrap().create_failure = Some(failure);
        self
    }

    pub fn failing_append(self, failure: Failure) -> Self {
        self.state.lock().unwrap().append_failure = Some(failure);
        self
    }

    pub fn failing_list(self, failure: Failure) -> Self {
        self.state.lock().unwrap().list_failure = Some(failure);
        self
    }

    pub fn unconfirmed_delete(self) -> Self {
        self.state.lock().unwrap().delete_confirms = false;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn get_run_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::GetRun { .. }))
            .count()
    }

    pub fn has_thread(&self, thread_id: &str) -> bool {
        self.state.lock().unwrap().threads.contains_key(thread_id)
    }

    /// Messages of a thread, oldest first
    pub fn transcript(&self, thread_id: &str) -> Vec<ThreadMessage> {
        self.state
            .lock()
            .unwrap()
            .threads
            .get(thread_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ConversationClient for ScriptedClient {
    async fn create_thread_and_run(
        &self,
        messages: Vec<NewMessage>,
        assistant_id: &str,
    ) -> Result<Run, AssistantsError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateThreadAndRun {
            assistant_id: assistant_id.to_string(),
            seed: messages.clone(),
        });
        if let Some(failure) = state.create_failure {
            return Err(failure.error(&format!("assistant {}", assistant_id)));
        }

        let thread_id = state.next_id("thread");
        state.threads.insert(thread_id.clone(), Vec::new());
        for message in messages {
            state.push_message(&thread_id, message.role, MessageContent::text(message.content));
        }
        Ok(state.start_run(&thread_id))
    }

    async fn append_message(
        &self,
        thread_id: &str,
        message: NewMessage,
    ) -> Result<ThreadMessage, AssistantsError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::AppendMessage {
            thread_id: thread_id.to_string(),
            content: message.content.clone(),
        });
        if let Some(failure) = state.append_failure {
            return Err(failure.error(&format!("thread {}", thread_id)));
        }
        if !state.threads.contains_key(thread_id) {
            return Err(Failure::NotFound.error(&format!("thread {}", thread_id)));
        }

        Ok(state.push_message(thread_id, message.role, MessageContent::text(message.content)))
    }

    async fn start_run(&self, thread_id: &str, _assistant_id: &str) -> Result<Run, AssistantsError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::StartRun {
            thread_id: thread_id.to_string(),
        });
        if !state.threads.contains_key(thread_id) {
            return Err(Failure::NotFound.error(&format!("thread {}", thread_id)));
        }

        Ok(state.start_run(thread_id))
    }

    async fn get_run(&self, _thread_id: &str, run_id: &str) -> Result<Run, AssistantsError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::GetRun {
            run_id: run_id.to_string(),
        });
        if !state.runs.contains_key(run_id) {
            return Err(Failure::NotFound.error(&format!("run {}", run_id)));
        }

        Ok(state.advance(run_id))
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        order: SortOrder,
    ) -> Result<Vec<ThreadMessage>, AssistantsError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListMessages {
            thread_id: thread_id.to_string(),
            order,
        });
        if let Some(failure) = state.list_failure {
            return Err(failure.error(&format!("thread {}", thread_id)));
        }

        let mut messages = state
            .threads
            .get(thread_id)
            .cloned()
            .ok_or_else(|| Failure::NotFound.error(&format!("thread {}", thread_id)))?;
        if order == SortOrder::Desc {
            messages.reverse();
        }
        Ok(messages)
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<ThreadDeleted, AssistantsError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::DeleteThread {
            thread_id: thread_id.to_string(),
        });
        if !state.threads.contains_key(thread_id) {
            return Err(Failure::NotFound.error(&format!("thread {}", thread_id)));
        }

        let deleted = state.delete_confirms;
        if deleted {
            state.threads.remove(thread_id);
        }
        Ok(ThreadDeleted {
            id: thread_id.to_string(),
            deleted,
        })
    }
}
