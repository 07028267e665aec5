pub mod client;

pub use client::{OpenAIAssistantsClient, OpenAIAssistantsClientBuilder};
