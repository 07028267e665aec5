pub mod ask;
pub mod health;
pub mod thread;
