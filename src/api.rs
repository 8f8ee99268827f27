//! Wire-format clients for chat-completion APIs.

pub mod openai;
