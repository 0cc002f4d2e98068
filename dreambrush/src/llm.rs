use std::pin::Pin;

use color_eyre::Result;

pub mod gemini;
pub use gemini::Gemini;

/// A chat model that turns a multi-turn conversation into a single text
/// completion.
pub trait Llm {
    fn complete<'a>(&'a self, req: Request) -> CompletionFuture<'a>;
}

pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

pub struct Request {
    pub system: String,
    pub messages: Vec<InputMessage>,
}

#[derive(Debug, Clone)]
pub struct InputMessage {
    pub role: Role,
    pub content: String,
}

impl InputMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    User,
    Model,
}
