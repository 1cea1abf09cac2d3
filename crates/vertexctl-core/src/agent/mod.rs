//! Agent adapters
//!
//! [`Ag2Agent`] wraps a conversational [`Runnable`] built from a model name,
//! a system instruction and a set of typed [`FunctionTool`]s. The default
//! runnable is a [`ConversableAgent`] talking to `generateContent`; supply a
//! [`RunnableBuilder`] to plug in another engine.

pub mod ag2;
pub mod conversable;
pub mod error;
pub mod runnable;
pub mod tools;

pub use ag2::{Ag2Agent, Ag2AgentBuilder};
pub use conversable::ConversableAgent;
pub use error::AgentError;
pub use runnable::{RunOptions, RunOutput, Runnable, RunnableBuilder, RunnableConfig};
pub use tools::{FunctionDeclaration, FunctionTool, ParamType, RunnableTool, ToolParam};
