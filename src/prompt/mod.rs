//! Natural-language front-end.
//!
//! - `interpreter`: text → `(start, end, concept)` via a language model
//! - `service`: run the matching query and phrase the answer

pub mod interpreter;
pub mod service;

pub use interpreter::{Interpreter, OllamaInterpreter, parse_interpretation};
pub use service::PromptService;
