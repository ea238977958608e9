pub mod tokenizer;
pub mod types;

pub use tokenizer::*;
pub use types::*;
