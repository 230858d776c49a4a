pub mod openai;
pub mod utils;
