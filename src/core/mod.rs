pub mod gateway;
pub mod prompt;

pub use gateway::{AnswerGateway, GeminiClient};
pub use prompt::build_prompt;
