pub mod completion_llm;
pub mod db;
pub mod fetch;
pub mod oembed;
pub mod search;
pub mod transcripts;
pub mod trends_llm;

pub use completion_llm::OpenAiCompletionAdapter;
pub use db::DbAdapter;
pub use fetch::{fetch_strategies, http_client};
pub use oembed::OEmbedAdapter;
pub use search::GoogleSearchAdapter;
pub use transcripts::CannedTranscriptAdapter;
pub use trends_llm::TrendsLlmAdapter;
