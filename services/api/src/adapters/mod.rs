pub mod assistant_llm;
pub mod db;
pub mod memory;
pub mod scripture;
pub mod ttl_cache;

pub use assistant_llm::{OpenAiAssistantAdapter, UnconfiguredAssistant};
pub use db::DbAdapter;
pub use memory::MemoryStore;
pub use scripture::ScriptureClient;
pub use ttl_cache::TtlCache;
