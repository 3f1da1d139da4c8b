pub mod config_service;
pub mod document_extractor;
pub mod json_log_store;
pub mod memory_log_store;
pub mod paths;
pub mod secret_service;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::document_extractor::FileDocumentExtractor;
pub use crate::json_log_store::JsonFileLogStore;
pub use crate::memory_log_store::InMemoryLogStore;
pub use crate::paths::NovaPaths;
pub use crate::secret_service::SecretServiceImpl;
