pub mod inmemory_repo;
pub mod serde_text;
