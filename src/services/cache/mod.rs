pub mod client;
pub mod memory;
pub mod valkey;

pub use client::{CacheClient, CacheError, WindowHit};
pub use memory::MemoryClient;
pub use valkey::ValkeyClient;
