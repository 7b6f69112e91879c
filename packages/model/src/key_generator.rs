use crc32fast::Hasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

/// Namespace of the process-wide generator used by [`generate_key`]
pub const DEFAULT_NAMESPACE: &str = "folio";

/// Derive a generator seed from a namespace using CRC32
pub fn namespace_seed(namespace: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(namespace.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential key generator for document nodes
///
/// Keys have the form `{seed}-{n}`. The counter is atomic, so a single
/// generator can be shared between threads without locking.
#[derive(Debug)]
pub struct KeyGenerator {
    seed: String,
    count: AtomicU64,
}

impl KeyGenerator {
    pub fn new(namespace: &str) -> Self {
        Self::from_seed(namespace_seed(namespace))
    }

    pub fn from_seed(seed: String) -> Self {
        Self {
            seed,
            count: AtomicU64::new(0),
        }
    }

    /// Generate next sequential key
    pub fn next_key(&self) -> String {
        let n = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.seed, n)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// The process-wide generator
    pub fn global() -> &'static KeyGenerator {
        static GLOBAL: OnceLock<KeyGenerator> = OnceLock::new();
        GLOBAL.get_or_init(|| KeyGenerator::new(DEFAULT_NAMESPACE))
    }
}

/// Generate a process-unique key from the global generator
pub fn generate_key() -> String {
    KeyGenerator::global().next_key()
}
