use strata_types::ObjectId;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g. `"strata-value-v1"`) that is fed to
/// BLAKE3 ahead of the payload.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for canonical value encodings.
    pub const VALUE: Self = Self {
        domain: "strata-value-v1",
    };
    /// Hasher for sequence leaf chunks.
    pub const LEAF: Self = Self {
        domain: "strata-leaf-v1",
    };
    /// Hasher for sequence index chunks.
    pub const INDEX: Self = Self {
        domain: "strata-index-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ObjectId::from_hash(*hasher.finalize().as_bytes())
    }

    /// Raw BLAKE3 hash without domain separation.
    pub fn raw_hash(data: &[u8]) -> [u8; 32] {
        *blake3::hash(data).as_bytes()
    }

    pub fn domain(&self) -> &str {
        self.domain
    }
}
