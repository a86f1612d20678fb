use serde::{Deserialize, Serialize};

/// How generated text is split for chat transports with a message size cap.
///
/// Text of at most `limit` characters goes out whole; anything longer is cut
/// into consecutive `chunk_size`-character pieces. Counting is by `char`,
/// never by byte, and ignores word boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkPolicy {
    pub limit: usize,
    pub chunk_size: usize,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            limit: 2000,
            chunk_size: 1900,
        }
    }
}

impl ChunkPolicy {
    pub fn new(limit: usize, chunk_size: usize) -> Self {
        Self { limit, chunk_size }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        if text.chars().count() <= self.limit {
            return vec![text.to_string()];
        }

        let size = self.chunk_size.max(1);
        let chars: Vec<char> = text.chars().collect();
        chars.chunks(size).map(|c| c.iter().collect()).collect()
    }
}
