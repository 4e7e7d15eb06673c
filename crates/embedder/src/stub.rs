use crate::error::Result;
use crate::EmbeddingProvider;
use async_trait::async_trait;

/// Deterministic offline provider.
///
/// Vectors are seeded from a hash of the input text and normalized to unit
/// length, so equal texts embed equally while distinct texts land far apart.
/// Selected with `SEMDEX_EMBEDDING_MODE=stub`; used throughout the test
/// suites.
#[derive(Clone, Debug)]
pub struct StubEmbedder {
    dimension: usize,
}

impl StubEmbedder {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(stub_vector(text, self.dimension))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

fn stub_vector(text: &str, dimension: usize) -> Vec<f32> {
    let mut state =
        fnv1a_64(text.as_bytes()) ^ (dimension as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut vector = Vec::with_capacity(dimension);
    for _ in 0..dimension {
        let bits = splitmix64(&mut state);
        let high = (bits >> 32) as u32;
        let unit = f32::from_bits(0x3f80_0000 | (high >> 9)) - 1.0;
        vector.push(unit.mul_add(2.0, -1.0));
    }
    normalize(&mut vector);
    vector
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01B3);
    }
    hash
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn equal_texts_embed_equally() {
        let stub = StubEmbedder::new(8);
        let first = stub.embed("pizza is delicious").await.unwrap();
        let second = stub.embed("pizza is delicious").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn distinct_texts_embed_differently() {
        let stub = StubEmbedder::new(8);
        let pizza = stub.embed("pizza").await.unwrap();
        let bikes = stub.embed("bikes").await.unwrap();
        assert_ne!(pizza, bikes);
    }

    #[tokio::test]
    async fn vectors_have_the_configured_width_and_unit_norm() {
        let stub = StubEmbedder::new(16);
        let vector = stub.embed("anything at all").await.unwrap();
        assert_eq!(vector.len(), 16);

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn empty_text_is_embeddable() {
        let stub = StubEmbedder::new(4);
        let vector = stub.embed("").await.unwrap();
        assert_eq!(vector.len(), 4);
    }
}
