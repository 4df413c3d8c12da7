use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Builder;

/// Unique identifier for one generated question instance.
///
/// The prefix names the generator (`pv-…`, `ocpd-…`), the remainder is a
/// random v4 UUID drawn from the caller's RNG so seeded runs stay reproducible.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(String);

impl QuestionId {
    /// Wraps an existing identifier.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Draws a fresh identifier tagged with `prefix`.
    #[must_use]
    pub fn generate<R: RngCore + ?Sized>(prefix: &str, rng: &mut R) -> Self {
        let mut bytes = [0_u8; 16];
        rng.fill_bytes(&mut bytes);
        let uuid = Builder::from_random_bytes(bytes).into_uuid();
        Self(format!("{prefix}-{}", uuid.simple()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Generator prefix, e.g. `pv` for `pv-9f…`.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.0.split_once('-').map_or(self.0.as_str(), |(p, _)| p)
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn generated_ids_carry_prefix_and_differ() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = QuestionId::generate("pv", &mut rng);
        let b = QuestionId::generate("pv", &mut rng);
        assert_eq!(a.prefix(), "pv");
        assert!(a.as_str().starts_with("pv-"));
        assert_ne!(a, b);
    }

    #[test]
    fn same_seed_yields_same_id() {
        let a = QuestionId::generate("ocpd", &mut StdRng::seed_from_u64(42));
        let b = QuestionId::generate("ocpd", &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
