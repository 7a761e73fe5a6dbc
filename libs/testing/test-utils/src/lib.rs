//! Shared test utilities for domain testing
//!
//! This crate provides reusable test infrastructure for the domain crates:
//! - `TestRedis`: Redis Stack container with automatic cleanup (feature: "redis")
//! - `TestDataBuilder`: Deterministic test data generation (always available)
//! - `assertions`: Custom assertion helpers (always available)
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::{TestDataBuilder, TestRedis};
//!
//! #[tokio::test]
//! async fn my_redis_test() {
//!     let redis = TestRedis::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_redis_test");
//!
//!     // Keys and index are unique to this test
//!     let prefix = builder.key_prefix("hotel");
//!     let index = builder.index_name("hotel");
//! }
//! ```

#[cfg(feature = "redis")]
mod redis;

#[cfg(feature = "redis")]
pub use self::redis::TestRedis;

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_hotel");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a unique name for testing
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.name("hotel", "main"), "test-hotel-7-main");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// Syntactically valid, test-unique email address
    pub fn email(&self, local: &str) -> String {
        format!("{}+{}@example.test", local, self.seed)
    }

    /// Phone number derived from the seed
    pub fn phone(&self) -> String {
        format!("+1 555 {:04}", self.seed % 10_000)
    }

    /// Redis key prefix that no other test shares, e.g. `test:hotel:42:`
    pub fn key_prefix(&self, entity: &str) -> String {
        format!("test:{}:{}:", entity, self.seed)
    }

    /// Search index name that no other test shares
    pub fn index_name(&self, entity: &str) -> String {
        format!("idx_test_{}_{}", entity, self.seed)
    }
}

/// Test assertion helpers
pub mod assertions {
    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert that `scores` never decrease (nearest-first ordering)
    pub fn assert_non_decreasing(scores: &[f32], context: &str) {
        for pair in scores.windows(2) {
            assert!(
                pair[0] <= pair[1],
                "{}: scores not ordered nearest-first: {:?}",
                context,
                scores
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::new(42);
        let builder2 = TestDataBuilder::new(42);

        assert_eq!(builder1.name("hotel", "test"), builder2.name("hotel", "test"));
        assert_eq!(builder1.email("desk"), builder2.email("desk"));
        assert_eq!(builder1.phone(), builder2.phone());
    }

    #[test]
    fn test_data_builder_different_names() {
        let builder1 = TestDataBuilder::from_test_name("test1");
        let builder2 = TestDataBuilder::from_test_name("test2");

        // Different test names should generate different data
        assert_ne!(builder1.key_prefix("hotel"), builder2.key_prefix("hotel"));
        assert_ne!(builder1.index_name("hotel"), builder2.index_name("hotel"));
    }

    #[test]
    fn test_key_prefix_shape() {
        let builder = TestDataBuilder::new(9);
        assert_eq!(builder.key_prefix("hotel"), "test:hotel:9:");
        assert_eq!(builder.index_name("hotel"), "idx_test_hotel_9");
        assert_eq!(builder.email("desk"), "desk+9@example.test");
    }

    #[test]
    fn test_assert_non_decreasing() {
        assertions::assert_non_decreasing(&[0.0, 0.1, 0.1, 0.5], "ordered");
        assert_eq!(assertions::assert_some(Some(3), "value"), 3);
    }

    #[test]
    #[should_panic(expected = "not ordered")]
    fn test_assert_non_decreasing_panics() {
        assertions::assert_non_decreasing(&[0.3, 0.1], "unordered");
    }
}
