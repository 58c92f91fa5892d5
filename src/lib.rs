//! Shared-state object cache (the flyweight pattern).
//!
//! A [`FlyweightFactory`] hands out one immutable [`Flyweight`] per distinct
//! set of intrinsic attributes. Keys are order-insensitive: attributes are
//! sorted before being joined, so permutations resolve to the same record.
//!
//! ```
//! use flyweight_cache::{Attributes, FlyweightFactory};
//! use std::sync::Arc;
//!
//! let mut factory: FlyweightFactory<Attributes> = FlyweightFactory::new();
//! let a = factory.get_or_create(["BMW", "M5", "red"]);
//! let b = factory.get_or_create(["red", "BMW", "M5"]);
//! assert!(Arc::ptr_eq(&a, &b));
//! assert_eq!(factory.count(), 1);
//! ```

pub mod concurrent;
pub mod config;
pub mod error;
pub mod factory;
pub mod key;
pub mod record;
pub mod registry;

pub use concurrent::SharedFlyweightFactory;
pub use config::Config;
pub use error::CacheError;
pub use factory::{CacheStats, FlyweightFactory, Lookup};
pub use key::{CacheKey, KEY_SEPARATOR};
pub use record::{Attributes, CarModel, Flyweight, Intrinsic, SharedRecord};
pub use registry::{CarRegistry, Registration};
