//! # academy-mongo
//!
//! MongoDB implementation of the [`academy_core::Store`] traits.
//!
//! ```rust,ignore
//! use academy_mongo::MongoStore;
//!
//! let store = MongoStore::connect(&uri, "academy").await?;
//! let handle = StoreHandle::connected(Arc::new(store));
//! ```

mod documents;
pub mod store;

pub use store::MongoStore;
