pub mod seen_store;

pub use seen_store::{SeenStore, StoreError};
