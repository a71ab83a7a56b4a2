pub mod matcher;
pub mod models;
pub mod notifier;
pub mod source;

// Re-export commonly used types
pub use matcher::KeywordMatcher;
pub use models::Job;
pub use notifier::{Notifier, TelegramNotifier};
pub use source::{JSearchSource, ListingSource};

#[cfg(test)]
pub mod fakes;
#[cfg(test)]
pub mod stub_server;
