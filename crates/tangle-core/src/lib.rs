pub mod bus;
pub mod error;
pub mod filters;
pub mod notifier;

pub use bus::EventBus;
pub use error::CoreError;
pub use filters::{FilterStore, FilterStoreError};
pub use notifier::{Notifier, NotifierConfig, NotifierError, Subscription};
