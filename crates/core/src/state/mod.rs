//! Session state and the result store.

pub mod session;
pub mod store;

pub use session::Session;
pub use store::ResultStore;
