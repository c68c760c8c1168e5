//! Database layer: Firestore content store and the relational user side store.

pub mod connection;
pub mod firestore;
pub mod users;

pub use connection::{ConnectionManager, Connector, RetriesExhausted, RetryPolicy};
pub use firestore::ContentDb;
pub use users::{InMemoryUserStore, PgUserStore, UserStore};

/// Collection names as constants.
pub mod collections {
    pub const BLOGS: &str = "blogs";
    pub const PORTFOLIOS: &str = "portfolios";
    pub const SERVICES: &str = "services";
    pub const ADS: &str = "ads";
    /// Singleton site config, see `models::seo::SEO_DOCUMENT_ID`
    pub const SEO: &str = "seo";
    pub const CONTACTS: &str = "contacts";
}
