pub mod catalog;
pub mod identity;

pub use catalog::CatalogService;
pub use identity::{GithubIdentityProvider, HeaderIdentityProvider, IdentityProvider};
