pub mod category;
pub mod change_request;
pub mod diff;
pub mod error;
pub mod form;
pub mod module;
pub mod principal;
pub mod semester;

pub use error::{CatalogError, CatalogResult};
