pub mod change_request;
pub mod form;
pub mod module;
pub mod semester;
