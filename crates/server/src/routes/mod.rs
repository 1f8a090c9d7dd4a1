pub mod auth;
pub mod change_request;
pub mod course;
pub mod form;
pub mod health;
pub mod module;
pub mod semester;
