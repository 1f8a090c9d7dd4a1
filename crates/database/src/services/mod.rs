pub mod change_request;
pub mod course;
pub mod mapping;
pub mod module;
pub mod semester_tag;
