pub mod change_requests;
pub mod courses;
pub mod delivery_forms;
pub mod extra_fields;
pub mod modules;
