pub mod db;
pub mod entities;
pub mod error;
pub mod services;

pub use error::{StoreError, StoreResult};
pub use services::{
    change_request::{ChangeRequestService, Outcome},
    course::CourseService,
    module::ModuleService,
    semester_tag::SemesterTagService,
};
