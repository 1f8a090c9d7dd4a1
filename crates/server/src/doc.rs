use crate::routes::{auth, change_request, course, form, health, module, semester};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::me,
        module::list_modules,
        module::get_module,
        module::modules_by_semester,
        module::search_modules,
        module::list_all_modules,
        course::get_course,
        course::courses_by_semester,
        form::blank_form,
        form::module_form,
        form::preview_module,
        change_request::submit_creation,
        change_request::submit_modification,
        change_request::list_pending,
        change_request::get_change_request,
        change_request::approve,
        change_request::module_history,
        semester::get_semesters,
        semester::tag_course,
        semester::untag_course,
        semester::drop_semester,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service status"),
        (name = "Authentication", description = "Authentication related endpoints"),
        (name = "Modules", description = "Published module catalogue"),
        (name = "Administration", description = "Catalogue maintenance"),
        (name = "Forms", description = "Module forms for creating and editing modules"),
        (name = "Change Requests", description = "Submission and review of module changes"),
        (name = "Semesters", description = "Semester tags on courses"),
    ),
    info(
        title = "Module Catalogue API",
        version = "1.0.0",
        description = "Module catalogue with change-request review",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes_and_security() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/modules/{id}"));
        assert!(doc.paths.paths.contains_key("/change-requests/{id}/approve"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("jwt"));
    }
}
