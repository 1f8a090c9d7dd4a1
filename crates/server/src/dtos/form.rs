use models::form::FormData;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};

/// A flat module form, keyed by field name
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ModuleForm {
    pub fields: HashMap<String, String>,
}

impl From<ModuleForm> for FormData {
    fn from(form: ModuleForm) -> Self {
        FormData::from(form.fields)
    }
}

impl From<FormData> for ModuleForm {
    fn from(data: FormData) -> Self {
        Self {
            fields: data.into_inner(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct BlankFormQuery {
    /// Number of courses in the blank form
    #[serde(default = "default_courses")]
    pub courses: usize,
}

fn default_courses() -> usize {
    1
}
