use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "modules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title_de: String,
    pub title_en: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub responsible: Json, // array of names
    pub total_credit_points: String,
    pub degree_program: String,
    pub category: Option<String>,
    pub visible: bool,
    pub created_at: Option<DateTime>,
    pub modified_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::courses::Entity")]
    Courses,
    #[sea_orm(has_many = "super::extra_fields::Entity")]
    ExtraFields,
    #[sea_orm(has_many = "super::change_requests::Entity")]
    ChangeRequests,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Courses.def()
    }
}

impl Related<super::extra_fields::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExtraFields.def()
    }
}

impl Related<super::change_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChangeRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
