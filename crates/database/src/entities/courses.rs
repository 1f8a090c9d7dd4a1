use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub module_id: i64,
    pub title: String,
    pub credit_points: String,
    #[sea_orm(column_type = "Text")]
    pub admission_prerequisites: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub semesters: Json, // array of semester labels, e.g. "SoSe2020"

    // Embedded description
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "Text")]
    pub learning_outcomes: String,
    #[sea_orm(column_type = "Text")]
    pub literature: String,
    #[sea_orm(column_type = "Text")]
    pub applicability: String,
    #[sea_orm(column_type = "Text")]
    pub prerequisites_to_pass: String,
    pub frequency: String,
    pub language: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::modules::Entity",
        from = "Column::ModuleId",
        to = "super::modules::Column::Id"
    )]
    Module,
    #[sea_orm(has_many = "super::delivery_forms::Entity")]
    DeliveryForms,
    #[sea_orm(has_many = "super::extra_fields::Entity")]
    ExtraFields,
}

impl Related<super::modules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Module.def()
    }
}

impl Related<super::delivery_forms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryForms.def()
    }
}

impl Related<super::extra_fields::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExtraFields.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
