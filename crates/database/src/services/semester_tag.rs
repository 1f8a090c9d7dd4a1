use crate::{
    entities::courses,
    error::StoreResult,
    services::{
        course::CourseService,
        mapping::{semesters_update, string_set},
        module::ModuleService,
    },
};
use models::CatalogError;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect, TransactionTrait, prelude::Json,
};
use std::collections::BTreeSet;

pub struct SemesterTagService;

impl SemesterTagService {
    /// Tags one course of a module with `semester`.
    /// Returns `false` if the course already carried the tag.
    pub async fn tag(
        db: &DatabaseConnection,
        semester: &str,
        course_id: i64,
        module_id: i64,
    ) -> StoreResult<bool> {
        let mut module = ModuleService::find_by_id(db, module_id)
            .await?
            .ok_or_else(|| CatalogError::module_not_found(module_id))?;

        let added = module.tag_course_semester(semester, course_id)?;
        if added {
            ModuleService::save(db, &module).await?;
            log::info!("Tagged course {course_id} of module {module_id} with {semester}");
        }
        Ok(added)
    }

    /// Removes `semester` from one course of a module; an absent tag is a no-op
    pub async fn untag(
        db: &DatabaseConnection,
        semester: &str,
        course_id: i64,
        module_id: i64,
    ) -> StoreResult<bool> {
        let mut module = ModuleService::find_by_id(db, module_id)
            .await?
            .ok_or_else(|| CatalogError::module_not_found(module_id))?;

        let removed = module.untag_course_semester(semester, course_id)?;
        if removed {
            ModuleService::save(db, &module).await?;
            log::info!("Removed {semester} from course {course_id} of module {module_id}");
        }
        Ok(removed)
    }

    /// Removes `semester` from every course carrying it.
    /// Returns the number of courses changed.
    pub async fn drop_semester(db: &DatabaseConnection, semester: &str) -> Result<u64, DbErr> {
        let txn = db.begin().await?;

        let tagged: Vec<(i64, Json)> = courses::Entity::find()
            .select_only()
            .column(courses::Column::Id)
            .column(courses::Column::Semesters)
            .filter(CourseService::tagged_with(semester))
            .into_tuple()
            .all(&txn)
            .await?;

        let mut changed = 0;
        for (course_id, semesters) in tagged {
            let mut semesters = string_set(semesters, "semesters");
            if semesters.remove(semester) {
                semesters_update(course_id, &semesters).update(&txn).await?;
                changed += 1;
            }
        }

        txn.commit().await?;
        log::info!("Dropped semester {semester} from {changed} courses");
        Ok(changed)
    }

    /// Every semester label currently used by some course
    pub async fn used_semesters<C: ConnectionTrait>(db: &C) -> Result<BTreeSet<String>, DbErr> {
        let columns: Vec<Json> = courses::Entity::find()
            .select_only()
            .column(courses::Column::Semesters)
            .into_tuple()
            .all(db)
            .await?;

        Ok(columns
            .into_iter()
            .flat_map(|value| string_set(value, "semesters"))
            .collect())
    }
}
