use crate::{
    entities::{courses, delivery_forms, extra_fields, modules},
    services::{
        course::CourseService,
        mapping::{
            course_to_active, delivery_form_to_active, extra_field_from_row, extra_field_to_active,
            module_from_row, module_to_active,
        },
    },
};
use models::module::Module;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::Expr,
};
use std::collections::{HashMap, HashSet};

pub struct ModuleService;

impl ModuleService {
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        module_id: i64,
    ) -> Result<Option<Module>, DbErr> {
        let Some(row) = modules::Entity::find_by_id(module_id).one(db).await? else {
            return Ok(None);
        };

        Ok(Self::assemble(db, vec![row]).await?.pop())
    }

    /// Every module, including hidden ones
    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Module>, DbErr> {
        let rows = modules::Entity::find()
            .order_by_asc(modules::Column::TitleDe)
            .all(db)
            .await?;

        Self::assemble(db, rows).await
    }

    pub async fn find_all_visible<C: ConnectionTrait>(db: &C) -> Result<Vec<Module>, DbErr> {
        let rows = modules::Entity::find()
            .filter(modules::Column::Visible.eq(true))
            .order_by_asc(modules::Column::TitleDe)
            .all(db)
            .await?;

        Self::assemble(db, rows).await
    }

    /// Visible modules with at least one course tagged `semester`
    pub async fn find_by_semester<C: ConnectionTrait>(
        db: &C,
        semester: &str,
    ) -> Result<Vec<Module>, DbErr> {
        let module_ids: Vec<i64> = courses::Entity::find()
            .select_only()
            .column(courses::Column::ModuleId)
            .filter(CourseService::tagged_with(semester))
            .distinct()
            .into_tuple()
            .all(db)
            .await?;

        if module_ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = modules::Entity::find()
            .filter(modules::Column::Id.is_in(module_ids))
            .filter(modules::Column::Visible.eq(true))
            .order_by_asc(modules::Column::TitleDe)
            .all(db)
            .await?;

        Self::assemble(db, rows).await
    }

    /// Full-text and substring search over visible modules and their course titles
    pub async fn search_visible<C: ConnectionTrait>(
        db: &C,
        search: &str,
    ) -> Result<Vec<Module>, DbErr> {
        let search = search.trim();
        if search.is_empty() {
            return Self::find_all_visible(db).await;
        }

        let pattern = format!("%{search}%");
        let course_module_ids: Vec<i64> = courses::Entity::find()
            .select_only()
            .column(courses::Column::ModuleId)
            .filter(
                Condition::any()
                    .add(Expr::cust_with_expr("courses.title ILIKE $1", pattern.as_str()))
                    .add(Expr::cust_with_expr(
                        "to_tsvector('german', courses.title || ' ' || courses.content) @@ plainto_tsquery('german', $1)",
                        search,
                    )),
            )
            .distinct()
            .into_tuple()
            .all(db)
            .await?;

        let mut condition = Condition::any()
            .add(Expr::cust_with_expr("modules.title_de ILIKE $1", pattern.as_str()))
            .add(Expr::cust_with_expr("modules.title_en ILIKE $1", pattern.as_str()))
            .add(Expr::cust_with_expr(
                "to_tsvector('german', modules.title_de) @@ plainto_tsquery('german', $1)",
                search,
            ));
        if !course_module_ids.is_empty() {
            condition = condition.add(modules::Column::Id.is_in(course_module_ids));
        }

        let rows = modules::Entity::find()
            .filter(modules::Column::Visible.eq(true))
            .filter(condition)
            .order_by_asc(modules::Column::TitleDe)
            .all(db)
            .await?;

        log::debug!("Search for {search:?} matched {} modules", rows.len());
        Self::assemble(db, rows).await
    }

    /// Saves the module with all of its courses in one transaction.
    /// Returns the module with every id assigned.
    pub async fn save(db: &DatabaseConnection, module: &Module) -> Result<Module, DbErr> {
        let txn = db.begin().await?;
        let saved = Self::save_in(&txn, module).await?;
        txn.commit().await?;

        log::info!(
            "Saved module {} ({} courses)",
            saved.id.unwrap_or_default(),
            saved.courses.len()
        );
        Ok(saved)
    }

    /// Writes the module graph inside an open transaction.
    ///
    /// Courses keep their rows when their id belongs to this module; courses
    /// missing from the graph are deleted. Delivery forms and extra fields are
    /// replaced wholesale.
    pub(crate) async fn save_in(
        txn: &DatabaseTransaction,
        module: &Module,
    ) -> Result<Module, DbErr> {
        let mut saved = module.clone();

        let row = match module.id {
            Some(_) => module_to_active(module).update(txn).await?,
            None => module_to_active(module).insert(txn).await?,
        };
        saved.id = Some(row.id);

        extra_fields::Entity::delete_many()
            .filter(extra_fields::Column::ModuleId.eq(row.id))
            .exec(txn)
            .await?;
        for field in &mut saved.extra_fields {
            let inserted = extra_field_to_active(field, Some(row.id), None)
                .insert(txn)
                .await?;
            field.id = Some(inserted.id);
        }

        let existing: HashSet<i64> = courses::Entity::find()
            .select_only()
            .column(courses::Column::Id)
            .filter(courses::Column::ModuleId.eq(row.id))
            .into_tuple::<i64>()
            .all(txn)
            .await?
            .into_iter()
            .collect();

        // Ids from another module (or a stale snapshot) become new rows
        for course in &mut saved.courses {
            if course.id.is_some_and(|id| !existing.contains(&id)) {
                course.id = None;
            }
        }

        let kept: HashSet<i64> = saved.courses.iter().filter_map(|c| c.id).collect();
        let stale: Vec<i64> = existing.difference(&kept).copied().collect();
        if !stale.is_empty() {
            Self::delete_course_children(txn, stale.clone()).await?;
            courses::Entity::delete_many()
                .filter(courses::Column::Id.is_in(stale))
                .exec(txn)
                .await?;
        }

        for course in &mut saved.courses {
            let course_row = match course.id {
                Some(_) => course_to_active(course, row.id).update(txn).await?,
                None => course_to_active(course, row.id).insert(txn).await?,
            };
            course.id = Some(course_row.id);

            Self::delete_course_children(txn, vec![course_row.id]).await?;
            for form in &mut course.delivery_forms {
                let inserted = delivery_form_to_active(form, course_row.id)
                    .insert(txn)
                    .await?;
                form.id = Some(inserted.id);
            }
            for field in &mut course.extra_fields {
                let inserted = extra_field_to_active(field, None, Some(course_row.id))
                    .insert(txn)
                    .await?;
                field.id = Some(inserted.id);
            }
        }

        saved.relink();
        Ok(saved)
    }

    async fn delete_course_children(
        txn: &DatabaseTransaction,
        course_ids: Vec<i64>,
    ) -> Result<(), DbErr> {
        delivery_forms::Entity::delete_many()
            .filter(delivery_forms::Column::CourseId.is_in(course_ids.clone()))
            .exec(txn)
            .await?;
        extra_fields::Entity::delete_many()
            .filter(extra_fields::Column::CourseId.is_in(course_ids))
            .exec(txn)
            .await?;
        Ok(())
    }

    /// Loads courses and extra fields for the given rows, keeping their order
    async fn assemble<C: ConnectionTrait>(
        db: &C,
        rows: Vec<modules::Model>,
    ) -> Result<Vec<Module>, DbErr> {
        if rows.is_empty() {
            return Ok(vec![]);
        }

        let module_ids: Vec<i64> = rows.iter().map(|m| m.id).collect();

        let course_rows = courses::Entity::find()
            .filter(courses::Column::ModuleId.is_in(module_ids.clone()))
            .order_by_asc(courses::Column::Id)
            .all(db)
            .await?;
        let field_rows = extra_fields::Entity::find()
            .filter(extra_fields::Column::ModuleId.is_in(module_ids))
            .order_by_asc(extra_fields::Column::Id)
            .all(db)
            .await?;

        let mut courses_by_module: HashMap<i64, Vec<_>> = HashMap::new();
        for course in CourseService::assemble(db, course_rows).await? {
            courses_by_module
                .entry(course.module_id.unwrap_or_default())
                .or_default()
                .push(course);
        }

        let mut fields_by_module: HashMap<i64, Vec<_>> = HashMap::new();
        for row in field_rows {
            if let Some(module_id) = row.module_id {
                fields_by_module
                    .entry(module_id)
                    .or_default()
                    .push(extra_field_from_row(row));
            }
        }

        let modules = rows
            .into_iter()
            .map(|row| {
                let module_id = row.id;
                let mut module = module_from_row(row);
                for course in courses_by_module.remove(&module_id).unwrap_or_default() {
                    module.attach_course(course);
                }
                for field in fields_by_module.remove(&module_id).unwrap_or_default() {
                    module.attach_extra_field(field);
                }
                module
            })
            .collect();

        Ok(modules)
    }
}
