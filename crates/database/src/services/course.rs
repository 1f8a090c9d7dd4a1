use crate::{
    entities::{courses, delivery_forms, extra_fields},
    services::mapping::{course_from_row, delivery_form_from_row, extra_field_from_row},
};
use models::module::Course;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, prelude::Expr,
    sea_query::SimpleExpr,
};
use std::collections::HashMap;

pub struct CourseService;

impl CourseService {
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        course_id: i64,
    ) -> Result<Option<Course>, DbErr> {
        let Some(row) = courses::Entity::find_by_id(course_id).one(db).await? else {
            return Ok(None);
        };

        Ok(Self::assemble(db, vec![row]).await?.pop())
    }

    /// All courses tagged with `semester`, ordered by title
    pub async fn find_by_semester<C: ConnectionTrait>(
        db: &C,
        semester: &str,
    ) -> Result<Vec<Course>, DbErr> {
        let rows = courses::Entity::find()
            .filter(Self::tagged_with(semester))
            .order_by_asc(courses::Column::Title)
            .all(db)
            .await?;

        log::debug!("Found {} courses tagged {semester}", rows.len());
        Self::assemble(db, rows).await
    }

    /// Condition matching courses whose tag set contains `semester`
    pub(crate) fn tagged_with(semester: &str) -> SimpleExpr {
        Expr::cust_with_expr("jsonb_exists(courses.semesters, $1)", semester)
    }

    /// Loads delivery forms and extra fields for the given rows, keeping their order
    pub(crate) async fn assemble<C: ConnectionTrait>(
        db: &C,
        rows: Vec<courses::Model>,
    ) -> Result<Vec<Course>, DbErr> {
        if rows.is_empty() {
            return Ok(vec![]);
        }

        let course_ids: Vec<i64> = rows.iter().map(|c| c.id).collect();

        // Batch fetch the children of every course
        let (form_rows, field_rows) = futures::try_join!(
            delivery_forms::Entity::find()
                .filter(delivery_forms::Column::CourseId.is_in(course_ids.clone()))
                .order_by_asc(delivery_forms::Column::Id)
                .all(db),
            extra_fields::Entity::find()
                .filter(extra_fields::Column::CourseId.is_in(course_ids))
                .order_by_asc(extra_fields::Column::Id)
                .all(db),
        )?;

        let mut forms_by_course: HashMap<i64, Vec<_>> = HashMap::new();
        for row in form_rows {
            forms_by_course
                .entry(row.course_id)
                .or_default()
                .push(delivery_form_from_row(row));
        }

        let mut fields_by_course: HashMap<i64, Vec<_>> = HashMap::new();
        for row in field_rows {
            if let Some(course_id) = row.course_id {
                fields_by_course
                    .entry(course_id)
                    .or_default()
                    .push(extra_field_from_row(row));
            }
        }

        let courses = rows
            .into_iter()
            .map(|row| {
                let mut course = course_from_row(row);
                let course_id = course.id.unwrap_or_default();
                for form in forms_by_course.remove(&course_id).unwrap_or_default() {
                    course.attach_delivery_form(form);
                }
                for field in fields_by_course.remove(&course_id).unwrap_or_default() {
                    course.attach_extra_field(field);
                }
                course
            })
            .collect();

        Ok(courses)
    }
}
