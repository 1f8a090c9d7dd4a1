use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // Semester tag lookups (jsonb_exists)
        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_courses_semesters
             ON courses USING gin (semesters);",
        )
        .await?;

        // Full-text search (@@) over German titles and course content
        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_modules_title_de_fts
             ON modules USING gin (to_tsvector('german', title_de));",
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_courses_title_content_fts
             ON courses USING gin (to_tsvector('german', title || ' ' || content));",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("DROP INDEX IF EXISTS idx_courses_title_content_fts;")
            .await?;
        db.execute_unprepared("DROP INDEX IF EXISTS idx_modules_title_de_fts;")
            .await?;
        db.execute_unprepared("DROP INDEX IF EXISTS idx_courses_semesters;")
            .await?;

        Ok(())
    }
}
