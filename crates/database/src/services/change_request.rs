use crate::{
    entities::change_requests,
    error::{StoreError, StoreResult},
    services::{
        mapping::{change_request_from_row, change_request_to_active},
        module::ModuleService,
    },
};
use chrono::NaiveDateTime;
use models::{
    CatalogError,
    change_request::{ChangeRequest, ChangeRequestKind, ChangeRequestStatus},
    module::Module,
    principal::Principal,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};

/// Result of submitting or approving a request
#[derive(Debug, Clone)]
pub struct Outcome {
    pub request: ChangeRequest,
    /// The saved module, present once the request has been approved
    pub module: Option<Module>,
}

pub struct ChangeRequestService;

impl ChangeRequestService {
    /// Submits a drafted request on behalf of `principal`.
    ///
    /// Secretariat submissions are approved and merged right away; everything
    /// else is stored as pending.
    pub async fn submit(
        db: &DatabaseConnection,
        mut request: ChangeRequest,
        principal: &Principal,
        now: NaiveDateTime,
    ) -> StoreResult<Outcome> {
        let status = request.submit(principal, now)?;

        let txn = db.begin().await?;
        let module = match status {
            ChangeRequestStatus::Approved => Some(Self::merge(&txn, &request, now).await?),
            _ => None,
        };
        let row = change_request_to_active(&request).insert(&txn).await?;
        txn.commit().await?;

        request.id = Some(row.id);
        log::info!(
            "Change request {} from {} is {}",
            row.id,
            principal.name,
            status.as_str()
        );

        Ok(Outcome { request, module })
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        request_id: i64,
    ) -> Result<Option<ChangeRequest>, DbErr> {
        Ok(change_requests::Entity::find_by_id(request_id)
            .one(db)
            .await?
            .map(change_request_from_row))
    }

    /// Requests awaiting review, oldest first
    pub async fn find_pending<C: ConnectionTrait>(db: &C) -> Result<Vec<ChangeRequest>, DbErr> {
        let rows = change_requests::Entity::find()
            .filter(change_requests::Column::Status.eq(ChangeRequestStatus::Pending.as_str()))
            .order_by_asc(change_requests::Column::CreatedAt)
            .all(db)
            .await?;

        Ok(rows.into_iter().map(change_request_from_row).collect())
    }

    /// Approved requests of one module, newest first
    pub async fn history<C: ConnectionTrait>(
        db: &C,
        module_id: i64,
    ) -> Result<Vec<ChangeRequest>, DbErr> {
        let rows = change_requests::Entity::find()
            .filter(change_requests::Column::ModuleId.eq(module_id))
            .filter(change_requests::Column::Status.eq(ChangeRequestStatus::Approved.as_str()))
            .order_by_desc(change_requests::Column::ApprovedAt)
            .all(db)
            .await?;

        Ok(rows.into_iter().map(change_request_from_row).collect())
    }

    /// Approves a pending request, optionally replacing its proposal with
    /// `edited` first, and saves the merged module.
    pub async fn approve(
        db: &DatabaseConnection,
        request_id: i64,
        edited: Option<&Module>,
        principal: &Principal,
        now: NaiveDateTime,
    ) -> StoreResult<Outcome> {
        let txn = db.begin().await?;

        let mut request = Self::find_by_id(&txn, request_id)
            .await?
            .ok_or_else(|| CatalogError::change_request_not_found(request_id))?;

        if let Some(edited) = edited {
            let live = match request.kind() {
                ChangeRequestKind::Modification { module_id } => {
                    ModuleService::find_by_id(&txn, module_id).await?
                }
                ChangeRequestKind::Creation => None,
            };
            request.revise(edited, live.as_ref())?;
        }

        request.approve(principal, now)?;
        let module = Self::merge(&txn, &request, now).await?;
        change_request_to_active(&request).update(&txn).await?;
        txn.commit().await?;

        log::info!(
            "Change request {request_id} approved by {}, module {} saved",
            principal.name,
            module.id.unwrap_or_default()
        );

        Ok(Outcome {
            request,
            module: Some(module),
        })
    }

    async fn merge(
        txn: &DatabaseTransaction,
        request: &ChangeRequest,
        now: NaiveDateTime,
    ) -> StoreResult<Module> {
        let merged = match request.kind() {
            ChangeRequestKind::Creation => request.merge_creation(now)?,
            ChangeRequestKind::Modification { module_id } => {
                let live = ModuleService::find_by_id(txn, module_id)
                    .await?
                    .ok_or_else(|| CatalogError::module_not_found(module_id))?;
                request.merge_modification(&live, now)?
            }
        };

        ModuleService::save_in(txn, &merged)
            .await
            .map_err(StoreError::from)
    }
}
