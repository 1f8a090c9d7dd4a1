//! Change requests ("Anträge") against the catalogue.
//!
//! A request is either a creation (full snapshot of a new module) or a
//! modification (module diff plus an optional replacement course list against
//! an existing module). Requests start as drafts, become pending or approved
//! on submission, and approval is terminal.

use crate::{
    diff::ModuleDiff,
    error::{CatalogError, CatalogResult},
    module::{Course, Module, same_elements},
    principal::Principal,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChangeRequestStatus {
    Draft,
    Pending,
    Approved,
}

impl ChangeRequestStatus {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeRequestKind {
    Creation,
    Modification { module_id: i64 },
}

/// Payload of a modification request.
///
/// Module attributes and the course list are two independent channels: the
/// diff covers the scalar attributes, `courses` replaces the whole course list
/// when the submitted one differs from the live one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleChanges {
    #[serde(flatten)]
    pub diff: ModuleDiff,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courses: Option<Vec<Course>>,
}

impl ModuleChanges {
    /// Returns `None` when `proposed` changes neither attributes nor courses
    pub fn between(live: &Module, proposed: &Module) -> Option<Self> {
        let diff = ModuleDiff::between(live, proposed);
        let courses = (!same_elements(&live.courses, &proposed.courses))
            .then(|| proposed.courses.clone());

        if diff.is_none() && courses.is_none() {
            return None;
        }

        Some(Self {
            diff: diff.unwrap_or_else(|| ModuleDiff {
                id: live.id,
                ..Default::default()
            }),
            courses,
        })
    }

    pub fn apply_to(&self, target: &mut Module) {
        self.diff.apply_to(target);
        if let Some(courses) = &self.courses {
            target.courses = courses.clone();
        }
        target.relink();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRequest {
    pub id: Option<i64>,
    /// Target module; absent for creation requests
    pub module_id: Option<i64>,
    /// JSON snapshot (creation) or JSON [`ModuleChanges`] (modification)
    pub payload: String,
    pub submitter: String,
    pub status: ChangeRequestStatus,
    pub created_at: NaiveDateTime,
    pub approved_at: Option<NaiveDateTime>,
}

impl ChangeRequest {
    /// Drafts a request that creates `module` as a new catalogue entry
    pub fn creation(
        module: &Module,
        submitter: impl Into<String>,
        now: NaiveDateTime,
    ) -> CatalogResult<Self> {
        let mut snapshot = module.clone();
        snapshot.id = None;
        snapshot.relink();

        Ok(Self {
            id: None,
            module_id: None,
            payload: serde_json::to_string(&snapshot)?,
            submitter: submitter.into(),
            status: ChangeRequestStatus::Draft,
            created_at: now,
            approved_at: None,
        })
    }

    /// Drafts a request that turns `live` into `proposed`.
    /// Returns `Ok(None)` when there is nothing to submit.
    pub fn modification(
        live: &Module,
        proposed: &Module,
        submitter: impl Into<String>,
        now: NaiveDateTime,
    ) -> CatalogResult<Option<Self>> {
        let module_id = live.id.ok_or_else(|| {
            CatalogError::InvalidArgument("the live module has not been persisted".to_string())
        })?;

        let Some(changes) = ModuleChanges::between(live, proposed) else {
            return Ok(None);
        };

        Ok(Some(Self {
            id: None,
            module_id: Some(module_id),
            payload: serde_json::to_string(&changes)?,
            submitter: submitter.into(),
            status: ChangeRequestStatus::Draft,
            created_at: now,
            approved_at: None,
        }))
    }

    pub fn kind(&self) -> ChangeRequestKind {
        match self.module_id {
            Some(module_id) => ChangeRequestKind::Modification { module_id },
            None => ChangeRequestKind::Creation,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ChangeRequestStatus::Pending
    }

    pub fn is_approved(&self) -> bool {
        self.status == ChangeRequestStatus::Approved
    }

    /// Moves a draft forward: straight to approved for the secretariat,
    /// to pending review for everyone else allowed to submit
    pub fn submit(
        &mut self,
        principal: &Principal,
        now: NaiveDateTime,
    ) -> CatalogResult<ChangeRequestStatus> {
        if self.status != ChangeRequestStatus::Draft {
            return Err(CatalogError::InvalidState(format!(
                "only drafts can be submitted, request is {}",
                self.status.as_str()
            )));
        }
        if !principal.can_submit() {
            return Err(CatalogError::Forbidden(format!(
                "{} may not submit change requests",
                principal.name
            )));
        }

        if principal.is_secretariat() {
            self.status = ChangeRequestStatus::Approved;
            self.approved_at = Some(now);
        } else {
            self.status = ChangeRequestStatus::Pending;
        }

        Ok(self.status)
    }

    pub fn approve(&mut self, principal: &Principal, now: NaiveDateTime) -> CatalogResult<()> {
        if !principal.is_secretariat() {
            return Err(CatalogError::Forbidden(format!(
                "{} may not approve change requests",
                principal.name
            )));
        }
        if self.status != ChangeRequestStatus::Pending {
            return Err(CatalogError::InvalidState(format!(
                "only pending requests can be approved, request is {}",
                self.status.as_str()
            )));
        }

        self.status = ChangeRequestStatus::Approved;
        self.approved_at = Some(now);
        Ok(())
    }

    /// Replaces the proposal with a reviewer's edited version before approval
    pub fn revise(&mut self, edited: &Module, live: Option<&Module>) -> CatalogResult<()> {
        if self.is_approved() {
            return Err(CatalogError::InvalidState(
                "approved requests cannot be revised".to_string(),
            ));
        }

        self.payload = match (self.kind(), live) {
            (ChangeRequestKind::Creation, _) => {
                let mut snapshot = edited.clone();
                snapshot.id = None;
                serde_json::to_string(&snapshot)?
            }
            (ChangeRequestKind::Modification { module_id }, Some(live))
                if live.id == Some(module_id) =>
            {
                let mut edited = edited.clone();
                edited.carry_over(live);
                let changes = ModuleChanges::between(live, &edited).unwrap_or_else(|| {
                    ModuleChanges {
                        diff: ModuleDiff {
                            id: live.id,
                            ..Default::default()
                        },
                        courses: None,
                    }
                });
                serde_json::to_string(&changes)?
            }
            (ChangeRequestKind::Modification { .. }, _) => {
                return Err(CatalogError::InvalidArgument(
                    "revising a modification requires its live module".to_string(),
                ));
            }
        };

        Ok(())
    }

    /// Decodes the snapshot of a creation request
    pub fn snapshot(&self) -> CatalogResult<Module> {
        Ok(serde_json::from_str(&self.payload)?)
    }

    /// Decodes the payload of a modification request
    pub fn changes(&self) -> CatalogResult<ModuleChanges> {
        Ok(serde_json::from_str(&self.payload)?)
    }

    /// Builds the module a creation request introduces
    pub fn merge_creation(&self, now: NaiveDateTime) -> CatalogResult<Module> {
        if self.kind() != ChangeRequestKind::Creation {
            return Err(CatalogError::InvalidArgument(
                "not a creation request".to_string(),
            ));
        }

        let mut module = self.snapshot()?;
        module.id = None;
        module.created_at = Some(now);
        module.modified_at = Some(now);
        module.relink();
        Ok(module)
    }

    /// Applies a modification request on top of a copy of `live`
    pub fn merge_modification(&self, live: &Module, now: NaiveDateTime) -> CatalogResult<Module> {
        if self.kind() == ChangeRequestKind::Creation {
            return Err(CatalogError::InvalidArgument(
                "not a modification request".to_string(),
            ));
        }

        let mut merged = self.preview(Some(live))?;
        merged.modified_at = Some(now);
        Ok(merged)
    }

    /// The module as it would look once this request is approved
    pub fn preview(&self, live: Option<&Module>) -> CatalogResult<Module> {
        match (self.kind(), live) {
            (ChangeRequestKind::Creation, _) => {
                let mut module = self.snapshot()?;
                module.relink();
                Ok(module)
            }
            (ChangeRequestKind::Modification { module_id }, Some(live))
                if live.id == Some(module_id) =>
            {
                let changes = self.changes()?;
                let mut merged = live.clone();
                changes.apply_to(&mut merged);
                Ok(merged)
            }
            (ChangeRequestKind::Modification { module_id }, Some(_)) => {
                Err(CatalogError::InvalidArgument(format!(
                    "request targets module {module_id}, a different module was supplied"
                )))
            }
            (ChangeRequestKind::Modification { module_id }, None) => {
                Err(CatalogError::module_not_found(module_id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diff::{Change, ModuleField},
        form::{marshal, unmarshal},
        module::{
            ExtraField,
            test_support::{course, module},
        },
    };
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 5, 4)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn secretariat() -> Principal {
        Principal::new("mueller", ["sekretariat"])
    }

    fn orga() -> Principal {
        Principal::new("schmidt", ["orga"])
    }

    #[test]
    fn test_secretariat_submission_is_approved() {
        let mut request = ChangeRequest::creation(&module(), "mueller", now()).unwrap();
        let status = request.submit(&secretariat(), now()).unwrap();

        assert_eq!(status, ChangeRequestStatus::Approved);
        assert_eq!(request.approved_at, Some(now()));
    }

    #[test]
    fn test_orga_submission_is_pending() {
        let mut request = ChangeRequest::creation(&module(), "schmidt", now()).unwrap();
        let status = request.submit(&orga(), now()).unwrap();

        assert_eq!(status, ChangeRequestStatus::Pending);
        assert!(request.is_pending());
        assert_eq!(request.approved_at, None);
    }

    #[test]
    fn test_submission_requires_a_catalogue_role() {
        let mut request = ChangeRequest::creation(&module(), "anon", now()).unwrap();
        let err = request
            .submit(&Principal::new("anon", ["studentin"]), now())
            .unwrap_err();

        assert!(matches!(err, CatalogError::Forbidden(_)));
        assert_eq!(request.status, ChangeRequestStatus::Draft);
    }

    #[test]
    fn test_submit_twice_is_rejected() {
        let mut request = ChangeRequest::creation(&module(), "schmidt", now()).unwrap();
        request.submit(&orga(), now()).unwrap();
        assert!(matches!(
            request.submit(&orga(), now()),
            Err(CatalogError::InvalidState(_))
        ));
    }

    #[test]
    fn test_approval_is_secretariat_only_and_terminal() {
        let mut request = ChangeRequest::creation(&module(), "schmidt", now()).unwrap();
        request.submit(&orga(), now()).unwrap();

        assert!(matches!(
            request.approve(&orga(), now()),
            Err(CatalogError::Forbidden(_))
        ));
        assert!(request.is_pending());

        request.approve(&secretariat(), now()).unwrap();
        assert!(request.is_approved());

        assert!(matches!(
            request.approve(&secretariat(), now()),
            Err(CatalogError::InvalidState(_))
        ));
    }

    #[test]
    fn test_creation_request_merges_into_new_module() {
        let request = ChangeRequest::creation(&module(), "mueller", now()).unwrap();
        assert_eq!(request.kind(), ChangeRequestKind::Creation);

        let created = request.merge_creation(now()).unwrap();
        assert_eq!(created.id, None);
        assert_eq!(created.title_de, "Algorithmen");
        assert_eq!(created.created_at, Some(now()));
        assert_eq!(created.courses.len(), 2);
        assert!(created.links_consistent());
    }

    #[test]
    fn test_unchanged_modification_is_discarded() {
        let live = module();
        let request = ChangeRequest::modification(&live, &live.clone(), "schmidt", now()).unwrap();
        assert!(request.is_none());
    }

    #[test]
    fn test_modification_requires_persisted_module() {
        let mut live = module();
        live.id = None;
        let mut proposed = live.clone();
        proposed.title_de = "Neu".to_string();

        assert!(matches!(
            ChangeRequest::modification(&live, &proposed, "schmidt", now()),
            Err(CatalogError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_modification_merges_attributes_and_keeps_courses() {
        let live = module();
        let mut proposed = live.clone();
        proposed.title_de = "Algorithmen II".to_string();

        let request = ChangeRequest::modification(&live, &proposed, "schmidt", now())
            .unwrap()
            .unwrap();
        assert_eq!(request.kind(), ChangeRequestKind::Modification { module_id: 42 });

        let changes = request.changes().unwrap();
        assert_eq!(changes.diff.title_de, Change::Set("Algorithmen II".to_string()));
        assert!(changes.courses.is_none());

        let merged = request.merge_modification(&live, now()).unwrap();
        assert_eq!(merged.id, Some(42));
        assert_eq!(merged.title_de, "Algorithmen II");
        assert_eq!(merged.courses, live.courses);
        assert_eq!(merged.modified_at, Some(now()));
        assert!(merged.links_consistent());
    }

    #[test]
    fn test_course_edits_travel_separately() {
        let live = module();
        let mut proposed = live.clone();
        proposed.courses[1].title = "Tutorium Algorithmen".to_string();
        let mut added = course(3, "Seminar Algorithmen");
        added.id = None;
        proposed.attach_course(added);

        let request = ChangeRequest::modification(&live, &proposed, "schmidt", now())
            .unwrap()
            .unwrap();
        let changes = request.changes().unwrap();
        assert!(changes.diff.is_empty());
        assert_eq!(changes.courses.as_ref().map(Vec::len), Some(3));

        let merged = request.merge_modification(&live, now()).unwrap();
        assert_eq!(merged.courses.len(), 3);
        assert!(merged.courses.iter().all(|c| c.module_id == Some(42)));
        assert!(merged.links_consistent());
    }

    #[test]
    fn test_merge_modification_checks_target() {
        let live = module();
        let mut proposed = live.clone();
        proposed.visible = false;
        let request = ChangeRequest::modification(&live, &proposed, "schmidt", now())
            .unwrap()
            .unwrap();

        let mut other = live.clone();
        other.id = Some(7);
        assert!(matches!(
            request.merge_modification(&other, now()),
            Err(CatalogError::InvalidArgument(_))
        ));
        assert!(matches!(
            request.preview(None),
            Err(CatalogError::NotFound { .. })
        ));
    }

    #[test]
    fn test_corrupt_payload_leaves_request_untouched() {
        let live = module();
        let mut request = ChangeRequest::creation(&live, "mueller", now()).unwrap();
        request.payload = "{not json".to_string();
        let before = request.clone();

        assert!(matches!(
            request.merge_creation(now()),
            Err(CatalogError::Serialization(_))
        ));
        assert_eq!(request, before);
    }

    #[test]
    fn test_revise_replaces_modification_payload() {
        let live = module();
        let mut proposed = live.clone();
        proposed.title_de = "Algorithmen II".to_string();
        let mut request = ChangeRequest::modification(&live, &proposed, "schmidt", now())
            .unwrap()
            .unwrap();

        let mut edited = live.clone();
        edited.title_en = "Algorithms II".to_string();
        request.revise(&edited, Some(&live)).unwrap();

        let merged = request.preview(Some(&live)).unwrap();
        assert_eq!(merged.title_de, "Algorithmen");
        assert_eq!(merged.title_en, "Algorithms II");
    }

    fn stored_live() -> Module {
        let mut live = module();
        live.created_at = NaiveDate::from_ymd_opt(2019, 10, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0);
        live.modified_at = live.created_at;
        live.attach_extra_field(ExtraField::new("Hinweis", "Nur im Wintersemester"));
        live
    }

    #[test]
    fn test_revise_with_form_keeps_stored_identity() {
        let live = stored_live();
        let mut proposed = live.clone();
        proposed.title_en = "Algorithms II".to_string();
        let mut request = ChangeRequest::modification(&live, &proposed, "schmidt", now())
            .unwrap()
            .unwrap();
        request.submit(&orga(), now()).unwrap();

        let mut form = marshal(&live).to_form_data();
        form.insert("titel_deutsch", "Algorithmen II");
        let edited = unmarshal(&form).unwrap();
        assert_eq!(edited.created_at, None);

        request.revise(&edited, Some(&live)).unwrap();
        let changes = request.changes().unwrap();
        assert_eq!(changes.diff.changed_fields(), vec![ModuleField::TitleDe]);
        assert!(changes.courses.is_none());

        request.approve(&secretariat(), now()).unwrap();
        let merged = request.merge_modification(&live, now()).unwrap();
        assert_eq!(merged.title_de, "Algorithmen II");
        assert_eq!(merged.title_en, "Algorithms");
        assert_eq!(merged.created_at, live.created_at);
        assert_eq!(merged.modified_at, Some(now()));
        assert_eq!(merged.extra_fields, live.extra_fields);
        assert!(merged.links_consistent());
    }

    #[test]
    fn test_stored_changes_decode_falsy_values() {
        let live = module();
        let mut proposed = live.clone();
        proposed.visible = false;
        proposed.category = None;
        let request = ChangeRequest::modification(&live, &proposed, "schmidt", now())
            .unwrap()
            .unwrap();

        let stored: serde_json::Value = serde_json::from_str(&request.payload).unwrap();
        assert_eq!(stored["visible"], serde_json::json!(false));
        assert!(stored.get("title_de").is_none());

        let changes = request.changes().unwrap();
        assert_eq!(changes.diff.visible, Change::Set(false));
        assert_eq!(changes.diff.category, Change::Set(None));
        assert!(changes.diff.title_de.is_unchanged());

        let merged = request.preview(Some(&live)).unwrap();
        assert!(!merged.visible);
        assert_eq!(merged.category, None);
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(ChangeRequestStatus::Pending.as_str(), "pending");
        assert_eq!(
            "approved".parse::<ChangeRequestStatus>().unwrap(),
            ChangeRequestStatus::Approved
        );
    }
}
