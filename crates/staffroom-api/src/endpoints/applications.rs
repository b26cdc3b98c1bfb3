//! Application endpoints, covering both sides of the pipeline: candidates
//! applying and employers screening.

use staffroom_core::{
    Application, ApplicationRequest, ApplicationStatus, RequestSpec, Result, Tag, TagKind,
};

use crate::endpoints::json_body;
use crate::envelope;
use crate::handle::{Binder, MutationHandle, QueryHandle};
use crate::registry::{MutationDef, QueryDef};

/// Argument for [`ApplicationEndpoints::update_application_status`].
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub id: String,
    pub status: ApplicationStatus,
}

pub struct ApplicationEndpoints {
    /// Everyone who applied to one job, for the employer's screening view.
    pub applications_for_job: QueryHandle<String, Vec<Application>>,
    /// Everything one candidate has applied to.
    pub my_applications: QueryHandle<String, Vec<Application>>,
    pub application: QueryHandle<String, Application>,
    pub apply: MutationHandle<ApplicationRequest, Application>,
    pub update_application_status: MutationHandle<StatusChange, Application>,
    pub withdraw_application: MutationHandle<String, Application>,
}

impl ApplicationEndpoints {
    pub(crate) fn register(bind: &Binder) -> Result<Self> {
        Ok(Self {
            applications_for_job: bind.query(
                QueryDef::new(
                    "applicationsForJob",
                    |job_id: &String| RequestSpec::get(format!("/jobs/{job_id}/applications")),
                    |data, _| Tag::collection(TagKind::Application, envelope::list_ids(data)),
                )
                .with_transform(envelope::applications),
            )?,
            my_applications: bind.query(
                QueryDef::new(
                    "myApplications",
                    |applicant: &String| {
                        RequestSpec::get("/applications")
                            .with_query([("applicant", applicant.as_str())])
                    },
                    |data, _| Tag::collection(TagKind::Application, envelope::list_ids(data)),
                )
                .with_transform(envelope::applications),
            )?,
            application: bind.query(
                QueryDef::new(
                    "application",
                    |id: &String| RequestSpec::get(format!("/applications/{id}")),
                    |_, id| vec![Tag::item(TagKind::Application, id.clone())],
                )
                .with_transform(envelope::application),
            )?,
            apply: bind.mutation(
                MutationDef::new(
                    "apply",
                    |req: &ApplicationRequest| RequestSpec::post("/applications", json_body(req)),
                    |_, _| vec![Tag::list(TagKind::Application)],
                )
                .with_transform(envelope::application),
            )?,
            update_application_status: bind.mutation(
                MutationDef::new(
                    "updateApplicationStatus",
                    |change: &StatusChange| {
                        RequestSpec::patch(
                            format!("/applications/{}/status", change.id),
                            serde_json::json!({"status": change.status}),
                        )
                    },
                    |change, _| vec![Tag::item(TagKind::Application, change.id.clone())],
                )
                .with_transform(envelope::application),
            )?,
            withdraw_application: bind.mutation(
                MutationDef::new(
                    "withdrawApplication",
                    |id: &String| RequestSpec::post_empty(format!("/applications/{id}/withdraw")),
                    |id, _| {
                        vec![
                            Tag::item(TagKind::Application, id.clone()),
                            Tag::list(TagKind::Application),
                        ]
                    },
                )
                .with_transform(envelope::application),
            )?,
        })
    }
}
