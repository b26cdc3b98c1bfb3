//! Job board endpoints: browsing, posting and lifecycle mutations.

use serde::Serialize;
use serde_json::{Value, json};
use staffroom_core::{
    JobDraft, JobPosting, JobStatus, JobSummary, RequestSpec, Result, Tag, TagKind,
};

use crate::endpoints::json_body;
use crate::envelope;
use crate::handle::{Binder, MutationHandle, QueryHandle};
use crate::registry::{MutationDef, QueryDef};

/// Search filters for the job board. All fields optional; the default
/// filter lists everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
}

impl JobFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(location) = &self.location {
            pairs.push(("location", location.clone()));
        }
        if let Some(subject) = &self.subject {
            pairs.push(("subject", subject.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        pairs
    }
}

/// Argument for [`JobEndpoints::update_job`].
#[derive(Debug, Clone)]
pub struct UpdateJob {
    pub id: String,
    pub draft: JobDraft,
}

pub struct JobEndpoints {
    pub list_jobs: QueryHandle<JobFilter, Vec<JobSummary>>,
    pub job: QueryHandle<String, JobPosting>,
    pub create_job: MutationHandle<JobDraft, JobPosting>,
    pub update_job: MutationHandle<UpdateJob, JobPosting>,
    pub publish_job: MutationHandle<String, JobPosting>,
    pub close_job: MutationHandle<String, JobPosting>,
    pub delete_job: MutationHandle<String, Value>,
}

impl JobEndpoints {
    pub(crate) fn register(bind: &Binder) -> Result<Self> {
        Ok(Self {
            list_jobs: bind.query(
                QueryDef::new(
                    "listJobs",
                    |filter: &JobFilter| RequestSpec::get("/jobs").with_query(filter.query_pairs()),
                    |data, _| Tag::collection(TagKind::Job, envelope::list_ids(data)),
                )
                .with_transform(envelope::jobs),
            )?,
            job: bind.query(
                QueryDef::new(
                    "job",
                    |id: &String| RequestSpec::get(format!("/jobs/{id}")),
                    |_, id| vec![Tag::item(TagKind::Job, id.clone())],
                )
                .with_transform(envelope::job),
            )?,
            create_job: bind.mutation(
                MutationDef::new(
                    "createJob",
                    |draft: &JobDraft| RequestSpec::post("/jobs", json_body(draft)),
                    |_, _| vec![Tag::list(TagKind::Job)],
                )
                .with_transform(envelope::job)
                .with_validation(JobDraft::validate),
            )?,
            update_job: bind.mutation(
                MutationDef::new(
                    "updateJob",
                    |up: &UpdateJob| {
                        RequestSpec::put(format!("/jobs/{}", up.id), json_body(&up.draft))
                    },
                    |up, _| vec![Tag::item(TagKind::Job, up.id.clone())],
                )
                .with_transform(envelope::job)
                .with_validation(|up| up.draft.validate()),
            )?,
            publish_job: bind.mutation(
                MutationDef::new(
                    "publishJob",
                    |id: &String| {
                        RequestSpec::patch(format!("/jobs/{id}/status"), json!({"status": "open"}))
                    },
                    status_change_tags,
                )
                .with_transform(envelope::job),
            )?,
            close_job: bind.mutation(
                MutationDef::new(
                    "closeJob",
                    |id: &String| {
                        RequestSpec::patch(
                            format!("/jobs/{id}/status"),
                            json!({"status": "closed"}),
                        )
                    },
                    status_change_tags,
                )
                .with_transform(envelope::job),
            )?,
            delete_job: bind.mutation(MutationDef::new(
                "deleteJob",
                |id: &String| RequestSpec::delete(format!("/jobs/{id}")),
                |id, _: &Value| vec![Tag::item(TagKind::Job, id.clone()), Tag::list(TagKind::Job)],
            ))?,
        })
    }
}

// Status flips change both the detail view and which roster buckets the job
// appears in.
fn status_change_tags(id: &String, _: &JobPosting) -> Vec<Tag> {
    vec![Tag::item(TagKind::Job, id.clone()), Tag::list(TagKind::Job)]
}
