//! Interview and offer endpoints, the stages after an application lands.

use serde::Serialize;
use staffroom_core::{Interview, JobOffer, RequestSpec, Result, Tag, TagKind};
use time::OffsetDateTime;

use crate::endpoints::json_body;
use crate::envelope;
use crate::handle::{Binder, MutationHandle, QueryHandle};
use crate::registry::{MutationDef, QueryDef};

/// Argument for [`PipelineEndpoints::schedule_interview`]. The application
/// id routes the request; only the scheduling fields travel in the body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInterview {
    #[serde(skip_serializing)]
    pub application_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Argument for [`PipelineEndpoints::reschedule_interview`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleInterview {
    #[serde(skip_serializing)]
    pub id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_at: OffsetDateTime,
}

/// Argument for [`PipelineEndpoints::extend_offer`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendOffer {
    #[serde(skip_serializing)]
    pub application_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<u32>,
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Argument for [`PipelineEndpoints::respond_to_offer`].
#[derive(Debug, Clone)]
pub struct OfferResponse {
    pub id: String,
    pub accept: bool,
}

pub struct PipelineEndpoints {
    pub interviews_for_application: QueryHandle<String, Vec<Interview>>,
    pub schedule_interview: MutationHandle<ScheduleInterview, Interview>,
    pub reschedule_interview: MutationHandle<RescheduleInterview, Interview>,
    pub cancel_interview: MutationHandle<String, Interview>,
    pub offers_for_application: QueryHandle<String, Vec<JobOffer>>,
    pub extend_offer: MutationHandle<ExtendOffer, JobOffer>,
    pub respond_to_offer: MutationHandle<OfferResponse, JobOffer>,
}

impl PipelineEndpoints {
    pub(crate) fn register(bind: &Binder) -> Result<Self> {
        Ok(Self {
            interviews_for_application: bind.query(
                QueryDef::new(
                    "interviewsForApplication",
                    |app_id: &String| {
                        RequestSpec::get(format!("/applications/{app_id}/interviews"))
                    },
                    |data, _| Tag::collection(TagKind::Interview, envelope::list_ids(data)),
                )
                .with_transform(envelope::interviews),
            )?,
            schedule_interview: bind.mutation(
                MutationDef::new(
                    "scheduleInterview",
                    |req: &ScheduleInterview| {
                        RequestSpec::post(
                            format!("/applications/{}/interviews", req.application_id),
                            json_body(req),
                        )
                    },
                    |req, _| {
                        vec![
                            Tag::list(TagKind::Interview),
                            Tag::item(TagKind::Application, req.application_id.clone()),
                        ]
                    },
                )
                .with_transform(envelope::interview),
            )?,
            reschedule_interview: bind.mutation(
                MutationDef::new(
                    "rescheduleInterview",
                    |req: &RescheduleInterview| {
                        RequestSpec::patch(format!("/interviews/{}", req.id), json_body(req))
                    },
                    |req, _| {
                        vec![
                            Tag::item(TagKind::Interview, req.id.clone()),
                            Tag::list(TagKind::Interview),
                        ]
                    },
                )
                .with_transform(envelope::interview),
            )?,
            cancel_interview: bind.mutation(
                MutationDef::new(
                    "cancelInterview",
                    |id: &String| RequestSpec::post_empty(format!("/interviews/{id}/cancel")),
                    |id, _| {
                        vec![
                            Tag::item(TagKind::Interview, id.clone()),
                            Tag::list(TagKind::Interview),
                        ]
                    },
                )
                .with_transform(envelope::interview),
            )?,
            offers_for_application: bind.query(
                QueryDef::new(
                    "offersForApplication",
                    |app_id: &String| RequestSpec::get(format!("/applications/{app_id}/offers")),
                    |data, _| Tag::collection(TagKind::Offer, envelope::list_ids(data)),
                )
                .with_transform(envelope::offers),
            )?,
            extend_offer: bind.mutation(
                MutationDef::new(
                    "extendOffer",
                    |req: &ExtendOffer| {
                        RequestSpec::post(
                            format!("/applications/{}/offers", req.application_id),
                            json_body(req),
                        )
                    },
                    |req, _| {
                        vec![
                            Tag::list(TagKind::Offer),
                            Tag::item(TagKind::Application, req.application_id.clone()),
                        ]
                    },
                )
                .with_transform(envelope::offer),
            )?,
            respond_to_offer: bind.mutation(
                MutationDef::new(
                    "respondToOffer",
                    |resp: &OfferResponse| {
                        let status = if resp.accept { "accepted" } else { "declined" };
                        RequestSpec::post(
                            format!("/offers/{}/respond", resp.id),
                            serde_json::json!({"status": status}),
                        )
                    },
                    |resp, offer: &JobOffer| {
                        vec![
                            Tag::item(TagKind::Offer, resp.id.clone()),
                            Tag::item(TagKind::Application, offer.application_id.clone()),
                        ]
                    },
                )
                .with_transform(envelope::offer),
            )?,
        })
    }
}
