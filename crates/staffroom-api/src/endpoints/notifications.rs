//! Notification endpoints. The list query carries the polling declaration,
//! so any subscription to it refreshes on the configured interval.

use serde_json::Value;
use staffroom_core::{Notification, RequestSpec, Result, Tag, TagKind};
use std::time::Duration;

use crate::envelope;
use crate::handle::{Binder, MutationHandle, QueryHandle};
use crate::registry::{MutationDef, QueryDef};

pub struct NotificationEndpoints {
    pub notifications: QueryHandle<(), Vec<Notification>>,
    pub mark_read: MutationHandle<String, Notification>,
    pub mark_all_read: MutationHandle<(), Value>,
}

impl NotificationEndpoints {
    pub(crate) fn register(bind: &Binder, poll_interval: Duration) -> Result<Self> {
        Ok(Self {
            notifications: bind.query(
                QueryDef::new(
                    "notifications",
                    |_: &()| RequestSpec::get("/notifications"),
                    |data, _| Tag::collection(TagKind::Notification, envelope::list_ids(data)),
                )
                .with_transform(envelope::notifications)
                .with_poll(poll_interval),
            )?,
            mark_read: bind.mutation(
                MutationDef::new(
                    "markRead",
                    |id: &String| RequestSpec::post_empty(format!("/notifications/{id}/read")),
                    |id, _| {
                        vec![
                            Tag::item(TagKind::Notification, id.clone()),
                            Tag::list(TagKind::Notification),
                        ]
                    },
                )
                .with_transform(envelope::notification),
            )?,
            mark_all_read: bind.mutation(MutationDef::new(
                "markAllRead",
                |_: &()| RequestSpec::post_empty("/notifications/read-all"),
                |_, _: &Value| vec![Tag::of(TagKind::Notification)],
            ))?,
        })
    }
}
