//! Profile endpoints: public profiles, edits and document uploads.

use staffroom_core::{
    CurrentUser, MultipartField, ProfileUpdate, RequestSpec, Result, Tag, TagKind,
};

use crate::endpoints::json_body;
use crate::envelope;
use crate::handle::{Binder, MutationHandle, QueryHandle};
use crate::registry::{MutationDef, QueryDef};

/// Argument for [`ProfileEndpoints::update_profile`].
#[derive(Debug, Clone)]
pub struct UpdateProfile {
    pub id: String,
    pub update: ProfileUpdate,
}

/// Argument for the upload mutations.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub user_id: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

pub struct ProfileEndpoints {
    pub profile: QueryHandle<String, CurrentUser>,
    pub update_profile: MutationHandle<UpdateProfile, CurrentUser>,
    pub upload_resume: MutationHandle<FileUpload, CurrentUser>,
    pub upload_avatar: MutationHandle<FileUpload, CurrentUser>,
}

impl ProfileEndpoints {
    pub(crate) fn register(bind: &Binder) -> Result<Self> {
        Ok(Self {
            profile: bind.query(
                QueryDef::new(
                    "profile",
                    |id: &String| RequestSpec::get(format!("/users/{id}")),
                    |_, id| vec![Tag::item(TagKind::User, id.clone())],
                )
                .with_transform(envelope::user),
            )?,
            update_profile: bind.mutation(
                MutationDef::new(
                    "updateProfile",
                    |up: &UpdateProfile| {
                        RequestSpec::put(format!("/users/{}", up.id), json_body(&up.update))
                    },
                    // The kind tag reaches the current-user probe as well as
                    // this profile's entry.
                    |up, _| {
                        vec![Tag::of(TagKind::User), Tag::item(TagKind::User, up.id.clone())]
                    },
                )
                .with_transform(envelope::user),
            )?,
            upload_resume: bind.mutation(
                MutationDef::new(
                    "uploadResume",
                    |up: &FileUpload| upload_request(up, "resume"),
                    upload_tags,
                )
                .with_transform(envelope::user),
            )?,
            upload_avatar: bind.mutation(
                MutationDef::new(
                    "uploadAvatar",
                    |up: &FileUpload| upload_request(up, "avatar"),
                    upload_tags,
                )
                .with_transform(envelope::user),
            )?,
        })
    }
}

fn upload_request(up: &FileUpload, field: &str) -> RequestSpec {
    RequestSpec::multipart(
        format!("/users/{}/{field}", up.user_id),
        vec![MultipartField::file(
            field,
            up.file_name.clone(),
            up.content_type.clone(),
            up.data.clone(),
        )],
    )
}

fn upload_tags(up: &FileUpload, _: &CurrentUser) -> Vec<Tag> {
    vec![Tag::item(TagKind::User, up.user_id.clone())]
}
