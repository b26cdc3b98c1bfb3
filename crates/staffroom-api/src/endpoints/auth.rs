//! Identity endpoints: login, signup, the current-user probe and logout.

use serde_json::Value;
use staffroom_core::{CurrentUser, LoginRequest, RequestSpec, Result, SignupRequest, Tag, TagKind};

use crate::endpoints::json_body;
use crate::envelope;
use crate::handle::{Binder, MutationHandle, QueryHandle};
use crate::registry::{MutationDef, QueryDef};

pub struct AuthEndpoints {
    /// Who the session cookie belongs to, per the backend.
    pub current_user: QueryHandle<(), CurrentUser>,
    pub login: MutationHandle<LoginRequest, CurrentUser>,
    pub signup: MutationHandle<SignupRequest, CurrentUser>,
    pub logout: MutationHandle<(), Value>,
}

impl AuthEndpoints {
    pub(crate) fn register(bind: &Binder) -> Result<Self> {
        Ok(Self {
            current_user: bind.query(
                QueryDef::new(
                    "currentUser",
                    |_: &()| RequestSpec::get("/auth/me"),
                    |_, _| vec![Tag::of(TagKind::User)],
                )
                .with_transform(envelope::user),
            )?,
            login: bind.mutation(
                MutationDef::new(
                    "login",
                    |req: &LoginRequest| RequestSpec::post("/auth/login", json_body(req)),
                    |_, _| Vec::new(),
                )
                .with_transform(envelope::user)
                .with_validation(LoginRequest::validate),
            )?,
            signup: bind.mutation(
                MutationDef::new(
                    "signup",
                    |req: &SignupRequest| RequestSpec::post("/auth/signup", json_body(req)),
                    |_, _| Vec::new(),
                )
                .with_transform(envelope::user)
                .with_validation(SignupRequest::validate),
            )?,
            logout: bind.mutation(MutationDef::new(
                "logout",
                |_: &()| RequestSpec::post_empty("/auth/logout"),
                |_, _| Vec::new(),
            ))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use staffroom_core::{HttpMethod, RequestBody};

    #[test]
    fn test_login_request_shape() {
        let spec = RequestSpec::post(
            "/auth/login",
            json_body(&LoginRequest {
                email: "t@school.edu".into(),
                password: "pw".into(),
            }),
        );
        assert_eq!(spec.method, HttpMethod::Post);
        assert_eq!(
            spec.body,
            RequestBody::Json(json!({"email": "t@school.edu", "password": "pw"}))
        );
    }

    #[test]
    fn test_signup_body_omits_confirmation() {
        let body = json_body(&SignupRequest {
            name: "Jo".into(),
            email: "jo@x.y".into(),
            password: "pw".into(),
            confirm_password: "pw".into(),
            role: staffroom_core::Role::College,
        });
        assert!(body.get("confirmPassword").is_none());
        assert_eq!(body["role"], json!("college"));
    }
}
