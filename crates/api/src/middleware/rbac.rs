//! Role-based access control extractors.
//!
//! [`Authorized<G>`] (API) and [`WebAuthorized<G>`] (browser) wrap the
//! identity extractors and evaluate the [`AccessPolicy`] named by the gate
//! type `G`. Self-policies compare the caller with the `{id}` path
//! parameter.
//!
//! Failures are shaped by request kind: API routes answer with a JSON 401
//! (or 400 when the path id is not a number), browser pages redirect to `/`.

use std::marker::PhantomData;

use axum::extract::{FromRequestParts, RawPathParams};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use sitelog_core::roles::AccessPolicy;
use sitelog_core::types::DbId;

use super::auth::{AuthUser, WebUser};
use crate::error::AppError;
use crate::state::AppState;

/// Path parameter holding the target user id for self-policies.
const TARGET_PARAM: &str = "id";

/// Marker type naming the access policy of a route.
pub trait Gate: Send + Sync + 'static {
    const POLICY: AccessPolicy;
}

pub mod gates {
    use super::{AccessPolicy, Gate};

    macro_rules! gate {
        ($name:ident) => {
            #[derive(Debug)]
            pub struct $name;

            impl Gate for $name {
                const POLICY: AccessPolicy = AccessPolicy::$name;
            }
        };
    }

    gate!(SuperAdminOnly);
    gate!(AdminOnly);
    gate!(SelfOnly);
    gate!(SuperAdminOrAdmin);
    gate!(SuperAdminOrSelf);
    gate!(AdminOrSelf);
}

pub type RequireSuperAdmin = Authorized<gates::SuperAdminOnly>;
pub type RequireSelf = Authorized<gates::SelfOnly>;
pub type RequireSuperAdminOrAdmin = Authorized<gates::SuperAdminOrAdmin>;
pub type RequireSuperAdminOrSelf = Authorized<gates::SuperAdminOrSelf>;

pub type WebRequireSuperAdmin = WebAuthorized<gates::SuperAdminOnly>;
pub type WebRequireSuperAdminOrAdmin = WebAuthorized<gates::SuperAdminOrAdmin>;

#[derive(Debug, PartialEq, Eq)]
enum Denial {
    /// A self-policy could not read a numeric `{id}` from the path.
    InvalidTarget,
    Refused,
}

/// Evaluate `policy` for `user` against the raw `{id}` path value.
fn authorize(policy: AccessPolicy, user: &AuthUser, target: Option<&str>) -> Result<(), Denial> {
    let target_id = if policy.needs_target() {
        let id = target
            .and_then(|raw| raw.parse::<DbId>().ok())
            .ok_or(Denial::InvalidTarget)?;
        Some(id)
    } else {
        None
    };

    if policy.permits(user.role, user.user_id, target_id) {
        Ok(())
    } else {
        Err(Denial::Refused)
    }
}

async fn target_param(parts: &mut Parts, state: &AppState) -> Option<String> {
    let params = RawPathParams::from_request_parts(parts, state).await.ok()?;
    params
        .iter()
        .find(|(name, _)| *name == TARGET_PARAM)
        .map(|(_, value)| value.to_string())
}

// ---------------------------------------------------------------------------
// API
// ---------------------------------------------------------------------------

/// An API caller that satisfies the policy of gate `G`.
///
/// ```ignore
/// async fn delete_user(auth: RequireSuperAdmin, ...) -> AppResult<...> {
///     tracing::info!(user_id = auth.user.user_id, "deleting user");
/// }
/// ```
#[derive(Debug)]
pub struct Authorized<G: Gate> {
    pub user: AuthUser,
    gate: PhantomData<G>,
}

impl<G: Gate> FromRequestParts<AppState> for Authorized<G> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let target = target_param(parts, state).await;

        match authorize(G::POLICY, &user, target.as_deref()) {
            Ok(()) => Ok(Authorized {
                user,
                gate: PhantomData,
            }),
            Err(Denial::InvalidTarget) => Err(AppError::BadRequest("Invalid user id".into())),
            Err(Denial::Refused) => {
                tracing::debug!(
                    user_id = user.user_id,
                    policy = ?G::POLICY,
                    "Access policy rejected request"
                );
                Err(AppError::unauthorized("Unauthorized"))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Browser
// ---------------------------------------------------------------------------

/// A browser caller that satisfies the policy of gate `G`.
///
/// Missing sessions redirect to `/login` (see [`WebUser`]); a failed policy
/// redirects to `/`.
#[derive(Debug)]
pub struct WebAuthorized<G: Gate> {
    pub user: WebUser,
    gate: PhantomData<G>,
}

impl<G: Gate> FromRequestParts<AppState> for WebAuthorized<G> {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let web_user = WebUser::from_request_parts(parts, state).await?;
        let target = target_param(parts, state).await;

        match authorize(G::POLICY, &web_user.user, target.as_deref()) {
            Ok(()) => Ok(WebAuthorized {
                user: web_user,
                gate: PhantomData,
            }),
            Err(_) => Err(Redirect::to("/").into_response()),
        }
    }
}
