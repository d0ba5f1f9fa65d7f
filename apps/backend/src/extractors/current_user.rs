use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::actions::MAX_DISPLAY_NAME;
use crate::domain::types::UserId;
use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const DISPLAY_NAME_HEADER: &str = "x-display-name";

/// Caller identity as asserted by the upstream identity gateway.
///
/// The orchestrator never validates credentials; it trusts `x-user-id` and
/// rejects the request with 401 when it is missing or not a positive integer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub display_name: Option<String>,
}

impl CurrentUser {
    /// Name to seat the user under when none was given explicitly.
    pub fn name_or_default(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| format!("player-{}", self.id))
    }

    fn from_headers(req: &HttpRequest) -> Result<Self, AppError> {
        let raw = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(AppError::unauthorized)?;
        let id = raw
            .trim()
            .parse::<UserId>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                debug!(header = USER_ID_HEADER, "unparseable user id");
                AppError::unauthorized()
            })?;

        let display_name = req
            .headers()
            .get(DISPLAY_NAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.chars().take(MAX_DISPLAY_NAME).collect());

        Ok(Self { id, display_name })
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_headers(req))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn reads_id_and_trims_name() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "42"))
            .insert_header((DISPLAY_NAME_HEADER, "  Ada  "))
            .to_http_request();
        let user = CurrentUser::from_headers(&req).unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.display_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn missing_or_bad_ids_are_unauthorized() {
        for value in [None, Some("abc"), Some("0"), Some("-3")] {
            let mut req = TestRequest::default();
            if let Some(v) = value {
                req = req.insert_header((USER_ID_HEADER, v));
            }
            let err = CurrentUser::from_headers(&req.to_http_request()).unwrap_err();
            assert!(matches!(err, AppError::Unauthorized), "{value:?}");
        }
    }

    #[test]
    fn default_name_uses_the_id() {
        let user = CurrentUser {
            id: 9,
            display_name: None,
        };
        assert_eq!(user.name_or_default(), "player-9");
    }
}
