use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::errors::ErrorCode;

/// `{match_id}` path segment, parsed and range-checked. Existence is
/// checked later by the registry.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct MatchId(pub i64);

fn parse(raw: Option<&str>) -> Result<MatchId, AppError> {
    let raw =
        raw.ok_or_else(|| AppError::bad_request(ErrorCode::InvalidMatchId, "Missing match id"))?;
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(MatchId(id)),
        _ => Err(AppError::bad_request(
            ErrorCode::InvalidMatchId,
            format!("Invalid match id: {raw}"),
        )),
    }
}

impl FromRequest for MatchId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(parse(req.match_info().get("match_id")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_positive_ids_only() {
        assert_eq!(parse(Some("17")).unwrap(), MatchId(17));
        for bad in ["0", "-1", "abc", ""] {
            let err = parse(Some(bad)).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidMatchId);
        }
        assert!(parse(None).is_err());
    }
}
