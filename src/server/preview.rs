//! Preview mode: a cookie carrying the CMS ref to render against

use axum::{
    extract::Query,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;

pub const PREVIEW_COOKIE: &str = "spacetraveling_preview";

#[derive(Debug, Deserialize)]
pub struct PreviewParams {
    token: Option<String>,
}

/// `GET /api/preview?token=<ref>`
pub async fn enter(Query(params): Query<PreviewParams>) -> Response {
    let Some(token) = params.token.filter(|t| !t.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing preview token").into_response();
    };

    tracing::info!("Entering preview mode");
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        PREVIEW_COOKIE,
        utf8_percent_encode(&token, NON_ALPHANUMERIC)
    );
    ([(header::SET_COOKIE, cookie)], Redirect::temporary("/")).into_response()
}

/// `GET /api/exit-preview`; safe to call without an active preview
pub async fn exit() -> Response {
    let cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        PREVIEW_COOKIE
    );
    ([(header::SET_COOKIE, cookie)], Redirect::temporary("/")).into_response()
}

/// The preview ref carried by the request, if any
pub fn preview_ref(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == PREVIEW_COOKIE)
        .and_then(|(_, value)| percent_decode_str(value).decode_utf8().ok())
        .map(|value| value.into_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_preview_ref_from_cookie() {
        let h = headers("theme=dark; spacetraveling_preview=YZ%7Epreview%2E1; other=1");
        assert_eq!(preview_ref(&h).as_deref(), Some("YZ~preview.1"));
    }

    #[test]
    fn test_no_preview_ref() {
        assert_eq!(preview_ref(&HeaderMap::new()), None);
        assert_eq!(preview_ref(&headers("spacetraveling_preview=")), None);
        assert_eq!(preview_ref(&headers("spacetraveling_previewx=abc")), None);
    }

    #[tokio::test]
    async fn test_enter_sets_cookie_and_redirects() {
        let response = enter(Query(PreviewParams {
            token: Some("YZ~preview".to_string()),
        }))
        .await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/");

        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("spacetraveling_preview=YZ%7Epreview;"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn test_enter_requires_token() {
        let response = enter(Query(PreviewParams { token: None })).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_exit_clears_cookie() {
        for _ in 0..2 {
            let response = exit().await;
            assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
            assert_eq!(response.headers()[header::LOCATION], "/");
            let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
            assert!(cookie.contains("Max-Age=0"));
        }
    }
}
