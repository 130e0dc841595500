use axum::http::{header, HeaderMap};

use super::TOKEN_TTL_SECS;

/// Name of the cookie carrying the signed token.
pub const TOKEN_COOKIE: &str = "token";

/// `Set-Cookie` value for a freshly issued token.
///
/// Always `HttpOnly`. `secure` adds `Secure; SameSite=None`, which browsers
/// require before sending the cookie on cross-site requests.
pub fn token_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!("{}={}; Path=/; Max-Age={}; HttpOnly", TOKEN_COOKIE, token, TOKEN_TTL_SECS);
    if secure {
        cookie.push_str("; Secure; SameSite=None");
    }
    cookie
}

/// Value of the named cookie across all `Cookie` headers, if present and non-empty.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn builds_http_only_cookie() {
        let cookie = token_cookie("abc.def.ghi", false);
        assert_eq!(cookie, "token=abc.def.ghi; Path=/; Max-Age=3600; HttpOnly");
        assert!(token_cookie("t", true).ends_with("; HttpOnly; Secure; SameSite=None"));
    }

    #[test]
    fn reads_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; token=abc.def; lang=en"));
        assert_eq!(read_cookie(&headers, TOKEN_COOKIE), Some("abc.def"));
    }

    #[test]
    fn keeps_equals_signs_inside_the_value() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token=eyJhbGciOiJIUzI1NiJ9.eyJhIjoxfQ==.c2ln=; x=1"));
        assert_eq!(read_cookie(&headers, TOKEN_COOKIE), Some("eyJhbGciOiJIUzI1NiJ9.eyJhIjoxfQ==.c2ln="));
    }

    #[test]
    fn reads_cookie_from_any_header() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(header::COOKIE, HeaderValue::from_static("token=\"quoted\""));
        assert_eq!(read_cookie(&headers, TOKEN_COOKIE), Some("quoted"));
    }

    #[test]
    fn missing_or_empty_cookie() {
        let mut headers = HeaderMap::new();
        assert_eq!(read_cookie(&headers, TOKEN_COOKIE), None);
        headers.insert(header::COOKIE, HeaderValue::from_static("token=; other=1"));
        assert_eq!(read_cookie(&headers, TOKEN_COOKIE), None);
        headers.insert(header::COOKIE, HeaderValue::from_static("mytoken=abc"));
        assert_eq!(read_cookie(&headers, TOKEN_COOKIE), None);
    }
}
