use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;
use time::Duration;
use uuid::Uuid;

use super::cookies::CookieSettings;

pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// Issue a double-submit CSRF cookie unless the request already carries one.
///
/// The cookie is readable by scripts so clients can echo it in a header.
pub fn ensure_csrf_cookie(
    request_cookies: &CookieJar,
    jar: CookieJar,
    settings: &CookieSettings,
) -> CookieJar {
    if request_cookies.get(CSRF_COOKIE_NAME).is_some() {
        return jar;
    }

    let mut builder = Cookie::build((CSRF_COOKIE_NAME, Uuid::new_v4().simple().to_string()))
        .path("/")
        .max_age(Duration::days(365))
        .secure(settings.secure)
        .http_only(false)
        .same_site(settings.same_site);

    if let Some(domain) = &settings.domain {
        builder = builder.domain(domain.clone());
    }

    jar.add(builder.build())
}
