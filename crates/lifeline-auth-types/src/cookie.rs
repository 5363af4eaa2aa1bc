//! Session cookie builders.
//!
//! Cookies are host-only. The refresh token is scoped to `/login`, the only route
//! that consumes it.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the access token.
pub const LIFELINE_ACCESS_TOKEN: &str = "lifeline_access_token";

/// Cookie name for the refresh token.
pub const LIFELINE_REFRESH_TOKEN: &str = "lifeline_refresh_token";

/// Path of the refresh-token cookie.
pub const REFRESH_COOKIE_PATH: &str = "/login";

/// Cookie Max-Age for both tokens in seconds (7 days).
///
/// The access cookie outlives its JWT so that an expired token reaches the server
/// and yields 401 instead of silently disappearing.
pub const SESSION_COOKIE_MAX_AGE: i64 = 604800;

fn session_cookie(
    name: &'static str,
    value: String,
    path: &'static str,
    max_age: Duration,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path(path)
        .max_age(max_age)
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Store a freshly issued session on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use lifeline_auth_types::cookie::{set_session_cookies, LIFELINE_ACCESS_TOKEN, LIFELINE_REFRESH_TOKEN};
///
/// let jar = set_session_cookies(CookieJar::new(), "access".to_string(), "refresh".to_string(), true);
/// let access = jar.get(LIFELINE_ACCESS_TOKEN).unwrap();
/// assert_eq!(access.path(), Some("/"));
/// assert_eq!(access.max_age(), Some(time::Duration::seconds(604800)));
/// assert!(access.http_only().unwrap_or(false));
/// assert!(access.secure().unwrap_or(false));
/// let refresh = jar.get(LIFELINE_REFRESH_TOKEN).unwrap();
/// assert_eq!(refresh.path(), Some("/login"));
/// ```
pub fn set_session_cookies(
    jar: CookieJar,
    access_token: String,
    refresh_token: String,
    secure: bool,
) -> CookieJar {
    let max_age = Duration::seconds(SESSION_COOKIE_MAX_AGE);
    jar.add(session_cookie(
        LIFELINE_ACCESS_TOKEN,
        access_token,
        "/",
        max_age,
        secure,
    ))
    .add(session_cookie(
        LIFELINE_REFRESH_TOKEN,
        refresh_token,
        REFRESH_COOKIE_PATH,
        max_age,
        secure,
    ))
}

/// Clear both session cookies by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use lifeline_auth_types::cookie::{
///     clear_session_cookies, set_session_cookies, LIFELINE_ACCESS_TOKEN, LIFELINE_REFRESH_TOKEN,
/// };
///
/// let jar = set_session_cookies(CookieJar::new(), "a".to_string(), "r".to_string(), false);
/// let jar = clear_session_cookies(jar, false);
/// assert_eq!(jar.get(LIFELINE_ACCESS_TOKEN).unwrap().max_age(), Some(time::Duration::ZERO));
/// assert_eq!(jar.get(LIFELINE_REFRESH_TOKEN).unwrap().max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_session_cookies(jar: CookieJar, secure: bool) -> CookieJar {
    jar.add(session_cookie(
        LIFELINE_ACCESS_TOKEN,
        String::new(),
        "/",
        Duration::ZERO,
        secure,
    ))
    .add(session_cookie(
        LIFELINE_REFRESH_TOKEN,
        String::new(),
        REFRESH_COOKIE_PATH,
        Duration::ZERO,
        secure,
    ))
}

/// Read the refresh token sent by the browser, if any.
pub fn refresh_token(jar: &CookieJar) -> Option<String> {
    jar.get(LIFELINE_REFRESH_TOKEN)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}
