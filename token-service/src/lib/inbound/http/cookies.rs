use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::cookie::SameSite;
use chrono::DateTime;
use chrono::Utc;
use time::OffsetDateTime;

use super::transport::refresh_cookie_name;
use crate::domain::token::models::TokenPayload;

/// Attributes shared by every auth cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    /// Access cookie name; the refresh cookie is `<name>_refresh`
    pub name: String,
    pub domain: Option<String>,
    /// Path of the access cookie
    pub path: String,
    pub secure: bool,
    pub same_site: SameSite,
}

impl CookieSettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: None,
            path: "/".to_string(),
            secure: false,
            same_site: SameSite::Lax,
        }
    }
}

/// One cookie to write on the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSpec {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: String,
    pub expires_at: DateTime<Utc>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl CookieSpec {
    pub fn into_cookie(self) -> Cookie<'static> {
        let mut builder = Cookie::build((self.name, self.value))
            .path(self.path)
            .secure(self.secure)
            .http_only(self.http_only)
            .same_site(self.same_site);

        if let Some(domain) = self.domain {
            builder = builder.domain(domain);
        }
        if let Ok(expires) = OffsetDateTime::from_unix_timestamp(self.expires_at.timestamp()) {
            builder = builder.expires(expires);
        }

        builder.build()
    }
}

/// Decides which auth cookies a response carries and with what attributes.
#[derive(Debug, Clone)]
pub struct CookieDeliveryPlanner {
    settings: CookieSettings,
    refresh_path: String,
}

impl CookieDeliveryPlanner {
    /// # Arguments
    /// * `settings` - Shared cookie attributes
    /// * `refresh_path` - Route of the refresh endpoint, the only path the
    ///   refresh cookie is sent to
    pub fn new(settings: CookieSettings, refresh_path: impl Into<String>) -> Self {
        Self {
            settings,
            refresh_path: refresh_path.into(),
        }
    }

    pub fn settings(&self) -> &CookieSettings {
        &self.settings
    }

    /// Cookies for an issued payload, all expiring at `expires_at`.
    pub fn plan(&self, payload: &TokenPayload, expires_at: DateTime<Utc>) -> Vec<CookieSpec> {
        let mut specs = Vec::with_capacity(2);

        if let Some(access) = payload.access.as_ref().or(payload.token.as_ref()) {
            specs.push(self.spec(
                self.settings.name.clone(),
                access.clone(),
                self.settings.path.clone(),
                expires_at,
            ));
        }

        if let Some(refresh) = &payload.refresh {
            specs.push(self.spec(
                refresh_cookie_name(&self.settings.name),
                refresh.clone(),
                self.refresh_path.clone(),
                expires_at,
            ));
        }

        specs
    }

    /// Empty, already expired versions of both auth cookies.
    pub fn plan_deletion(&self) -> Vec<CookieSpec> {
        vec![
            self.spec(
                self.settings.name.clone(),
                String::new(),
                self.settings.path.clone(),
                DateTime::<Utc>::UNIX_EPOCH,
            ),
            self.spec(
                refresh_cookie_name(&self.settings.name),
                String::new(),
                self.refresh_path.clone(),
                DateTime::<Utc>::UNIX_EPOCH,
            ),
        ]
    }

    /// Add planned cookies to the outgoing jar.
    pub fn apply(&self, jar: CookieJar, specs: Vec<CookieSpec>) -> CookieJar {
        specs
            .into_iter()
            .fold(jar, |jar, spec| jar.add(spec.into_cookie()))
    }

    fn spec(
        &self,
        name: String,
        value: String,
        path: String,
        expires_at: DateTime<Utc>,
    ) -> CookieSpec {
        CookieSpec {
            name,
            value,
            domain: self.settings.domain.clone(),
            path,
            expires_at,
            secure: self.settings.secure,
            http_only: true,
            same_site: self.settings.same_site,
        }
    }
}
