//! Development backends
//!
//! Registered in the catalog at startup so configs can reference them by
//! name. Real providers live in their own crates and register the same way.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::State;
use axum::{Extension, Form, Json};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use minijinja::{Environment, context};
use serde::Deserialize;
use serde_json::Value;

use multiauth::{
    AuthenticatedUser, Authenticator, AuthenticatorCatalog, BackendError, BackendInit,
    ConfigurableAuthenticator, HostApp, LoginData, MultiAuthError, MultiAuthResult, NativeRoute,
    ScopedContext,
};

const LOGIN_FORM_NAME: &str = "dummy_login.html";

const LOGIN_FORM: &str = r#"<div class="auth-form-body">
  <form action="{{ login_url }}" method="post" role="form">
    <div class="auth-form-header"><h1>Sign in</h1></div>
    {% if error %}<p class="login_error">{{ error }}</p>{% endif %}
    <label for="username_input">Username:</label>
    <input id="username_input" name="username" type="text" autocapitalize="off" autocorrect="off">
    <label for="password_input">Password:</label>
    <input id="password_input" name="password" type="password">
    <input type="submit" class="btn btn-jupyter" value="Sign in with {{ service }}">
  </form>
  <img src="{{ base_url }}logo" alt="logo">
</div>
"#;

/// Dev backend options
#[derive(Debug, Default, Deserialize)]
struct DummyOptions {
    /// Shared password; any password is accepted when unset
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    login_service: Option<String>,
}

/// Login form template, compiled once per backend instance
struct LoginForm {
    env: Environment<'static>,
}

impl LoginForm {
    fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(LOGIN_FORM_NAME, LOGIN_FORM)?;
        Ok(Self { env })
    }

    fn render(&self, ctx: &ScopedContext, error: Option<&str>) -> MultiAuthResult<String> {
        let settings = ctx.settings();
        let namespace = ctx.template_namespace();
        let html = self.env.get_template(LOGIN_FORM_NAME)?.render(context! {
            login_url => settings.login_url,
            base_url => namespace.base_url(),
            service => ctx.authenticator().label(),
            error => error,
        })?;
        Ok(html)
    }
}

/// Accepts any non-empty username, optionally guarded by one shared password
pub struct DummyAuthenticator {
    password: Option<String>,
    login_service: Option<String>,
    form: Arc<LoginForm>,
}

impl ConfigurableAuthenticator for DummyAuthenticator {
    fn from_init(init: &BackendInit) -> Result<Self, BackendError> {
        let opts: DummyOptions = init.parse()?;
        Ok(Self {
            password: opts.password,
            login_service: opts.login_service,
            form: Arc::new(LoginForm::new()?),
        })
    }
}

#[async_trait]
impl Authenticator for DummyAuthenticator {
    fn login_service(&self) -> Option<&str> {
        self.login_service.as_deref()
    }

    fn handlers(&self, _app: &HostApp) -> Result<Vec<NativeRoute>, BackendError> {
        let handler = get(login_form)
            .post(login_submit)
            .layer(Extension(Arc::clone(&self.form)));
        Ok(vec![NativeRoute::new("/login", handler)])
    }

    async fn authenticate(&self, data: &LoginData) -> Result<Option<AuthenticatedUser>, BackendError> {
        let username = data.get("username").and_then(Value::as_str).unwrap_or("");
        if username.is_empty() {
            return Ok(None);
        }
        if let Some(expected) = &self.password {
            let given = data.get("password").and_then(Value::as_str);
            if given != Some(expected.as_str()) {
                return Ok(None);
            }
        }
        Ok(Some(AuthenticatedUser::new(username)))
    }
}

/// GET /login
async fn login_form(
    State(ctx): State<ScopedContext>,
    Extension(form): Extension<Arc<LoginForm>>,
) -> MultiAuthResult<Html<String>> {
    Ok(Html(form.render(&ctx, None)?))
}

/// POST /login
///
/// Session handling belongs to the host; a successful sign-in answers with
/// the authenticated user.
async fn login_submit(
    State(ctx): State<ScopedContext>,
    Extension(form): Extension<Arc<LoginForm>>,
    Form(fields): Form<HashMap<String, String>>,
) -> MultiAuthResult<Response> {
    let data: LoginData = fields
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();

    match ctx.authenticator().authenticate(&data).await {
        Ok(Some(user)) => {
            tracing::info!(user = %user.name, scope = %ctx.scope(), "Signed in");
            Ok(Json(user).into_response())
        }
        Ok(None) => {
            tracing::info!(scope = %ctx.scope(), "Sign in rejected");
            let html = form.render(&ctx, Some("Invalid username or password."))?;
            Ok((StatusCode::FORBIDDEN, Html(html)).into_response())
        }
        Err(e) => Err(MultiAuthError::Backend(e)),
    }
}

/// Catalog with every backend this binary knows about
pub fn catalog() -> AuthenticatorCatalog {
    let mut catalog = AuthenticatorCatalog::new();
    catalog
        .register_type::<DummyAuthenticator>("dummy")
        .alias("dummyauthenticator.DummyAuthenticator", "dummy");
    catalog
}
