//! Cross-module tests for the multiauth crate
//!
//! One fake backend type stands in for every provider; its behavior comes
//! from the parent config section of the name it was registered under.

#[cfg(test)]
mod fixtures {
    use async_trait::async_trait;
    use axum::Json;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use platform::url_path::url_path_join;
    use serde::Deserialize;
    use serde_json::{Value, json};

    use crate::{
        AuthenticatedUser, Authenticator, AuthenticatorCatalog, BackendError, BackendInit,
        CompositeAuthenticator, ConfigurableAuthenticator, HostApp, LoginData, MultiAuthConfig,
        MultiAuthResult, NativeRoute, ScopedContext,
    };

    #[derive(Debug, Deserialize)]
    struct FakeOptions {
        #[serde(default)]
        service: Option<String>,
        #[serde(default = "default_login_path")]
        login_path: String,
        #[serde(default)]
        routes: Vec<String>,
        #[serde(default)]
        fail: Option<String>,
        #[serde(default)]
        fail_handlers: Option<String>,
    }

    fn default_login_path() -> String {
        "login".to_string()
    }

    pub struct FakeBackend {
        service: Option<String>,
        login_path: String,
        routes: Vec<String>,
        fail_handlers: Option<String>,
    }

    impl ConfigurableAuthenticator for FakeBackend {
        fn from_init(init: &BackendInit) -> Result<Self, BackendError> {
            let opts: FakeOptions = init.parse()?;
            if let Some(message) = opts.fail {
                return Err(message.into());
            }
            let routes = if opts.routes.is_empty() {
                vec![format!("/{}", opts.login_path)]
            } else {
                opts.routes
            };
            Ok(Self {
                service: opts.service,
                login_path: opts.login_path,
                routes,
                fail_handlers: opts.fail_handlers,
            })
        }
    }

    #[async_trait]
    impl Authenticator for FakeBackend {
        fn login_url(&self, base_url: &str) -> String {
            url_path_join(&[base_url, self.login_path.as_str()])
        }

        fn login_service(&self) -> Option<&str> {
            self.service.as_deref()
        }

        fn handlers(&self, _app: &HostApp) -> Result<Vec<NativeRoute>, BackendError> {
            if let Some(message) = &self.fail_handlers {
                return Err(message.clone().into());
            }
            Ok(self
                .routes
                .iter()
                .map(|path| NativeRoute::new(path.clone(), get(scoped_info).post(fake_login)))
                .collect())
        }

        async fn authenticate(
            &self,
            data: &LoginData,
        ) -> Result<Option<AuthenticatedUser>, BackendError> {
            Ok(match data.get("username").and_then(Value::as_str) {
                Some("ada") => Some(AuthenticatedUser::new("ada")),
                _ => None,
            })
        }
    }

    async fn scoped_info(State(ctx): State<ScopedContext>) -> Json<Value> {
        let settings = ctx.settings();
        let namespace = ctx.template_namespace();
        Json(json!({
            "scope": ctx.scope().as_str(),
            "login_url": settings.login_url,
            "base_url": namespace.base_url(),
            "service": ctx.authenticator().label(),
        }))
    }

    async fn fake_login(State(ctx): State<ScopedContext>, Json(data): Json<LoginData>) -> Response {
        match ctx.authenticator().authenticate(&data).await {
            Ok(Some(user)) => Json(user).into_response(),
            Ok(None) => StatusCode::FORBIDDEN.into_response(),
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }

    pub fn catalog() -> AuthenticatorCatalog {
        let mut catalog = AuthenticatorCatalog::new();
        catalog
            .register_type::<FakeBackend>("oauth")
            .register_type::<FakeBackend>("local")
            .alias("fakes.LocalFake", "local");
        catalog
    }

    pub fn config_with(authenticators: Value, login_page_path: &str) -> MultiAuthResult<MultiAuthConfig> {
        let json = json!({
            "base_url": "/hub/",
            "login_page_path": login_page_path,
            "authenticators": authenticators,
            "backend_config": {
                "oauth": {
                    "service": "GitHub",
                    "login_path": "oauth_login",
                    "routes": ["/oauth_login", "/oauth_callback"]
                },
                "local": {}
            }
        });
        MultiAuthConfig::from_json_str(&json.to_string())
    }

    pub fn try_composite(authenticators: Value) -> MultiAuthResult<CompositeAuthenticator> {
        CompositeAuthenticator::new(config_with(authenticators, "/login")?, &catalog())
    }

    pub fn composite(authenticators: Value) -> CompositeAuthenticator {
        try_composite(authenticators).unwrap()
    }
}

#[cfg(test)]
mod construction_tests {
    use super::fixtures::*;
    use serde_json::json;

    use crate::{
        Authenticator, BackendReference, BackendSpec, CompositeAuthenticator, MultiAuthConfig,
        MultiAuthError, Scope,
    };

    #[test]
    fn test_bindings_keep_config_order() {
        let c = composite(json!([["oauth", "oauth"], ["local", ""]]));
        let scopes: Vec<&str> = c.bindings().iter().map(|b| b.scope().as_str()).collect();
        assert_eq!(scopes, vec!["oauth", ""]);
    }

    #[test]
    fn test_bound_login_url_goes_through_scope() {
        let c = composite(json!([["local", "team-a"]]));
        let binding = c.binding_for_scope("team-a").unwrap();
        assert_eq!(binding.native_login_url(), "login");
        assert_eq!(binding.login_url("/hub"), "/hub/team-a/login");
    }

    #[test]
    fn test_unknown_backend_fails_construction() {
        let err = try_composite(json!([["ldap", ""]])).unwrap_err();
        assert!(matches!(err, MultiAuthError::Resolution { reference } if reference == "ldap"));
    }

    #[test]
    fn test_duplicate_scope_fails_construction() {
        let err = try_composite(json!([["local", "a"], ["oauth", "/a/"]])).unwrap_err();
        assert!(matches!(err, MultiAuthError::DuplicateScope(scope) if scope == "a"));
    }

    #[test]
    fn test_backend_construction_error_propagates_unmodified() {
        let err = try_composite(json!([
            {"backend": "oauth", "scope": "x", "options": {"fail": "client_id is required"}}
        ]))
        .unwrap_err();
        assert!(matches!(err, MultiAuthError::Backend(_)));
        assert_eq!(err.to_string(), "client_id is required");
    }

    #[test]
    fn test_inline_options_override_parent_section() {
        let c = composite(json!([
            {"backend": "oauth", "scope": "gl", "options": {"service": "GitLab"}}
        ]));
        let links = c.login_links("/hub/");
        assert_eq!(links[0].label, "GitLab");
        assert_eq!(links[0].url, "/hub/gl/oauth_login");
    }

    #[test]
    fn test_binding_for_scope_normalizes_like_config() {
        let c = composite(json!([["local", "org/team-a"]]));
        assert!(c.binding_for_scope("org//team-a").is_some());
        assert!(c.binding_for_scope("/org/team-a/").is_some());
        assert!(c.binding_for_scope("org").is_none());
        assert!(c.binding_for_scope("{org}").is_none());
    }

    #[test]
    fn test_alias_resolves_to_canonical_backend() {
        let c = composite(json!([["fakes.LocalFake", "x"]]));
        assert_eq!(c.bindings()[0].name(), "local");
        assert!(c.binding_for_backend("local").is_some());
    }

    #[test]
    fn test_direct_reference_in_programmatic_config() {
        let config = MultiAuthConfig::default().with_authenticator(
            BackendSpec::new(
                BackendReference::of::<FakeBackend>(),
                Scope::parse("direct").unwrap(),
            )
            .with_option("service", "Direct"),
        );
        let c = CompositeAuthenticator::new(config, &catalog()).unwrap();

        let links = c.login_links("/hub/");
        assert_eq!(links[0].label, "Direct");
        assert_eq!(links[0].url, "/hub/direct/login");
    }
}

#[cfg(test)]
mod route_table_tests {
    use super::fixtures::*;
    use serde_json::json;
    use std::collections::HashSet;

    use crate::domain::route::FallbackKind;
    use crate::{MultiAuthError, RouteTarget};

    #[test]
    fn test_one_route_per_native_route_all_prefixed() {
        let c = composite(json!([["oauth", "oauth"], ["local", ""]]));
        let table = c.get_routes(&c.host_app()).unwrap();

        let scoped: Vec<_> = table
            .entries()
            .iter()
            .filter(|e| matches!(e.target, RouteTarget::Scoped { .. }))
            .collect();
        assert_eq!(scoped.len(), 3);

        for entry in &scoped {
            if entry.scope.is_default() {
                assert!(!entry.path.starts_with("/oauth/"), "{}", entry.path);
            } else {
                assert!(entry.path.starts_with("/oauth/"), "{}", entry.path);
            }
        }

        let unique: HashSet<&str> = table.paths().collect();
        assert_eq!(unique.len(), table.len());
        assert!(unique.contains("/oauth/oauth_login"));
        assert!(unique.contains("/oauth/oauth_callback"));
        assert!(unique.contains("/login"));
    }

    #[test]
    fn test_fallbacks_only_for_non_default_scope() {
        let c = composite(json!([["local", "team-a"], ["oauth", ""]]));
        let app = c.host_app();
        let table = c.get_routes(&app).unwrap();

        let catch_all = table.get("/team-a/{*path}").unwrap();
        let redirect = catch_all.redirect_target().unwrap();
        assert_eq!(redirect.kind, FallbackKind::CatchAll);
        assert_eq!(redirect.root, "/hub/");

        let root = table.get("/team-a/").unwrap();
        assert_eq!(root.redirect_target().unwrap().kind, FallbackKind::ScopeRoot);

        let redirects: Vec<_> = table
            .entries()
            .iter()
            .filter(|e| e.redirect_target().is_some())
            .collect();
        assert_eq!(redirects.len(), 2);
        assert!(redirects.iter().all(|e| e.scope.as_str() == "team-a"));
    }

    #[test]
    fn test_fallback_target_follows_host_root() {
        let c = composite(json!([["local", "team-a"]]));
        let app = crate::HostApp::new("/jupyter/");
        let table = c.get_routes(&app).unwrap();
        let redirect = table.get("/team-a/").unwrap().redirect_target().unwrap();
        assert_eq!(redirect.location(None, None), "/jupyter/");
    }

    #[test]
    fn test_same_backend_type_in_two_scopes_does_not_leak() {
        let c = composite(json!([["local", "team-a"], ["local", "team-b"]]));
        let app = c.host_app();
        let table = c.get_routes(&app).unwrap();

        let a = table.get("/team-a/login").unwrap().context().unwrap();
        let b = table.get("/team-b/login").unwrap().context().unwrap();

        assert_eq!(a.settings().login_url, "/hub/team-a/login");
        assert_eq!(b.settings().login_url, "/hub/team-b/login");
        assert_eq!(a.template_namespace().base_url(), Some("/hub/team-a/"));
        assert_eq!(b.template_namespace().base_url(), Some("/hub/team-b/"));
        assert_eq!(a.settings().hub.base_url, "/hub/");

        // host values are untouched by the views
        assert_eq!(app.settings.login_url, "/hub/login");
        assert_eq!(app.template_namespace.base_url(), Some("/hub/"));
    }

    #[test]
    fn test_colliding_routes_are_configuration_conflict() {
        let c = composite(json!([
            {"backend": "local", "scope": "", "options": {"routes": ["/team-a/login"]}},
            ["local", "team-a"]
        ]));
        let err = c.get_routes(&c.host_app()).unwrap_err();
        match err {
            MultiAuthError::ConfigurationConflict {
                path,
                first,
                second,
            } => {
                assert_eq!(path, "/team-a/login");
                assert_eq!(first, "");
                assert_eq!(second, "team-a");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_native_scope_root_replaces_root_redirect() {
        let c = composite(json!([
            {"backend": "local", "scope": "a", "options": {"routes": ["/", "/login"]}}
        ]));
        let table = c.get_routes(&c.host_app()).unwrap();

        assert!(table.get("/a/").unwrap().context().is_some());
        assert!(table.get("/a/login").is_some());
        let kinds: Vec<FallbackKind> = table
            .entries()
            .iter()
            .filter_map(|e| e.redirect_target().map(|r| r.kind))
            .collect();
        assert_eq!(kinds, vec![FallbackKind::CatchAll]);
    }

    #[test]
    fn test_parameter_route_under_scope_is_accepted() {
        let c = composite(json!([
            {"backend": "local", "scope": "a", "options": {"routes": ["/{id}"]}}
        ]));
        let table = c.get_routes(&c.host_app()).unwrap();
        assert!(table.get("/a/{id}").unwrap().context().is_some());
        assert!(table.get("/a/{*path}").unwrap().redirect_target().is_some());
    }

    #[test]
    fn test_wildcards_from_two_bindings_conflict() {
        let c = composite(json!([
            {"backend": "local", "scope": "", "options": {"routes": ["/team-a/{id}"]}},
            {"backend": "local", "scope": "team-a", "options": {"routes": ["/{*rest}"]}}
        ]));
        let err = c.get_routes(&c.host_app()).unwrap_err();
        match err {
            MultiAuthError::ConfigurationConflict {
                path,
                first,
                second,
            } => {
                assert_eq!(path, "/team-a/{*rest}");
                assert_eq!(first, "");
                assert_eq!(second, "team-a");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_handler_errors_propagate() {
        let c = composite(json!([
            {"backend": "oauth", "scope": "x", "options": {"fail_handlers": "provider offline"}}
        ]));
        let err = c.get_routes(&c.host_app()).unwrap_err();
        assert!(matches!(err, MultiAuthError::Backend(_)));
        assert_eq!(err.to_string(), "provider offline");
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let c = composite(json!([["oauth", "oauth"], ["local", ""]]));
        let app = c.host_app();
        let first: Vec<String> = c.get_routes(&app).unwrap().paths().map(String::from).collect();
        let second: Vec<String> = c.get_routes(&app).unwrap().paths().map(String::from).collect();
        assert_eq!(first, second);
    }
}

#[cfg(test)]
mod facade_tests {
    use super::fixtures::*;
    use minijinja::HtmlEscape;
    use serde_json::json;

    use crate::{LoginData, MultiAuthError};

    #[tokio::test]
    async fn test_authenticate_is_never_supported() {
        let c = composite(json!([["oauth", "oauth"], ["local", ""]]));

        let empty = LoginData::new();
        assert!(matches!(
            c.authenticate(&empty).await,
            Err(MultiAuthError::NotSupported)
        ));

        let mut valid = LoginData::new();
        valid.insert("username".to_string(), "ada".into());
        assert!(matches!(
            c.authenticate(&valid).await,
            Err(MultiAuthError::NotSupported)
        ));

        let none = composite(json!([]));
        assert!(matches!(
            none.authenticate(&empty).await,
            Err(MultiAuthError::NotSupported)
        ));
    }

    #[test]
    fn test_login_page_links_in_config_order() {
        let c = composite(json!([["oauth", "oauth"], ["local", ""]]));
        let html = c.render_login_page("/hub").unwrap();

        let oauth_href = format!("href=\"{}\"", HtmlEscape("/hub/oauth/oauth_login"));
        let local_href = format!("href=\"{}\"", HtmlEscape("/hub/login"));
        let oauth_at = html.find(&oauth_href).expect("oauth link");
        let local_at = html.find(&local_href).expect("local link");
        assert!(oauth_at < local_at);

        assert_eq!(html.matches("<a ").count(), 2);
        let github_at = html.find("Sign in with GitHub").unwrap();
        let local_label_at = html.find("Sign in with Local User").unwrap();
        assert!(github_at < local_label_at);
    }

    #[test]
    fn test_login_page_is_deterministic() {
        let c = composite(json!([["oauth", "oauth"], ["local", ""]]));
        assert_eq!(
            c.render_login_page("/hub/").unwrap(),
            c.render_login_page("/hub/").unwrap()
        );
    }
}

#[cfg(test)]
mod router_tests {
    use super::fixtures::*;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::{CompositeAuthenticator, MultiAuthError, composite_router};

    fn router_for(authenticators: Value) -> Router {
        let config = config_with(authenticators, "/sign-in").unwrap();
        let c = Arc::new(CompositeAuthenticator::new(config, &catalog()).unwrap());
        let app = c.host_app();
        composite_router(c, &app).unwrap()
    }

    fn router() -> Router {
        router_for(json!([["oauth", "oauth"], ["local", ""]]))
    }

    async fn location_of(router: Router, uri: &str) -> String {
        let response = router.oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{uri}");
        response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_scoped_handler_sees_rewritten_views() {
        let response = router().oneshot(get("/oauth/oauth_login")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["scope"], "oauth");
        assert_eq!(body["login_url"], "/hub/oauth/oauth_login");
        assert_eq!(body["base_url"], "/hub/oauth/");
        assert_eq!(body["service"], "GitHub");
    }

    #[tokio::test]
    async fn test_default_scope_handler_keeps_root_views() {
        let response = router().oneshot(get("/login")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["login_url"], "/hub/login");
        assert_eq!(body["base_url"], "/hub/");
        assert_eq!(body["service"], "Local User");
    }

    #[tokio::test]
    async fn test_unmatched_scoped_path_redirects_to_root() {
        let response = router()
            .oneshot(get("/oauth/static/logo.png?v=1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/hub/static/logo.png?v=1"
        );
    }

    #[tokio::test]
    async fn test_scope_root_redirects_to_root() {
        let response = router().oneshot(get("/oauth/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/hub/");
    }

    #[tokio::test]
    async fn test_redirect_keeps_suffix_encoding() {
        assert_eq!(location_of(router(), "/oauth/a%3Fb").await, "/hub/a%3Fb");
        assert_eq!(
            location_of(router(), "/oauth/caf%C3%A9?next=%2F").await,
            "/hub/caf%C3%A9?next=%2F"
        );
    }

    #[tokio::test]
    async fn test_unmatched_requests_outside_scopes_are_not_found() {
        let response = router().oneshot(get("/nowhere")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = router()
            .oneshot(post_json("/oauth/unknown", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_parameter_route_under_scope_is_served() {
        let scoped = || {
            router_for(json!([
                {"backend": "local", "scope": "a", "options": {"routes": ["/{id}"]}}
            ]))
        };

        let response = scoped().oneshot(get("/a/42")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["scope"], "a");

        assert_eq!(location_of(scoped(), "/a/42/logo.png").await, "/hub/42/logo.png");
        assert_eq!(location_of(scoped(), "/a/").await, "/hub/");
    }

    #[tokio::test]
    async fn test_native_scope_root_is_served_by_backend() {
        let router = router_for(json!([
            {"backend": "local", "scope": "a", "options": {"routes": ["/", "/login"]}}
        ]));
        let response = router.oneshot(get("/a/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["login_url"], "/hub/a/login");
    }

    #[tokio::test]
    async fn test_login_delegates_to_bound_backend() {
        let ok = router()
            .oneshot(post_json("/login", json!({"username": "ada"})))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(body_json(ok).await["name"], "ada");

        let rejected = router()
            .oneshot(post_json("/oauth/oauth_login", json!({"username": "eve"})))
            .await
            .unwrap();
        assert_eq!(rejected.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_login_page_route_renders_all_backends() {
        let response = router().oneshot(get("/sign-in")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Sign in with GitHub"));
        assert!(html.contains("Sign in with Local User"));
    }

    #[test]
    fn test_login_page_path_collision_is_conflict() {
        let c = Arc::new(composite(json!([["local", ""]])));
        let app = c.host_app();
        let err = composite_router(c, &app).unwrap_err();
        assert!(matches!(
            err,
            MultiAuthError::ConfigurationConflict { path, .. } if path == "/login"
        ));
    }
}
