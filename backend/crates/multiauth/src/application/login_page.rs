//! Aggregate login page
//!
//! One sign-in link per backend, in configuration order.

use minijinja::{Environment, context};
use serde::Serialize;

use crate::error::MultiAuthResult;

const TEMPLATE_NAME: &str = "login.html";
const TEMPLATE: &str = include_str!("../../templates/login.html");

/// One rendered sign-in link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginLink {
    pub url: String,
    pub label: String,
}

/// Compiled login page template. HTML auto-escaping applies to every value.
pub struct LoginPage {
    env: Environment<'static>,
}

impl std::fmt::Debug for LoginPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginPage").finish_non_exhaustive()
    }
}

impl LoginPage {
    pub fn new() -> MultiAuthResult<Self> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render(&self, links: &[LoginLink]) -> MultiAuthResult<String> {
        let template = self.env.get_template(TEMPLATE_NAME)?;
        Ok(template.render(context! { links => links })?)
    }
}
