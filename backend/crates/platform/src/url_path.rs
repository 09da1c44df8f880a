//! URL path algebra
//!
//! Pure helpers for composing a mount prefix ("scope") with the paths a
//! component generates for itself. Every function here is total: empty
//! segments are valid and simply contribute nothing.

/// Join URL path pieces with exactly one `/` between non-empty segments.
///
/// A leading `/` on the first piece and a trailing `/` on the last piece
/// survive the join. Runs of separators anywhere in the input collapse.
///
/// ## Examples
/// ```rust
/// use platform::url_path::url_path_join;
///
/// assert_eq!(url_path_join(&["/hub/", "team-a", "login"]), "/hub/team-a/login");
/// assert_eq!(url_path_join(&["", "login"]), "login");
/// assert_eq!(url_path_join(&["/hub", "static/"]), "/hub/static/");
/// ```
pub fn url_path_join<S: AsRef<str>>(pieces: &[S]) -> String {
    let (Some(first), Some(last)) = (pieces.first(), pieces.last()) else {
        return String::new();
    };
    let leading = first.as_ref().starts_with('/');
    let trailing = last.as_ref().ends_with('/');

    let mut result = pieces
        .iter()
        .flat_map(|piece| piece.as_ref().split('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if leading {
        result.insert(0, '/');
    }
    if trailing && !result.ends_with('/') {
        result.push('/');
    }
    result
}

/// `base` + `scope` + `suffix`, joined with [`url_path_join`]
#[inline]
pub fn join(base: &str, scope: &str, suffix: &str) -> String {
    url_path_join(&[base, scope, suffix])
}

/// Append `/` unless the path already ends with one. Idempotent.
pub fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// The empty scope is the default one: it owns the application root.
#[inline]
pub fn is_default_scope(scope: &str) -> bool {
    scope.is_empty()
}
