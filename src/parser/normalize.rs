use std::sync::LazyLock;

use regex::Regex;

static BRACE_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{[^}]*\}\}").unwrap());
static COLON_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":[^/]+").unwrap());

/// Canonical marker every path parameter collapses to.
pub const PARAM: &str = "{param}";

/// Base-URL tokens and literal host prefixes removed before matching.
/// The localhost prefix must come before the bare `/api/v1`.
const BASE_PREFIXES: &[&str] = &[
    "{{baseUrl}}",
    "{{localUrl}}",
    "{{stagingUrl}}",
    "http://localhost:8787/api/v1",
    "/api/v1",
];

/// Reduce a raw collection URL or documented path to a comparable shape:
/// `{{baseUrl}}/api/v1/users/{{userId}}` and `/users/:id` both become
/// `/users/{param}`.
pub fn normalize_path(raw: &str) -> String {
    let path = strip_base_prefixes(with_leading_slash(raw));

    let path = BRACE_PARAM_RE.replace_all(&path, PARAM);
    let path = COLON_PARAM_RE.replace_all(&path, PARAM);

    with_leading_slash(&path)
}

fn with_leading_slash(path: &str) -> String {
    format!("/{}", path.trim().trim_start_matches('/'))
        .trim()
        .to_string()
}

/// Removing one prefix can splice together another (`/api/v/api/v11`), so
/// strip until nothing changes.
fn strip_base_prefixes(mut path: String) -> String {
    loop {
        let before = path.len();
        for prefix in BASE_PREFIXES {
            path = path.replace(prefix, "");
        }
        if path.len() == before {
            return with_leading_slash(&path);
        }
        path = with_leading_slash(&path);
    }
}

/// Lookup key shared by the docs table and the report assembler.
pub fn endpoint_key(method: &str, normalized: &str) -> String {
    format!("{} {}", method, normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_base_url_and_version() {
        assert_eq!(
            normalize_path("{{baseUrl}}/api/v1/patients/{{patientId}}/notes"),
            "/patients/{param}/notes"
        );
    }

    #[test]
    fn colon_and_brace_params_match() {
        assert_eq!(
            normalize_path("/patients/:patientId/notes"),
            normalize_path("{{baseUrl}}/patients/{{patientId}}/notes")
        );
    }

    #[test]
    fn localhost_prefix() {
        assert_eq!(
            normalize_path("http://localhost:8787/api/v1/users/:id"),
            "/users/{param}"
        );
    }

    #[test]
    fn staging_and_local_tokens() {
        assert_eq!(normalize_path("{{stagingUrl}}/health"), "/health");
        assert_eq!(normalize_path("{{localUrl}}/health"), "/health");
    }

    #[test]
    fn inserts_leading_slash() {
        assert_eq!(normalize_path("users/{{id}}"), "/users/{param}");
        assert_eq!(normalize_path("{{baseUrl}}users"), "/users");
    }

    #[test]
    fn spliced_prefixes_are_stripped() {
        assert_eq!(normalize_path("/api/v/api/v11/users"), "/users");
        assert_eq!(normalize_path("{{base{{baseUrl}}Url}}/x"), "/x");
    }

    #[test]
    fn version_prefix_without_leading_slash() {
        assert_eq!(normalize_path("api/v1/users/:id"), "/users/{param}");
    }

    #[test]
    fn collapses_repeated_leading_slashes() {
        assert_eq!(normalize_path("//users"), "/users");
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(normalize_path("  /users/:id  "), "/users/{param}");
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("{{baseUrl}}"), "/");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn trailing_param_and_consecutive_params() {
        assert_eq!(
            normalize_path("/orgs/:org/repos/:repo"),
            "/orgs/{param}/repos/{param}"
        );
        assert_eq!(normalize_path("/a/{{x}}/{{y}}"), "/a/{param}/{param}");
    }

    #[test]
    fn idempotent() {
        let inputs = [
            "{{baseUrl}}/api/v1/patients/{{patientId}}/notes",
            "/users/:id",
            "users",
            "  //x/:y/z ",
            "http://localhost:8787/api/v1/a/{{b}}/:c",
            "",
            "/api/v/api/v11/users",
            "api/v1/users",
            "{{base{{baseUrl}}Url}}/x",
            "//api/v1//api/v1",
        ];
        for input in inputs {
            let once = normalize_path(input);
            assert_eq!(normalize_path(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn output_shape() {
        let inputs = [
            "{{baseUrl}}/x/{{a}}/:b",
            "relative/:id",
            "///many",
            "{{}}/empty",
            "/api/v1/:v/{{w}}",
        ];
        for input in inputs {
            let out = normalize_path(input);
            assert!(out.starts_with('/'), "{:?}", out);
            assert!(!out.starts_with("//"), "{:?}", out);
            assert!(!out.contains("{{"), "{:?}", out);
            assert!(!COLON_PARAM_RE.is_match(&out), "{:?}", out);
        }
    }

    #[test]
    fn key_format() {
        assert_eq!(endpoint_key("GET", "/users/{param}"), "GET /users/{param}");
    }
}
