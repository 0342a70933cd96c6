//! Mode-conditional replacement of the dev-only routing module.
//!
//! Static builds must not ship development route wiring, so the module
//! that registers it is swapped for a function with the same parameters
//! that does nothing. Development builds never have their modules altered.

use crate::models::BuildMode;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Replacement body for the dev-routing module.
///
/// Parameters mirror the real registration function: routes, menus and the
/// login, layout and home views.
pub const ROUTE_MODULE_STUB: &str =
    "export default function(routes, menus, loginView, layoutView, homeView){}";

/// Content override returned by a transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    pub code: String,
}

/// Module-transform hook keyed on an explicit build mode.
#[derive(Debug, Clone)]
pub struct RouteTransform {
    mode: BuildMode,
    /// Path suffix of the dev-routing module, `/`-separated.
    module: String,
}

impl RouteTransform {
    pub fn new(mode: BuildMode, module: impl Into<String>) -> Self {
        let module: String = module.into();
        Self {
            mode,
            module: module.replace('\\', "/").trim_start_matches('/').to_string(),
        }
    }

    /// Transform one module.
    ///
    /// Returns `None` when the module should pass through unchanged.
    pub fn transform(&self, _code: &str, id: &str) -> Option<TransformOutput> {
        match self.mode {
            BuildMode::Development => None,
            BuildMode::Production => {
                if self.matches(id) {
                    debug!("Stubbing dev-routing module {}", id);
                    Some(TransformOutput {
                        code: ROUTE_MODULE_STUB.to_string(),
                    })
                } else {
                    None
                }
            }
        }
    }

    /// Whether a module identifier names the dev-routing module.
    ///
    /// Query suffixes are ignored and the match must start on a path
    /// segment, so `src/router/development.js` does not match
    /// `src/router/not-development.js`.
    pub fn matches(&self, id: &str) -> bool {
        if self.module.is_empty() {
            return false;
        }

        let path = module_path(id);

        match path.strip_suffix(self.module.as_str()) {
            Some(prefix) => prefix.is_empty() || prefix.ends_with('/'),
            None => false,
        }
    }
}

/// File path part of a module identifier: the `?query` suffix is dropped
/// and separators are normalized to `/`.
pub fn module_path(id: &str) -> String {
    id.split('?').next().unwrap_or(id).replace('\\', "/")
}

/// File holding a module's source, resolved against `root` when relative.
pub fn module_file(root: &Path, id: &str) -> PathBuf {
    root.join(module_path(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODULE: &str = "src/router/development.js";
    const ID: &str = "/work/hiui/htdoc/src/router/development.js";

    /// Parameter names of the stub's exported function.
    fn stub_params(code: &str) -> Vec<String> {
        let open = code.find('(').unwrap();
        let close = code.find(')').unwrap();
        code[open + 1..close]
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    }

    #[test]
    fn test_production_stubs_dev_routes() {
        let transform = RouteTransform::new(BuildMode::Production, MODULE);
        let output = transform.transform("export default function register() {}", ID);

        let output = output.expect("dev-routing module should be replaced");
        assert_eq!(output.code, ROUTE_MODULE_STUB);
    }

    #[test]
    fn test_stub_matches_registration_arity() {
        let params = stub_params(ROUTE_MODULE_STUB);
        assert_eq!(
            params,
            vec!["routes", "menus", "loginView", "layoutView", "homeView"]
        );
        assert!(ROUTE_MODULE_STUB.starts_with("export default function"));
        // Empty body: no registration, no return value.
        assert!(ROUTE_MODULE_STUB.ends_with("{}"));
    }

    #[test]
    fn test_development_passes_through() {
        let transform = RouteTransform::new(BuildMode::Development, MODULE);
        assert!(transform.transform("code", ID).is_none());
        assert!(transform.matches(ID));
    }

    #[test]
    fn test_other_modules_untouched() {
        let transform = RouteTransform::new(BuildMode::Production, MODULE);
        assert!(transform
            .transform("code", "/work/hiui/htdoc/src/router/index.js")
            .is_none());
        assert!(transform
            .transform("code", "/work/hiui/htdoc/src/router/not-development.js")
            .is_none());
        assert!(transform
            .transform("code", "/work/hiui/htdoc/src/router/development.json")
            .is_none());
    }

    #[test]
    fn test_matches_query_and_windows_ids() {
        let transform = RouteTransform::new(BuildMode::Production, MODULE);
        assert!(transform.matches("/work/htdoc/src/router/development.js?v=123"));
        assert!(transform.matches("C:\\work\\htdoc\\src\\router\\development.js"));
        assert!(transform.matches("src/router/development.js"));
    }

    #[test]
    fn test_module_path_drops_query() {
        assert_eq!(
            module_path("/work/htdoc/src/App.vue?vue&type=style&index=0"),
            "/work/htdoc/src/App.vue"
        );
        assert_eq!(module_path("src\\router\\index.js"), "src/router/index.js");
        assert_eq!(module_path("src/main.js"), "src/main.js");
    }

    #[test]
    fn test_query_suffixed_module_passes_through_to_its_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src").join("App.vue"), "<template/>").unwrap();

        let id = "src/App.vue?vue&type=style&index=0";
        let transform = RouteTransform::new(BuildMode::Production, MODULE);
        assert!(transform.transform("", id).is_none());

        let file = module_file(dir.path(), id);
        assert_eq!(std::fs::read_to_string(file).unwrap(), "<template/>");

        // Absolute identifiers ignore the root.
        let absolute = format!("{}?import", dir.path().join("src").join("App.vue").display());
        assert_eq!(
            module_file(Path::new("/elsewhere"), &absolute),
            dir.path().join("src").join("App.vue")
        );
    }

    #[test]
    fn test_empty_module_matches_nothing() {
        let transform = RouteTransform::new(BuildMode::Production, "");
        assert!(!transform.matches(ID));
    }
}
