#![allow(dead_code)]

pub use phpunit_relay_test_utils::builders;
pub use phpunit_relay_test_utils::{init_tracing, with_timeout};

use phpunit_relay::paths::{PathReplacer, PathVariables};
use phpunit_relay::types::PathStyle;

/// POSIX replacer for a project at `/home/u/proj` mapped to `/app`.
pub fn app_replacer() -> PathReplacer {
    let variables = PathVariables::new("/home/u/proj", "/home/u/proj", "/home/u", PathStyle::Posix);
    PathReplacer::new(variables, [("${workspaceFolder}", "/app")])
}

pub fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}
