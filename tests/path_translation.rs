// tests/path_translation.rs

mod common;
use crate::common::{app_replacer, init_tracing};

use proptest::prelude::*;

use phpunit_relay::paths::{PathReplacer, PathVariables};
use phpunit_relay::types::PathStyle;

fn windows_variables() -> PathVariables {
    PathVariables::new(r"C:\work\proj", r"C:\work\proj", r"C:\Users\u", PathStyle::Windows)
}

#[test]
fn maps_workspace_folder_both_ways() {
    init_tracing();
    let replacer = app_replacer();

    assert_eq!(replacer.to_remote("/home/u/proj/tests/T.php"), "/app/tests/T.php");
    assert_eq!(replacer.to_local("/app/tests/T.php"), "/home/u/proj/tests/T.php");
}

#[test]
fn unmapped_paths_pass_through() {
    init_tracing();
    let replacer = app_replacer();

    assert_eq!(replacer.to_remote("/opt/other/T.php"), "/opt/other/T.php");
    assert_eq!(replacer.to_local("/usr/share/php/Foo.php"), "/usr/share/php/Foo.php");
}

#[test]
fn prefix_must_end_on_a_component_boundary() {
    init_tracing();
    let replacer = app_replacer();

    assert_eq!(
        replacer.to_remote("/home/u/project-two/T.php"),
        "/home/u/project-two/T.php"
    );
    assert_eq!(replacer.to_local("/application/T.php"), "/application/T.php");
}

#[test]
fn longest_mapping_wins() {
    init_tracing();
    let variables = PathVariables::new("/home/u/proj", "/home/u/proj", "/home/u", PathStyle::Posix);
    let replacer = PathReplacer::new(
        variables,
        [
            ("/home/u/proj", "/app"),
            ("/home/u/proj/vendor", "/opt/vendor"),
        ],
    );

    assert_eq!(
        replacer.to_remote("/home/u/proj/vendor/bin/phpunit"),
        "/opt/vendor/bin/phpunit"
    );
    assert_eq!(replacer.to_remote("/home/u/proj/src/A.php"), "/app/src/A.php");
    assert_eq!(
        replacer.to_local("/opt/vendor/bin/phpunit"),
        "/home/u/proj/vendor/bin/phpunit"
    );
}

#[test]
fn dot_prefix_resolves_against_workspace_root() {
    init_tracing();
    let replacer = app_replacer();

    assert_eq!(replacer.to_remote("./tests/T.php"), "/app/tests/T.php");
    assert_eq!(replacer.to_local("./tests/T.php"), "/home/u/proj/tests/T.php");
}

#[test]
fn location_scheme_is_kept_around_translation() {
    init_tracing();
    let replacer = app_replacer();

    assert_eq!(
        replacer.to_local(r"php_qn:///app/tests/T.php::\NS\T::test_a"),
        r"php_qn:///home/u/proj/tests/T.php::\NS\T::test_a"
    );
    assert_eq!(
        replacer.to_local("pest_qn:///app/tests/Feature/A.php::it works"),
        "pest_qn:///home/u/proj/tests/Feature/A.php::it works"
    );
}

#[test]
fn composer_wrapper_is_stripped() {
    init_tracing();
    let replacer = app_replacer();

    assert_eq!(
        replacer.to_local("phpvfscomposer:///app/vendor/phpunit/phpunit/phpunit"),
        "/home/u/proj/vendor/phpunit/phpunit/phpunit"
    );
    assert_eq!(
        replacer.to_local("PHPVFSCOMPOSER:///app/vendor/bin/phpunit"),
        "/home/u/proj/vendor/bin/phpunit"
    );
}

#[test]
fn mappings_that_match_everything_are_ignored() {
    init_tracing();
    let variables = PathVariables::new("/home/u/proj", "/home/u/proj", "/home/u", PathStyle::Posix);
    let replacer = PathReplacer::new(variables, [("/", "/app"), ("/home/u/proj", " "), ("", "/x")]);

    assert!(!replacer.has_mappings());
    assert_eq!(replacer.to_remote("/home/u/proj/T.php"), "/home/u/proj/T.php");
}

#[test]
fn home_variable_expands_in_mappings() {
    init_tracing();
    let variables = PathVariables::new("/home/u/proj", "/home/u/proj", "/home/u", PathStyle::Posix);
    let replacer = PathReplacer::new(variables, [("${userHome}/shared", "/shared")]);

    assert_eq!(replacer.to_remote("/home/u/shared/T.php"), "/shared/T.php");
    assert_eq!(replacer.to_local("/shared/T.php"), "/home/u/shared/T.php");
}

#[test]
fn windows_paths_translate_to_posix_and_back() {
    init_tracing();
    let replacer = PathReplacer::new(windows_variables(), [("${workspaceFolder}", "/app")]);

    assert_eq!(replacer.to_remote(r"C:\work\proj\tests\T.php"), "/app/tests/T.php");
    assert_eq!(replacer.to_remote(r"c:\WORK\proj\tests\T.php"), "/app/tests/T.php");
    assert_eq!(replacer.to_local("/app/tests/T.php"), r"C:\work\proj\tests\T.php");
}

#[test]
fn unmapped_windows_paths_keep_backslashes() {
    init_tracing();
    let replacer = PathReplacer::identity(windows_variables());

    assert_eq!(replacer.to_remote(r"D:\other\T.php"), r"D:\other\T.php");
}

#[test]
fn driveless_windows_root_gets_a_drive() {
    let variables = PathVariables::new(r"\work\proj", r"\work\proj", r"\Users\u", PathStyle::Windows);
    assert_eq!(variables.cwd(), r"C:\work\proj");
    assert_eq!(variables.workspace_basename(), "proj");

    let unc = PathVariables::new(r"\\server\share", r"\\server\share", "", PathStyle::Windows);
    assert_eq!(unc.cwd(), r"\\server\share");
}

#[test]
fn substitution_is_global_and_idempotent() {
    let variables = PathVariables::new("/home/u/proj", "/home/u/proj", "/home/u", PathStyle::Posix);
    let once = variables.substitute("${workspaceFolder}:${workspaceFolder}${pathSeparator}${workspaceFolderBasename}");

    assert_eq!(once, "/home/u/proj:/home/u/proj/proj");
    assert_eq!(variables.substitute(&once), once);
}

proptest! {
    #[test]
    fn remote_then_local_round_trips(
        segments in proptest::collection::vec("[A-Za-z0-9_.-]{1,12}", 1..6)
    ) {
        let replacer = app_replacer();
        let local = format!("/home/u/proj/{}", segments.join("/"));

        let remote = replacer.to_remote(&local);
        prop_assert!(remote.starts_with("/app/"));
        prop_assert_eq!(replacer.to_local(&remote), local);
    }

    #[test]
    fn windows_round_trip_normalizes_separators(
        segments in proptest::collection::vec("[A-Za-z0-9_]{1,12}", 1..6)
    ) {
        let replacer = PathReplacer::new(windows_variables(), [("${workspaceFolder}", "/app")]);
        let local = format!(r"C:\work\proj\{}", segments.join(r"\"));

        let remote = replacer.to_remote(&local);
        prop_assert!(!remote.contains('\\'));
        prop_assert_eq!(replacer.to_local(&remote), local);
    }

    #[test]
    fn substitution_twice_equals_once(input in "[a-z/${}A-Z]{0,40}") {
        let variables = PathVariables::new("/home/u/proj", "/home/u/proj", "/home/u", PathStyle::Posix);
        let once = variables.substitute(&input);
        prop_assert_eq!(variables.substitute(&once), once.clone());
    }
}
