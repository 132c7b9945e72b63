mod integration_tests;

pub(super) fn require_virtuoso() -> bool {
    if std::env::var("RUN_VIRTUOSO_TESTS").ok().as_deref() == Some("1") {
        true
    } else {
        eprintln!("Skipping Virtuoso tests (set RUN_VIRTUOSO_TESTS=1)");
        false
    }
}
