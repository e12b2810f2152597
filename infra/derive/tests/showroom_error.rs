#[test]
fn showroom_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/showroom_error_pass.rs");
}
