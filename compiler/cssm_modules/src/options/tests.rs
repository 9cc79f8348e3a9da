#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_scope_mode_round_trips_through_text() {
    for mode in [ScopeMode::Local, ScopeMode::Global, ScopeMode::Pure] {
        assert_eq!(mode.to_string().parse::<ScopeMode>().unwrap(), mode);
    }
    assert_eq!(
        "Local".parse::<ScopeMode>().unwrap_err(),
        UnknownScopeMode("Local".to_owned())
    );
}

#[test]
fn test_default_generator_is_path_scoped() {
    let generator = ProcessorOptions::default().build_generator();
    assert_eq!(generator.generate("btn", "/ui/button.css", ""), "_ui_button__btn");
}

#[test]
fn test_template_gets_hash_prefix_and_context() {
    let options = ProcessorOptions::default()
        .with_generator(Naming::Template("[path][name]_[local]".to_owned()))
        .with_context("/repo");
    let generator = options.build_generator();
    assert_eq!(generator.generate("a", "/repo/src/card.css", ""), "src_card_a");

    let plain = ProcessorOptions::default()
        .with_generator(Naming::Template("[hash:8]".to_owned()))
        .build_generator();
    let salted = ProcessorOptions::default()
        .with_generator(Naming::Template("[hash:8]".to_owned()))
        .with_hash_prefix("v2")
        .build_generator();
    assert_ne!(plain.generate("a", "/x.css", ""), salted.generate("a", "/x.css", ""));
}

#[test]
fn test_custom_generator_is_shared() {
    let shared: Arc<dyn ScopedNameGenerator> = Arc::new(PathScoped);
    let options = ProcessorOptions::default().with_generator(Naming::Custom(Arc::clone(&shared)));
    assert!(Arc::ptr_eq(&options.build_generator(), &shared));
}
