mod support;

use std::sync::atomic::Ordering;

use kdl_edit::{
    reload, AccessError, CommandStatus, ConfigCommands, ConfigStore, Dispatcher, Editable,
    FeedbackKind, FeedbackLog, PermissionSet,
};
use proptest::prelude::*;
use support::{counting_save, Audio, Settings, Simple};

#[test]
fn reload_copies_values_in_place() {
    support::init_tracing();
    let mut live = Settings::default();
    let display_before: *const _ = &live.display;
    let theme_before: *const _ = &live.display.theme;

    let mut fresh = Settings::default();
    fresh.enabled = false;
    fresh.version = 99;
    fresh.tags = vec!["beta".to_string()];
    fresh.display.brightness = 10;
    fresh.display.theme.accent = "red".to_string();

    let report = reload(&mut live, &fresh);
    assert!(report.is_clean());

    assert!(!live.enabled);
    assert_eq!(live.tags, ["beta"]);
    assert_eq!(live.display.brightness, 10);
    assert_eq!(live.display.theme.accent, "red");
    assert_eq!(live.version, 3, "read-only fields keep their value");
    assert!(std::ptr::eq(display_before, &live.display));
    assert!(std::ptr::eq(theme_before, &live.display.theme));
    assert!(report.copied.contains(&"display.theme.accent".to_string()));
    assert!(!report.copied.contains(&"version".to_string()));
}

#[test]
fn mismatched_types_are_skipped() {
    support::init_tracing();
    let mut live = Simple::default();
    let fresh = Audio { volume: 1 };
    let report = reload(&mut live, &fresh);
    assert!(report.copied.is_empty());
    assert!(matches!(
        report.skipped.as_slice(),
        [(_, AccessError::TypeMismatch { .. })]
    ));
    assert_eq!(live, Simple::default());
}

#[test]
fn reload_command_refreshes_the_store_and_saves() {
    let store = ConfigStore::new(Simple::default());
    let (save, saves) = counting_save();
    let commands = ConfigCommands::new().save_hook(save).reload_with(|| {
        let mut fresh = Simple::default();
        fresh.audio.volume = 42;
        Ok(Box::new(fresh) as Box<dyn Editable>)
    });
    let root = commands.build_root("demo", &store).unwrap();
    assert_eq!(
        root.find(&["config", "reload"]).unwrap().permission(),
        Some("demo.config.reload")
    );

    let mut dispatcher = Dispatcher::new();
    dispatcher.register(root).unwrap();
    let log = FeedbackLog::new();

    // The edit tree built before the reload still reaches the same objects.
    dispatcher
        .execute("demo config edit audio volume 7", &PermissionSet::operator(), &log)
        .unwrap();
    let status = dispatcher
        .execute("demo config reload", &PermissionSet::operator(), &log)
        .unwrap();
    assert_eq!(status, CommandStatus::Success);
    assert_eq!(store.with_typed(|s: &Simple| s.audio.volume), Some(42));
    assert_eq!(
        log.last(),
        Some((FeedbackKind::Success, "Reloaded the configuration.".to_string()))
    );

    dispatcher
        .execute("demo config edit audio volume 8", &PermissionSet::operator(), &log)
        .unwrap();
    assert_eq!(store.with_typed(|s: &Simple| s.audio.volume), Some(8));
    assert_eq!(saves.load(Ordering::SeqCst), 3);
}

#[test]
fn failed_reload_leaves_the_store_alone() {
    support::init_tracing();
    let store = ConfigStore::new(Simple::default());
    let commands = ConfigCommands::new()
        .reload_with(|| Err(kdl_edit::PersistError::Parse("unexpected `}`".to_string())));
    let mut dispatcher = Dispatcher::new();
    dispatcher.register(commands.build_root("demo", &store).unwrap()).unwrap();
    let log = FeedbackLog::new();

    let status = dispatcher
        .execute("demo config reload", &PermissionSet::operator(), &log)
        .unwrap();
    assert_eq!(status, CommandStatus::Failure);
    assert_eq!(log.last().unwrap().0, FeedbackKind::Failure);
    assert_eq!(store.with_typed(|s: &Simple| s.clone()), Some(Simple::default()));
}

#[test]
fn no_reload_command_without_a_supplier() {
    let store = ConfigStore::new(Simple::default());
    let root = ConfigCommands::new().build_root("demo", &store).unwrap();
    assert!(root.find(&["config", "reload"]).is_none());
}

proptest! {
    #[test]
    fn reload_makes_live_equal_fresh(
        enabled in any::<bool>(),
        threshold in -1.0e6f32..1.0e6,
        volume in any::<i32>(),
    ) {
        let mut live = Simple::default();
        let fresh = Simple { enabled, threshold, audio: Audio { volume } };
        let report = reload(&mut live, &fresh);
        prop_assert!(report.is_clean());
        prop_assert_eq!(live, fresh);
    }
}
