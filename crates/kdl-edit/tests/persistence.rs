mod support;

use std::fs;
use std::sync::Arc;

use kdl_edit::{
    fresh_instance, load_or_default, ConfigCommands, ConfigStore, Dispatcher, Editable,
    FeedbackLog, KdlConfigFile, PermissionSet, PersistError, Persistence, SaveHook,
};
use support::{temp_path, Settings, Simple};

#[test]
fn rendered_documents_carry_descriptions_as_comments() {
    let file = KdlConfigFile::new("unused.kdl");
    let text = file.render(&Settings::default());
    assert!(text.starts_with("config {\n"), "{text}");
    assert!(text.contains("    // Master switch\n    enabled #true\n"), "{text}");
    assert!(text.contains("    // How much to mix in\n    // Between 0 and 1\n    ratio 0.5\n"));
    assert!(text.contains("    tags \"alpha\"\n"), "{text}");
    assert!(text.contains("    display {\n        // Screen brightness\n        brightness 80\n"));
    assert!(text.contains("            accent \"blue\"\n"), "{text}");
    assert!(!text.contains("_comment_"), "{text}");
    assert!(!text.contains("cache"), "{text}");
}

#[test]
fn documents_apply_onto_defaults() {
    support::init_tracing();
    let file = KdlConfigFile::new("unused.kdl");
    let mut settings = Settings::default();
    let report = file
        .apply_str(
            r#"
            config {
                enabled #false
                version 12
                ratio 2
                tags "x" "y"
                display {
                    tags
                    theme {
                        dark #true
                    }
                }
                unknown 1
            }
            "#,
            &mut settings,
        )
        .unwrap();

    assert!(!settings.enabled);
    assert_eq!(settings.version, 3, "read-only values are never loaded");
    assert_eq!(settings.ratio, 2.0);
    assert_eq!(settings.tags, ["x", "y"]);
    assert!(settings.display.tags.is_empty());
    assert!(settings.display.theme.dark);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].path, "unknown");
}

#[test]
fn values_that_do_not_fit_are_reported() {
    support::init_tracing();
    let file = KdlConfigFile::new("unused.kdl");
    let mut simple = Simple::default();
    let report = file
        .apply_str(
            "config {\n    enabled 1\n    audio {\n        volume 9999999999\n    }\n}\n",
            &mut simple,
        )
        .unwrap();
    assert_eq!(simple, Simple::default());
    let paths: Vec<&str> = report.issues.iter().map(|i| i.path.as_str()).collect();
    assert_eq!(paths, ["enabled", "audio.volume"]);
}

#[test]
fn wrong_root_is_a_shape_error() {
    let file = KdlConfigFile::new("unused.kdl");
    let err = file
        .apply_str("settings {\n}\n", &mut Simple::default())
        .unwrap_err();
    assert!(matches!(err, PersistError::Shape { .. }));
    let err = file.apply_str("config {", &mut Simple::default()).unwrap_err();
    assert!(matches!(err, PersistError::Parse(_)));
}

#[test]
fn save_then_load_restores_the_config() {
    let path = temp_path("roundtrip");
    let file = KdlConfigFile::new(&path);

    let mut edited = Settings::default();
    edited.enabled = false;
    edited.title = "Quoted \"name\"".to_string();
    edited.tags = vec!["one".to_string(), "two words".to_string()];
    edited.display.theme.accent = "green".to_string();
    file.save(&edited).unwrap();

    let loaded: Settings = fresh_instance(&file).unwrap();
    assert_eq!(loaded, edited);
    fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[test]
fn missing_files_are_created_with_defaults() {
    let path = temp_path("missing");
    let file = KdlConfigFile::new(&path).with_root_name("simple");
    assert!(file.load_into(&mut Simple::default()).unwrap().is_none());

    let loaded: Simple = load_or_default(&file);
    assert_eq!(loaded, Simple::default());
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("simple {"), "{written}");
    fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[test]
fn unreadable_files_fall_back_to_defaults() {
    support::init_tracing();
    let path = temp_path("broken");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "config { enabled").unwrap();
    let file = KdlConfigFile::new(&path);

    assert!(fresh_instance::<Simple>(&file).is_err());
    let loaded: Simple = load_or_default(&file);
    assert_eq!(loaded, Simple::default());
    fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[test]
fn edits_and_reloads_go_through_the_file() {
    let path = temp_path("commands");
    let file = Arc::new(KdlConfigFile::new(&path));
    let store = ConfigStore::new(load_or_default::<Simple>(&file));

    let reload_file = Arc::clone(&file);
    let commands = ConfigCommands::new()
        .save_hook(SaveHook::persist_with(Arc::clone(&file)))
        .reload_with(move || {
            fresh_instance::<Simple>(&*reload_file).map(|c| Box::new(c) as Box<dyn Editable>)
        });
    let mut dispatcher = Dispatcher::new();
    dispatcher.register(commands.build_root("demo", &store).unwrap()).unwrap();
    let log = FeedbackLog::new();
    let operator = PermissionSet::operator();

    dispatcher
        .execute("demo config edit audio volume 4", &operator, &log)
        .unwrap();
    assert!(fs::read_to_string(&path).unwrap().contains("volume 4"));

    fs::write(&path, "config {\n    enabled #false\n}\n").unwrap();
    dispatcher.execute("demo config reload", &operator, &log).unwrap();
    assert_eq!(
        store.with_typed(|s: &Simple| (s.enabled, s.audio.volume)),
        Some((false, 10))
    );
    fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[derive(Debug, Clone, PartialEq, Default, Editable)]
struct Shapes {
    aliases: Option<Vec<String>>,
    pair: [i32; 1],
    point: (i32, i32),
    names: Vec<String>,
}

#[test]
fn non_sequence_arrays_survive_save_and_load() {
    support::init_tracing();
    let path = temp_path("shapes");
    let file = KdlConfigFile::new(&path);

    let edited = Shapes {
        aliases: Some(vec!["a".to_string()]),
        pair: [7],
        point: (1, 2),
        names: vec!["solo".to_string()],
    };
    let text = file.render(&edited);
    assert!(text.contains(r#"    aliases json="[\"a\"]""#), "{text}");
    assert!(text.contains(r#"    pair json="[7]""#), "{text}");
    assert!(text.contains("    names \"solo\"\n"), "{text}");

    file.save(&edited).unwrap();
    let mut loaded = Shapes::default();
    let report = file.load_into(&mut loaded).unwrap().unwrap();
    assert!(report.issues.is_empty(), "{:?}", report.issues);
    assert_eq!(loaded, edited);

    let cleared = Shapes { aliases: None, ..edited };
    file.save(&cleared).unwrap();
    let loaded: Shapes = fresh_instance(&file).unwrap();
    assert_eq!(loaded, cleared);
    fs::remove_dir_all(path.parent().unwrap()).ok();
}
