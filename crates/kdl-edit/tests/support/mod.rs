#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kdl_edit::{Editable, SaveHook};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Editable)]
pub struct Simple {
    pub enabled: bool,
    pub threshold: f32,
    pub audio: Audio,
}

#[derive(Debug, Clone, PartialEq, Editable)]
pub struct Audio {
    pub volume: i32,
}

impl Default for Simple {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 1.5,
            audio: Audio { volume: 10 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Editable)]
#[edit(name = "Settings")]
pub struct Settings {
    #[edit(description = "Master switch", default = true)]
    pub enabled: bool,
    #[edit(readonly)]
    pub version: i32,
    pub ratio: f64,
    pub title: String,
    pub tags: Vec<String>,
    #[edit(exclude)]
    pub secret: String,
    #[serde(skip)]
    #[edit(skip)]
    pub cache: Vec<u8>,
    pub _comment_ratio0: String,
    pub _comment_ratio1: String,
    #[serde(rename = "// Shown in the title bar")]
    pub _comment_title0: String,
    pub display: Display,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Editable)]
pub struct Display {
    #[edit(desc = "Screen brightness", default = 80)]
    pub brightness: i32,
    pub tags: Vec<String>,
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Editable)]
pub struct Theme {
    #[edit(comment = "Use the dark palette", comment = "Applies on restart")]
    pub dark: bool,
    pub accent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            version: 3,
            ratio: 0.5,
            title: "Untitled".to_string(),
            tags: vec!["alpha".to_string()],
            secret: "hunter2".to_string(),
            cache: Vec::new(),
            _comment_ratio0: "How much to mix in".to_string(),
            _comment_ratio1: "Between 0 and 1".to_string(),
            _comment_title0: String::new(),
            display: Display::default(),
        }
    }
}

impl Default for Display {
    fn default() -> Self {
        Self {
            brightness: 80,
            tags: Vec::new(),
            theme: Theme {
                dark: false,
                accent: "blue".to_string(),
            },
        }
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A save hook counting its calls.
pub fn counting_save() -> (SaveHook, Arc<AtomicUsize>) {
    let saves = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&saves);
    let hook = SaveHook::new(move |_config: &dyn Editable| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    (hook, saves)
}

pub fn temp_path(name: &str) -> PathBuf {
    use std::time::{SystemTime, UNIX_EPOCH};

    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let mut path = std::env::temp_dir();
    path.push(format!("kdl_edit_{}_{}_{}", std::process::id(), name, stamp));
    path.push("settings.kdl");
    path
}
