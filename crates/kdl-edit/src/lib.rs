//! Turn configuration structs into hierarchical, permission-gated command
//! trees whose leaves edit individual fields.
//!
//! ```ignore
//! #[derive(Default, Editable)]
//! struct Settings {
//!     #[edit(description = "Master switch")]
//!     enabled: bool,
//!     audio: Audio,
//! }
//!
//! let store = ConfigStore::new(Settings::default());
//! let root = ConfigCommands::new()
//!     .save_hook(SaveHook::persist_with(Arc::new(KdlConfigFile::new("settings.kdl"))))
//!     .build_root("mymod", &store)?;
//! ```

extern crate self as kdl_edit;

pub mod build;
pub mod classify;
pub mod describe;
pub mod descriptor;
pub mod dispatch;
pub mod editor;
pub mod error;
pub mod messages;
pub mod object;
pub mod path;
pub mod permission;
pub mod persist;
pub mod reload;
pub mod render;
pub mod store;
pub mod tree;
pub mod value;

pub use build::{argument_type, attach_config_commands, CommandTreeBuilder, ConfigCommands};
pub use classify::{classify, classify_node, ClassifyOptions, ConfigNode, DEFAULT_COMMENT_PREFIX};
pub use describe::{Describer, DescriptionResolver};
pub use descriptor::FieldDescriptor;
pub use dispatch::Dispatcher;
pub use editor::{AppliedEdit, FieldEditor, SaveHook};
pub use error::{AccessError, DispatchError, EditError, PersistError, TreeError};
pub use messages::MessageCatalog;
pub use object::Editable;
pub use path::ObjectPath;
pub use permission::PermissionPath;
pub use persist::{
    fresh_instance, load_or_default, KdlConfigFile, LoadIssue, LoadReport, Persistence,
};
pub use reload::{reload, ReloadReport};
pub use store::ConfigStore;
pub use tree::{
    ArgValue, ArgumentType, Binding, CommandContext, CommandNode, CommandSource, CommandStatus,
    Feedback, FeedbackKind, FeedbackLog, PermissionSet, Requirement,
};
pub use value::{FieldKind, FieldValue};

pub use kdl_edit_derive::Editable;

