use std::fmt;

use crate::path::ObjectPath;

/// A field could not be read or written through its generated accessors.
///
/// These failures are always local: classification, reload and loading skip
/// the offending field and keep going.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AccessError {
    #[error("{type_name} has no field `{field}`")]
    UnknownField {
        type_name: &'static str,
        field: String,
    },
    #[error("field `{field}` of {type_name} is read-only")]
    ReadOnly {
        type_name: &'static str,
        field: String,
    },
    #[error("field `{field}` of {type_name} expects {expected}, got {actual}")]
    WrongKind {
        type_name: &'static str,
        field: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("field `{field}` of {type_name} is a nested object, not a value")]
    NotScalar {
        type_name: &'static str,
        field: String,
    },
    #[error("field `{field}` of {type_name} is not a nested object")]
    NotNested {
        type_name: &'static str,
        field: String,
    },
    #[error("could not convert field `{field}` of {type_name}: {message}")]
    Convert {
        type_name: &'static str,
        field: String,
        message: String,
    },
    #[error("object path `{path}` does not resolve")]
    UnresolvedPath { path: String },
    #[error("cannot copy {actual} into {expected}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

impl AccessError {
    pub fn unknown_field(type_name: &'static str, field: &str) -> Self {
        Self::UnknownField {
            type_name,
            field: field.to_string(),
        }
    }

    pub fn read_only(type_name: &'static str, field: &str) -> Self {
        Self::ReadOnly {
            type_name,
            field: field.to_string(),
        }
    }

    pub fn wrong_kind(
        type_name: &'static str,
        field: &str,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::WrongKind {
            type_name,
            field: field.to_string(),
            expected,
            actual,
        }
    }

    pub fn not_scalar(type_name: &'static str, field: &str) -> Self {
        Self::NotScalar {
            type_name,
            field: field.to_string(),
        }
    }

    pub fn not_nested(type_name: &'static str, field: &str) -> Self {
        Self::NotNested {
            type_name,
            field: field.to_string(),
        }
    }

    pub fn convert(type_name: &'static str, field: &str, err: impl fmt::Display) -> Self {
        Self::Convert {
            type_name,
            field: field.to_string(),
            message: err.to_string(),
        }
    }

    pub fn unresolved(path: &ObjectPath) -> Self {
        Self::UnresolvedPath {
            path: path.to_string(),
        }
    }
}

/// An edit requested through the command surface failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("`{option}` expects {expected}, got {actual}")]
    TypeMismatch {
        option: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("`{option}` is not editable")]
    NotEditable { option: String },
    #[error(transparent)]
    Access(#[from] AccessError),
}

/// Loading or saving a configuration file failed.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("expected a single `{expected}` node, found {found}")]
    Shape { expected: String, found: String },
    #[error("{0}")]
    Custom(String),
}

impl From<kdl::KdlError> for PersistError {
    fn from(err: kdl::KdlError) -> Self {
        PersistError::Parse(err.to_string())
    }
}

/// A command tree could not be assembled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("`{parent}` already has a child named `{name}`")]
    DuplicateChild { parent: String, name: String },
}

/// Input could not be dispatched to a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown command: `{input}`")]
    UnknownCommand { input: String },
    #[error("missing permission for `{path}`")]
    PermissionDenied { path: String },
    #[error("`{path}` needs more input")]
    Incomplete { path: String },
    #[error("invalid argument for `{path}`: {message}")]
    InvalidArgument { path: String, message: String },
}
