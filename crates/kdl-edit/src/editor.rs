use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::descriptor::FieldDescriptor;
use crate::error::{AccessError, EditError, PersistError};
use crate::messages::{self, MessageCatalog};
use crate::object::Editable;
use crate::path::ObjectPath;
use crate::persist::Persistence;
use crate::store::ConfigStore;
use crate::tree::{ArgValue, CommandContext, CommandStatus};
use crate::value::{FieldKind, FieldValue};

type SaveFn = dyn Fn(&dyn Editable) -> Result<(), PersistError> + Send + Sync;

/// Callback run after every successful edit or reload.
#[derive(Clone)]
pub struct SaveHook(Arc<SaveFn>);

impl SaveHook {
    pub fn new<F>(save: F) -> Self
    where
        F: Fn(&dyn Editable) -> Result<(), PersistError> + Send + Sync + 'static,
    {
        Self(Arc::new(save))
    }

    /// Keep edits in memory only.
    pub fn noop() -> Self {
        Self::new(|_| Ok(()))
    }

    pub fn persist_with<P>(persistence: Arc<P>) -> Self
    where
        P: Persistence + Send + Sync + 'static,
    {
        Self::new(move |config| persistence.save(config))
    }

    /// Save the current state of `store`.
    pub fn save(&self, store: &ConfigStore) -> Result<(), PersistError> {
        store.with_root(|root| (self.0)(root))
    }
}

impl Default for SaveHook {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for SaveHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SaveHook")
    }
}

/// A successful edit.
#[derive(Debug)]
pub struct AppliedEdit {
    /// Dotted name of the edited option.
    pub option: String,
    /// Value read back after the assignment.
    pub value: FieldValue,
    /// The edit stuck, but persisting it failed.
    pub save_error: Option<PersistError>,
}

/// Applies one field mutation and reports it.
#[derive(Debug, Clone)]
pub struct FieldEditor {
    store: ConfigStore,
    save: SaveHook,
    catalog: MessageCatalog,
}

impl FieldEditor {
    pub fn new(store: ConfigStore, save: SaveHook, catalog: MessageCatalog) -> Self {
        Self {
            store,
            save,
            catalog,
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Assign `value` to `field` of the object at `path`, then save.
    pub fn edit(
        &self,
        path: &ObjectPath,
        field: &'static FieldDescriptor,
        value: &ArgValue,
    ) -> Result<AppliedEdit, EditError> {
        let option = path.qualify(field.name);
        if field.readonly || field.is_nested() {
            return Err(EditError::NotEditable { option });
        }
        let new_value = field_value_for(field, value).ok_or_else(|| EditError::TypeMismatch {
            option: option.clone(),
            expected: field.kind.label(),
            actual: value.label(),
        })?;

        let verbatim = match (&new_value, value) {
            (FieldValue::Opaque(JsonValue::String(_)), _) => None,
            (FieldValue::Opaque(_), ArgValue::Text(text)) => {
                Some(FieldValue::Opaque(JsonValue::String(text.clone())))
            }
            _ => None,
        };

        let echoed = self
            .store
            .with_object_mut(path, |object| {
                match (object.set(field.name, new_value), verbatim) {
                    (Err(err @ AccessError::Convert { .. }), Some(text)) => {
                        object.set(field.name, text).map_err(|_| err)?;
                    }
                    (result, _) => result?,
                }
                object.get(field.name)
            })
            .and_then(|result| result)?;
        tracing::debug!(option = %option, value = %echoed, "edited option");

        let save_error = self.save.save(&self.store).err();
        if let Some(err) = &save_error {
            tracing::warn!(option = %option, error = %err, "saving after edit failed");
        }

        Ok(AppliedEdit {
            option,
            value: echoed,
            save_error,
        })
    }

    /// Run an edit from a command and report the outcome to its source.
    pub fn execute(
        &self,
        ctx: &CommandContext<'_>,
        path: &ObjectPath,
        field: &'static FieldDescriptor,
    ) -> CommandStatus {
        let option = path.qualify(field.name);
        let Some(value) = ctx.argument else {
            ctx.failure(&self.catalog.render(
                messages::EDIT_FAILURE,
                &[option.as_str(), "missing value"],
            ));
            return CommandStatus::Failure;
        };

        match self.edit(path, field, value) {
            Ok(applied) => {
                let shown = applied.value.to_string();
                ctx.success(&self.catalog.render(
                    messages::EDIT_SUCCESS,
                    &[applied.option.as_str(), shown.as_str()],
                ));
                if let Some(err) = applied.save_error {
                    let reason = err.to_string();
                    ctx.failure(&self.catalog.render(
                        messages::EDIT_SAVE_FAILURE,
                        &[applied.option.as_str(), reason.as_str()],
                    ));
                }
                CommandStatus::Success
            }
            Err(err) => {
                let reason = err.to_string();
                ctx.failure(&self.catalog.render(
                    messages::EDIT_FAILURE,
                    &[option.as_str(), reason.as_str()],
                ));
                CommandStatus::Failure
            }
        }
    }
}

/// Convert a parsed argument into the value a field of `field.kind` accepts.
fn field_value_for(field: &FieldDescriptor, value: &ArgValue) -> Option<FieldValue> {
    match (field.kind, value) {
        (FieldKind::Boolean, ArgValue::Bool(b)) => Some(FieldValue::Bool(*b)),
        (FieldKind::Integer32, ArgValue::Integer(n)) => Some(FieldValue::Int(*n)),
        (FieldKind::Float32, ArgValue::Float(f)) => Some(FieldValue::Float(*f)),
        (FieldKind::Float64, ArgValue::Double(f)) => Some(FieldValue::Double(*f)),
        (FieldKind::Opaque, ArgValue::Text(text)) => {
            Some(FieldValue::Opaque(opaque_from_text(field, text)))
        }
        _ => None,
    }
}

/// Text fields take the input verbatim; anything else is read as JSON and
/// falls back to a plain string. `FieldEditor::edit` retries the verbatim
/// string when the parsed JSON does not fit the field.
pub fn opaque_from_text(field: &FieldDescriptor, text: &str) -> JsonValue {
    if field.text {
        return JsonValue::String(text.to_string());
    }
    serde_json::from_str(text).unwrap_or_else(|_| JsonValue::String(text.to_string()))
}
