use std::any::Any;

use crate::descriptor::FieldDescriptor;
use crate::error::AccessError;
use crate::value::FieldValue;

/// A configuration object whose fields can be enumerated, read and written by
/// name.
///
/// Implement it with `#[derive(Editable)]`; the derive emits the descriptor
/// table in declaration order together with the accessors below.
pub trait Editable: Any + Send {
    /// Display name of the concrete type.
    fn type_name(&self) -> &'static str;

    /// Every described field, excluded ones included, in declaration order.
    fn fields(&self) -> &'static [FieldDescriptor];

    /// Read a non-nested field.
    fn get(&self, field: &str) -> Result<FieldValue, AccessError>;

    /// Assign a non-nested field, converting opaque values into the declared type.
    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), AccessError>;

    /// Borrow a nested object field.
    fn nested(&self, field: &str) -> Option<&dyn Editable>;

    fn nested_mut(&mut self, field: &str) -> Option<&mut dyn Editable>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Editable {
    /// Look up a descriptor by name.
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields().iter().find(|field| field.name == name)
    }

    pub fn downcast_ref<T: Editable>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Editable>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Walk nested fields from this object.
    pub fn resolve(&self, segments: &[&str]) -> Option<&dyn Editable> {
        let mut current: &dyn Editable = self;
        for segment in segments {
            current = current.nested(segment)?;
        }
        Some(current)
    }

    pub fn resolve_mut(&mut self, segments: &[&str]) -> Option<&mut dyn Editable> {
        let mut current: &mut dyn Editable = self;
        for segment in segments {
            current = current.nested_mut(segment)?;
        }
        Some(current)
    }
}
