//! Attribute parsing for the `Editable` derive.
//!
//! - `container` - struct-level attribute definitions
//! - `field` - field-level attribute definitions and the resolved field shape
//! - `type_utils` - type analysis used to infer a field's shape
//! - `parse` - `parse_nested_meta` entry points

mod container;
mod field;
mod parse;
mod type_utils;

pub use field::{FieldInfo, FieldShape};
pub use parse::parse_struct_attrs;
