//! Derive macro for `kdl_edit::Editable`.
//!
//! ```ignore
//! #[derive(Default, Editable)]
//! #[edit(name = "Settings")]
//! struct Settings {
//!     #[edit(description = "Master switch", default = true)]
//!     enabled: bool,
//!     #[edit(readonly)]
//!     version: i32,
//!     tags: Vec<String>,
//!     audio: Audio,
//! }
//! ```
//!
//! Field attributes: `skip`, `exclude`, `readonly`, `rename`, `description`
//! (`desc`), `default`, `comment` (repeatable), `nested` and `opaque`.

mod attrs;
mod editable_gen;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

#[proc_macro_derive(Editable, attributes(edit))]
pub fn derive_editable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match editable_gen::generate_editable_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
