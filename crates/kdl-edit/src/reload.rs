use crate::error::AccessError;
use crate::object::Editable;

/// Outcome of copying a fresh configuration into the live one.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReloadReport {
    /// Dotted names of every field that was copied.
    pub copied: Vec<String>,
    /// Fields left untouched, with the reason.
    pub skipped: Vec<(String, AccessError)>,
}

impl ReloadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Copy every non-read-only field of `fresh` into `live`.
///
/// Nested objects are never replaced: the copy recurses into the live nested
/// instance, so anything holding a path into `live` stays valid.
pub fn reload(live: &mut dyn Editable, fresh: &dyn Editable) -> ReloadReport {
    let mut report = ReloadReport::default();
    copy_into(live, fresh, "", &mut report);
    tracing::info!(
        type_name = live.type_name(),
        copied = report.copied.len(),
        skipped = report.skipped.len(),
        "reloaded configuration"
    );
    report
}

fn copy_into(
    live: &mut dyn Editable,
    fresh: &dyn Editable,
    prefix: &str,
    report: &mut ReloadReport,
) {
    if live.as_any().type_id() != fresh.as_any().type_id() {
        let err = AccessError::TypeMismatch {
            expected: live.type_name(),
            actual: fresh.type_name(),
        };
        tracing::warn!(path = prefix, error = %err, "skipping reload of mismatched object");
        report.skipped.push((prefix.to_string(), err));
        return;
    }

    for descriptor in live.fields() {
        if descriptor.readonly {
            continue;
        }
        let qualified = if prefix.is_empty() {
            descriptor.name.to_string()
        } else {
            format!("{prefix}.{}", descriptor.name)
        };

        if descriptor.is_nested() {
            let type_name = live.type_name();
            match (live.nested_mut(descriptor.name), fresh.nested(descriptor.name)) {
                (Some(live_child), Some(fresh_child)) => {
                    copy_into(live_child, fresh_child, &qualified, report);
                }
                _ => {
                    let err = AccessError::not_nested(type_name, descriptor.name);
                    tracing::warn!(field = %qualified, error = %err, "reload skipped field");
                    report.skipped.push((qualified, err));
                }
            }
            continue;
        }

        match fresh
            .get(descriptor.name)
            .and_then(|value| live.set(descriptor.name, value))
        {
            Ok(()) => report.copied.push(qualified),
            Err(err) => {
                tracing::warn!(field = %qualified, error = %err, "reload skipped field");
                report.skipped.push((qualified, err));
            }
        }
    }
}
