//! Strict structural comparison of documents.

use dance_core::prelude::{double_eq, Document, Value};
use itertools::{EitherOrBoth, Itertools};

use crate::policy::Policy;

/// Find the first difference between two documents, or `None` if they are equal under `policy`.
pub(crate) fn diff_documents(
    reference: &Document,
    under_test: &Document,
    policy: &Policy,
) -> Option<String> {
    diff_fields("", reference, under_test, policy)
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn visible_fields<'a>(
    path: &str,
    doc: &'a Document,
    policy: &Policy,
) -> Vec<(String, &'a str, &'a Value)> {
    doc.iter()
        .map(|(k, v)| (join(path, k), k, v))
        .filter(|(full, _, _)| !policy.is_ignored(full))
        .collect()
}

fn diff_fields(
    path: &str,
    reference: &Document,
    under_test: &Document,
    policy: &Policy,
) -> Option<String> {
    let reference = visible_fields(path, reference, policy);
    let under_test = visible_fields(path, under_test, policy);

    for pair in reference.iter().zip_longest(under_test.iter()) {
        match pair {
            EitherOrBoth::Both((full, ka, va), (_, kb, vb)) => {
                if ka != kb {
                    let at = if path.is_empty() { "top level" } else { path };
                    return Some(format!("field {ka:?} vs {kb:?} at {at}"));
                }
                if let Some(diff) = diff_values(full, va, vb, policy) {
                    return Some(diff);
                }
            }
            EitherOrBoth::Left((full, _, _)) => {
                return Some(format!("{full}: missing on backend under test"));
            }
            EitherOrBoth::Right((full, _, _)) => {
                return Some(format!("{full}: only present on backend under test"));
            }
        }
    }

    None
}

fn diff_values(
    path: &str,
    reference: &Value,
    under_test: &Value,
    policy: &Policy,
) -> Option<String> {
    match (reference, under_test) {
        (Value::Double(a), Value::Double(b)) => {
            (!double_eq(*a, *b)).then(|| format!("{path}: {a:?} vs {b:?}"))
        }
        (Value::Document(a), Value::Document(b)) => diff_fields(path, a, b, policy),
        (Value::Array(a), Value::Array(b)) => {
            for (i, pair) in a.iter().zip_longest(b.iter()).enumerate() {
                let item_path = join(path, &i.to_string());
                match pair {
                    EitherOrBoth::Both(va, vb) => {
                        if let Some(diff) = diff_values(&item_path, va, vb, policy) {
                            return Some(diff);
                        }
                    }
                    EitherOrBoth::Left(_) => {
                        return Some(format!("{item_path}: missing on backend under test"));
                    }
                    EitherOrBoth::Right(_) => {
                        return Some(format!("{item_path}: only present on backend under test"));
                    }
                }
            }
            None
        }
        (a, b) if a.type_name() != b.type_name() => Some(format!(
            "{path}: {} vs {}",
            a.type_name(),
            b.type_name()
        )),
        (a, b) => (a != b).then(|| format!("{path}: {a} vs {b}")),
    }
}
