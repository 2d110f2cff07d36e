//! Structural diff of two JSON payloads
//!
//! Walks both payloads together and produces one entry per compared position:
//! a leaf that matches, a leaf that differs, or a key present on only one side.
//! Composite nodes never get an entry of their own, only what sits under them.
//!
//! Arrays are treated as maps from index to value. There is no reordering or
//! LCS matching: `[1, 2]` against `[2, 1]` is two mismatches.
//!
//! Leaves compare without type coercion (`1` against `"1"` is a mismatch), but
//! numbers compare by value: `1` matches `1.0`. Two integers compare exactly,
//! so large `u64`/`i64` values never lose precision through `f64`.
//!
//! Paths join segments with `.` and keys are not escaped. A key that itself
//! contains a dot renders the same path as a nested field: `{"a.b": 1}` and
//! `{"a": {"b": 1}}` both yield an entry at `a.b`. Entries stay distinct in the
//! report; only their rendered paths coincide.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// One compared position in a payload.
///
/// `a` is the reference (remote) side and `b` the candidate (local) side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiffEntry {
    Match { path: String, value: Value },
    Mismatch { path: String, a: Value, b: Value },
    /// Key absent in `a`, with `b`'s value
    MissingInA { path: String, b: Value },
    /// Key absent in `b`, with `a`'s value
    MissingInB { path: String, a: Value },
}

impl DiffEntry {
    pub fn path(&self) -> &str {
        match self {
            DiffEntry::Match { path, .. }
            | DiffEntry::Mismatch { path, .. }
            | DiffEntry::MissingInA { path, .. }
            | DiffEntry::MissingInB { path, .. } => path,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, DiffEntry::Match { .. })
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, DiffEntry::Mismatch { .. })
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, DiffEntry::MissingInA { .. } | DiffEntry::MissingInB { .. })
    }
}

/// Per-category entry counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffCounts {
    pub matches: usize,
    pub mismatches: usize,
    pub missing_in_a: usize,
    pub missing_in_b: usize,
}

impl DiffCounts {
    pub fn total(&self) -> usize {
        self.matches + self.mismatches + self.missing_in_a + self.missing_in_b
    }
}

/// Ordered result of one comparison.
///
/// Order follows the traversal: keys of `a` in `a`'s order, then keys only
/// present in `b` in `b`'s order; array indexes ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DiffReport {
    entries: Vec<DiffEntry>,
}

impl DiffReport {
    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<DiffEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn matches(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries.iter().filter(|e| e.is_match())
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries.iter().filter(|e| e.is_mismatch())
    }

    pub fn missing(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries.iter().filter(|e| e.is_missing())
    }

    pub fn has_mismatch(&self) -> bool {
        self.entries.iter().any(DiffEntry::is_mismatch)
    }

    pub fn has_missing(&self) -> bool {
        self.entries.iter().any(DiffEntry::is_missing)
    }

    /// No mismatches and no presence asymmetries
    pub fn is_clean(&self) -> bool {
        self.entries.iter().all(DiffEntry::is_match)
    }

    pub fn counts(&self) -> DiffCounts {
        let mut counts = DiffCounts::default();
        for entry in &self.entries {
            match entry {
                DiffEntry::Match { .. } => counts.matches += 1,
                DiffEntry::Mismatch { .. } => counts.mismatches += 1,
                DiffEntry::MissingInA { .. } => counts.missing_in_a += 1,
                DiffEntry::MissingInB { .. } => counts.missing_in_b += 1,
            }
        }
        counts
    }
}

/// Diff two payloads from the root.
pub fn diff(a: &Value, b: &Value) -> DiffReport {
    diff_at(a, b, "")
}

/// Diff two payloads, prefixing every entry path with `path`.
///
/// Total over any pair of JSON values: a type difference at a leaf is
/// reported as a mismatch, never as an error.
pub fn diff_at(a: &Value, b: &Value, path: &str) -> DiffReport {
    let mut entries = Vec::new();
    if is_composite(a) && is_composite(b) {
        walk(a, b, path, &mut entries);
    } else {
        compare_leaf(path.to_string(), a, b, &mut entries);
    }
    DiffReport { entries }
}

fn walk(a: &Value, b: &Value, path: &str, out: &mut Vec<DiffEntry>) {
    for key in union_keys(a, b) {
        let current = join_path(path, &key);
        match (child(a, &key), child(b, &key)) {
            (None, Some(vb)) => out.push(DiffEntry::MissingInA {
                path: current,
                b: vb.clone(),
            }),
            (Some(va), None) => out.push(DiffEntry::MissingInB {
                path: current,
                a: va.clone(),
            }),
            (Some(va), Some(vb)) if is_composite(va) && is_composite(vb) => {
                walk(va, vb, &current, out)
            }
            (Some(va), Some(vb)) => compare_leaf(current, va, vb, out),
            // union_keys only yields keys held by at least one side
            (None, None) => {}
        }
    }
}

fn compare_leaf(path: String, a: &Value, b: &Value, out: &mut Vec<DiffEntry>) {
    if leaf_eq(a, b) {
        out.push(DiffEntry::Match {
            path,
            value: a.clone(),
        });
    } else {
        out.push(DiffEntry::Mismatch {
            path,
            a: a.clone(),
            b: b.clone(),
        });
    }
}

fn leaf_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_f64() || y.is_f64() => {
            x.as_f64() == y.as_f64()
        }
        _ => a == b,
    }
}

fn is_composite(v: &Value) -> bool {
    matches!(v, Value::Object(_) | Value::Array(_))
}

fn keys(v: &Value) -> Vec<String> {
    match v {
        Value::Object(map) => map.keys().cloned().collect(),
        Value::Array(items) => (0..items.len()).map(|i| i.to_string()).collect(),
        _ => Vec::new(),
    }
}

fn union_keys(a: &Value, b: &Value) -> Vec<String> {
    let mut seen = HashSet::new();
    keys(a)
        .into_iter()
        .chain(keys(b))
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

fn child<'a>(v: &'a Value, key: &str) -> Option<&'a Value> {
    match v {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identical_nested_payloads_all_match() {
        let a = json!({"id": 1, "block": {"hash": "0xabc", "txs": [1, 2, 3]}});
        let report = diff(&a, &a.clone());

        assert_eq!(report.len(), 5);
        assert!(report.is_clean());
        let paths: Vec<&str> = report.entries().iter().map(DiffEntry::path).collect();
        assert_eq!(
            paths,
            vec!["id", "block.hash", "block.txs.0", "block.txs.1", "block.txs.2"]
        );
    }

    #[test]
    fn test_scalar_mismatch() {
        let report = diff(&json!({"hash": "0xabc"}), &json!({"hash": "0xdef"}));
        assert_eq!(
            report.entries(),
            &[DiffEntry::Mismatch {
                path: "hash".to_string(),
                a: json!("0xabc"),
                b: json!("0xdef"),
            }]
        );
    }

    #[test]
    fn test_extra_field_in_a() {
        let report = diff(&json!({"hash": "0xabc", "extra": 5}), &json!({"hash": "0xabc"}));
        assert_eq!(
            report.entries(),
            &[
                DiffEntry::Match {
                    path: "hash".to_string(),
                    value: json!("0xabc"),
                },
                DiffEntry::MissingInB {
                    path: "extra".to_string(),
                    a: json!(5),
                },
            ]
        );
        assert!(!report.has_mismatch());
        assert!(report.has_missing());
    }

    #[test]
    fn test_present_null_is_not_absence() {
        let report = diff(&json!({"x": null}), &json!({}));
        assert_eq!(
            report.entries(),
            &[DiffEntry::MissingInB {
                path: "x".to_string(),
                a: Value::Null,
            }]
        );

        let report = diff(&json!({"x": null}), &json!({"x": null}));
        assert!(report.is_clean());
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_no_type_coercion() {
        let report = diff(&json!({"n": 1}), &json!({"n": "1"}));
        assert_eq!(report.counts().mismatches, 1);

        let report = diff(&json!({"n": true}), &json!({"n": 1}));
        assert_eq!(report.counts().mismatches, 1);
    }

    #[test]
    fn test_numbers_compare_by_value() {
        let report = diff(&json!({"n": 1, "fee": 2.5}), &json!({"n": 1.0, "fee": 2.50}));
        assert!(report.is_clean());
        assert_eq!(report.counts().matches, 2);

        let report = diff(&json!({"n": 1}), &json!({"n": 1.5}));
        assert_eq!(report.counts().mismatches, 1);

        // Adjacent u64 values collapse to the same f64 but stay distinct
        let report = diff(&json!({"n": u64::MAX}), &json!({"n": u64::MAX - 1}));
        assert_eq!(report.counts().mismatches, 1);
        let report = diff(&json!({"n": -3}), &json!({"n": -3}));
        assert!(report.is_clean());
    }

    #[test]
    fn test_dotted_key_shares_path_with_nested_field() {
        let report = diff(&json!({"a.b": 1, "a": {"b": 2}}), &json!({"a.b": 1, "a": {"b": 3}}));
        let paths: Vec<&str> = report.entries().iter().map(DiffEntry::path).collect();
        assert_eq!(paths, vec!["a.b", "a.b"]);
        assert!(report.entries()[0].is_match());
        assert!(report.entries()[1].is_mismatch());
    }

    #[test]
    fn test_composite_against_scalar_is_single_mismatch() {
        let report = diff(&json!({"tx": {"hash": "0x1"}}), &json!({"tx": null}));
        assert_eq!(
            report.entries(),
            &[DiffEntry::Mismatch {
                path: "tx".to_string(),
                a: json!({"hash": "0x1"}),
                b: Value::Null,
            }]
        );
    }

    #[test]
    fn test_arrays_compare_by_index() {
        let report = diff(&json!({"txs": [1, 2, 3]}), &json!({"txs": [2, 1]}));
        let counts = report.counts();
        assert_eq!(counts.mismatches, 2);
        assert_eq!(counts.missing_in_b, 1);
        assert_eq!(report.entries()[2].path(), "txs.2");
    }

    #[test]
    fn test_missing_subtree_is_one_entry() {
        let report = diff(&json!({"a": 1}), &json!({"a": 1, "receipt": {"status": 1, "logs": []}}));
        assert_eq!(report.len(), 2);
        assert_eq!(
            report.entries()[1],
            DiffEntry::MissingInA {
                path: "receipt".to_string(),
                b: json!({"status": 1, "logs": []}),
            }
        );
    }

    #[test]
    fn test_keys_only_in_b_follow_keys_of_a() {
        let report = diff(&json!({"z": 1, "a": 2}), &json!({"y": 3, "a": 2, "z": 1}));
        let paths: Vec<&str> = report.entries().iter().map(DiffEntry::path).collect();
        assert_eq!(paths, vec!["z", "a", "y"]);
    }

    #[test]
    fn test_top_level_scalars() {
        let report = diff(&json!("0x1"), &json!("0x2"));
        assert_eq!(report.len(), 1);
        assert_eq!(report.entries()[0].path(), "");

        assert!(diff(&json!({}), &json!([])).is_empty());
    }

    #[test]
    fn test_path_prefix() {
        let report = diff_at(&json!({"hash": 1}), &json!({"hash": 1}), "result");
        assert_eq!(report.entries()[0].path(), "result.hash");
    }

    #[test]
    fn test_entry_serialization() {
        let entry = DiffEntry::MissingInA {
            path: "extra".to_string(),
            b: json!(5),
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"kind": "missing_in_a", "path": "extra", "b": 5})
        );
    }
}
