//! Every `t!("...")` key used under `src/` must exist in the fallback locale,
//! and the fallback must not carry dead or duplicated keys.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

const FALLBACK_FTL: &str = include_str!("../i18n/en-US/seedline-ui.ftl");

fn ftl_keys(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('-'))
        .filter_map(|line| line.split_once('='))
        .map(|(id, _)| id.trim())
        .filter(|id| !id.is_empty() && id.chars().all(valid_key_char))
        .map(str::to_string)
        .collect()
}

fn valid_key_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '-')
}

/// Keys passed as the first literal argument to `t!`.
fn referenced_keys(src_root: &Path) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    let mut stack = vec![src_root.to_path_buf()];

    while let Some(path) = stack.pop() {
        if path.is_dir() {
            if let Ok(entries) = fs::read_dir(&path) {
                stack.extend(entries.flatten().map(|entry| entry.path()));
            }
            continue;
        }
        if path.extension().and_then(|s| s.to_str()) != Some("rs") {
            continue;
        }
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        for chunk in content.split("t!(\"").skip(1) {
            if let Some((key, _)) = chunk.split_once('"') {
                if !key.is_empty() && key.chars().all(valid_key_char) {
                    found.insert(key.to_string());
                }
            }
        }
    }
    found
}

#[test]
fn referenced_keys_exist_in_fallback() {
    let defined: BTreeSet<String> = ftl_keys(FALLBACK_FTL).into_iter().collect();
    let src = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src");
    let referenced = referenced_keys(&src);

    assert!(!referenced.is_empty(), "no t!() usages found under {src:?}");
    let missing: Vec<_> = referenced.difference(&defined).collect();
    assert!(missing.is_empty(), "keys missing from en-US: {missing:?}");
}

#[test]
fn fallback_has_no_unused_keys() {
    let defined: BTreeSet<String> = ftl_keys(FALLBACK_FTL).into_iter().collect();
    let referenced = referenced_keys(&PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src"));

    let unused: Vec<_> = defined.difference(&referenced).collect();
    assert!(unused.is_empty(), "en-US defines unused keys: {unused:?}");
}

#[test]
fn fallback_has_no_duplicate_keys() {
    let keys = ftl_keys(FALLBACK_FTL);
    let mut seen = BTreeSet::new();
    let duplicates: Vec<_> = keys.iter().filter(|key| !seen.insert(*key)).collect();
    assert!(duplicates.is_empty(), "duplicate keys: {duplicates:?}");
}
