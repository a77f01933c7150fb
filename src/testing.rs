//! Shared fixtures for unit tests

use crate::loader::SHARED_TYPES_PATH;
use crate::rules::REQUIRED_DOCS;
use std::fs;
use std::path::Path;

/// Shared types that satisfy every structure and serialization rule
pub(crate) fn conformant_source() -> String {
    include_str!("../tests/fixtures/conformant_lib.rs").to_string()
}

pub(crate) fn write_source(root: &Path, source: &str) {
    let path = root.join(SHARED_TYPES_PATH);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, source).unwrap();
}

pub(crate) fn write_docs(root: &Path) {
    for doc in REQUIRED_DOCS {
        let path = root.join(doc);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "# placeholder\n").unwrap();
    }
}
