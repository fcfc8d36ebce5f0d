//! Call-site capture
//!
//! Every public logging entry point is `#[track_caller]`, so the location seen
//! here is the user's call site no matter how many internal frames forward the
//! call.

use serde_json::{Map, Value};
use std::panic::Location;
use std::path::Path;

/// Reported in place of a method name when none is known
pub const ANONYMOUS_METHOD: &str = "<anonymous>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// Enclosing module path when the call came through a macro
    pub method: Option<String>,
    /// Source path as recorded by the compiler
    pub path: String,
    pub line: u32,
    pub column: u32,
}

impl Origin {
    /// Capture the caller's location
    #[track_caller]
    pub fn capture(method: Option<&str>) -> Self {
        Self::from_location(Location::caller(), method)
    }

    pub fn from_location(location: &Location<'_>, method: Option<&str>) -> Self {
        Self {
            method: method.filter(|m| !m.is_empty()).map(str::to_string),
            path: location.file().to_string(),
            line: location.line(),
            column: location.column(),
        }
    }

    /// File name without directories
    pub fn file(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.path)
    }

    /// Directory part of the path, empty for a bare file name
    pub fn folder(&self) -> &str {
        Path::new(&self.path)
            .parent()
            .and_then(|dir| dir.to_str())
            .unwrap_or("")
    }

    pub fn method(&self) -> &str {
        self.method.as_deref().unwrap_or(ANONYMOUS_METHOD)
    }

    /// Template fields contributed by this origin
    pub(crate) fn write_fields(&self, fields: &mut Map<String, Value>) {
        fields.insert("method".into(), self.method().into());
        fields.insert("path".into(), self.path.clone().into());
        fields.insert("file".into(), self.file().into());
        fields.insert("folder".into(), self.folder().into());
        fields.insert("line".into(), self.line.into());
        fields.insert("column".into(), self.column.into());
    }
}
