//! A single key/value entry in a configuration document.

use std::cell::OnceCell;
use std::fmt;

use crate::error::{Error, Result};
use crate::scan::{self, ARRAY_END, ARRAY_START};
use crate::track::ChangeTracker;

/// What a line in a document represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingKind {
    /// A regular setting: a key with a value, an array, or a comment.
    #[default]
    Generic,
    /// A preserved blank line. Carries no name, value, or comment.
    Empty,
}

/// One setting: a name with an optional value or array and an optional
/// trailing comment.
///
/// Value and array are mutually exclusive; writing one clears the other.
/// `Some(vec![])` for the array is an *explicit empty array*, rendered as
/// `{ }`, and is distinct from having no array at all.
///
/// The escaped output form is computed lazily and cached until the next
/// mutation, so repeated serialization does not redo the quoting work.
#[derive(Debug, Default)]
pub struct Setting {
    name: String,
    value: Option<String>,
    array: Option<Vec<String>>,
    comment: Option<String>,
    kind: SettingKind,
    index: usize,
    line: Option<usize>,
    tracker: ChangeTracker,
    escaped: OnceCell<String>,
}

/// Conversion into the stored string form of a setting value.
///
/// Numeric types format without digit group separators; the typed accessors
/// accept separators on read but never produce them on write.
pub trait ToValue {
    fn to_value(&self) -> String;
}

impl ToValue for &str {
    fn to_value(&self) -> String {
        (*self).to_string()
    }
}

impl ToValue for String {
    fn to_value(&self) -> String {
        self.clone()
    }
}

macro_rules! impl_to_value {
    ($($t:ty),+) => {
        $(impl ToValue for $t {
            fn to_value(&self) -> String {
                self.to_string()
            }
        })+
    };
}

impl_to_value!(bool, i32, u32, i64, u64, f32, f64);

impl Setting {
    /// Create a named setting with no value.
    ///
    /// Returns an error if the name contains a reserved character.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let mut setting = Setting::default();
        setting.set_name(name)?;
        Ok(setting)
    }

    /// Create a blank-line placeholder.
    pub fn empty() -> Self {
        Setting {
            kind: SettingKind::Empty,
            ..Setting::default()
        }
    }

    /// Create a comment-only setting.
    pub fn comment_only(comment: impl Into<String>) -> Self {
        let mut setting = Setting::default();
        setting.set_comment(Some(comment.into()));
        setting
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the setting.
    ///
    /// Reserved characters (`" # ; = { } [ ]`) are rejected since they would
    /// corrupt the line on output.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if let Some(c) = name.chars().find(|c| scan::is_reserved(*c)) {
            return Err(Error::format(format!(
                "reserved character {:?} in setting name {:?}",
                c, name
            )));
        }
        self.name = name;
        self.touch();
        Ok(())
    }

    pub fn kind(&self) -> SettingKind {
        self.kind
    }

    /// Position within the owning section, maintained on attach.
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Source line this setting was parsed from, if any.
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub(crate) fn set_line(&mut self, line: usize) {
        self.line = Some(line);
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn array(&self) -> Option<&[String]> {
        self.array.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Whether the setting carries neither a value nor an array.
    pub fn is_unset(&self) -> bool {
        self.value.is_none() && self.array.is_none()
    }

    /// Store a scalar value, clearing any array.
    pub fn set(&mut self, value: impl ToValue) {
        self.value = Some(value.to_value());
        self.array = None;
        self.kind = SettingKind::Generic;
        self.touch();
    }

    /// Store an array, clearing any scalar value. An empty slice stores an
    /// explicit empty array.
    pub fn set_array<T: ToValue>(&mut self, items: &[T]) {
        self.array = Some(items.iter().map(ToValue::to_value).collect());
        self.value = None;
        self.kind = SettingKind::Generic;
        self.touch();
    }

    /// Raw string assignment used by the parser; bypasses `ToValue`.
    pub(crate) fn set_raw(&mut self, value: Option<String>) {
        self.value = value;
        self.array = None;
        self.kind = SettingKind::Generic;
        self.touch();
    }

    pub(crate) fn set_raw_array(&mut self, items: Vec<String>) {
        self.array = Some(items);
        self.value = None;
        self.kind = SettingKind::Generic;
        self.touch();
    }

    /// Drop both value and array, keeping the name and comment.
    pub fn clear_value(&mut self) {
        self.value = None;
        self.array = None;
        self.touch();
    }

    /// Attach or replace the trailing comment. Newlines are collapsed to
    /// spaces so the comment stays on one line.
    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment.map(|c| c.replace(['\r', '\n'], " "));
        self.touch();
    }

    pub fn as_int(&self) -> Result<i32> {
        self.parse_scalar("i32")
    }

    pub fn as_long(&self) -> Result<i64> {
        self.parse_scalar("i64")
    }

    pub fn as_float(&self) -> Result<f32> {
        self.parse_scalar("f32")
    }

    pub fn as_double(&self) -> Result<f64> {
        self.parse_scalar("f64")
    }

    pub fn as_bool(&self) -> Result<bool> {
        let raw = self.value.as_deref().unwrap_or("").trim();
        if raw.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if raw.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(parse_error(raw, "bool"))
        }
    }

    pub fn as_int_array(&self) -> Result<Vec<i32>> {
        self.parse_array("i32")
    }

    pub fn as_long_array(&self) -> Result<Vec<i64>> {
        self.parse_array("i64")
    }

    pub fn as_float_array(&self) -> Result<Vec<f32>> {
        self.parse_array("f32")
    }

    pub fn as_double_array(&self) -> Result<Vec<f64>> {
        self.parse_array("f64")
    }

    pub fn as_bool_array(&self) -> Result<Vec<bool>> {
        match &self.array {
            Some(items) => items
                .iter()
                .map(|item| {
                    let item = item.trim();
                    if item.eq_ignore_ascii_case("true") {
                        Ok(true)
                    } else if item.eq_ignore_ascii_case("false") {
                        Ok(false)
                    } else {
                        Err(parse_error(item, "bool"))
                    }
                })
                .collect(),
            None => Err(parse_error("", "bool")),
        }
    }

    fn parse_scalar<T: std::str::FromStr>(&self, expected: &'static str) -> Result<T> {
        let raw = self.value.as_deref().unwrap_or("");
        parse_numeric(raw, expected)
    }

    fn parse_array<T: std::str::FromStr>(&self, expected: &'static str) -> Result<Vec<T>> {
        match &self.array {
            Some(items) => items
                .iter()
                .map(|item| parse_numeric(item, expected))
                .collect(),
            None => Err(parse_error("", expected)),
        }
    }

    /// The value in output form: quoted and escaped as needed, arrays
    /// wrapped in `{ }`. Empty string when there is nothing to render.
    ///
    /// The result is cached until the next mutation.
    pub fn escaped_value(&self) -> &str {
        self.escaped.get_or_init(|| self.render_value())
    }

    fn render_value(&self) -> String {
        if let Some(value) = &self.value {
            return scan::escape_value(value).unwrap_or_else(|| value.clone());
        }
        if let Some(items) = &self.array {
            if items.is_empty() {
                return format!("{} {}", ARRAY_START, ARRAY_END);
            }
            let joined = items
                .iter()
                .map(|item| scan::escape_array_item(item).unwrap_or_else(|| item.clone()))
                .collect::<Vec<_>>()
                .join(", ");
            return format!("{} {} {}", ARRAY_START, joined, ARRAY_END);
        }
        String::new()
    }

    fn touch(&mut self) {
        self.escaped = OnceCell::new();
        self.tracker.bump();
    }

    /// Adopt the owning document's change counter. The setting's private
    /// counter is discarded; attachment itself is not a change.
    pub(crate) fn attach(&mut self, tracker: ChangeTracker) {
        self.tracker = tracker;
    }

    pub(crate) fn detach(&mut self) {
        self.tracker = ChangeTracker::default();
    }
}

/// Clones detach: the copy gets a private change counter and recomputes its
/// escaped form on demand.
impl Clone for Setting {
    fn clone(&self) -> Self {
        Setting {
            name: self.name.clone(),
            value: self.value.clone(),
            array: self.array.clone(),
            comment: self.comment.clone(),
            kind: self.kind,
            index: self.index,
            line: self.line,
            tracker: ChangeTracker::default(),
            escaped: OnceCell::new(),
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == SettingKind::Empty {
            return Ok(());
        }
        match (self.name.is_empty(), &self.comment) {
            (true, Some(comment)) => write!(f, "# {}", comment),
            (true, None) => Ok(()),
            (false, Some(comment)) => {
                write!(f, "{} = {} # {}", self.name, self.escaped_value(), comment)
            }
            (false, None) => write!(f, "{} = {}", self.name, self.escaped_value()),
        }
    }
}

fn parse_error(raw: &str, expected: &'static str) -> Error {
    Error::Parse {
        value: raw.to_string(),
        expected,
    }
}

/// Parse a numeric string, tolerating `,` digit group separators.
fn parse_numeric<T: std::str::FromStr>(raw: &str, expected: &'static str) -> Result<T> {
    let cleaned = raw.trim();
    let cleaned = if cleaned.contains(',') {
        cleaned.replace(',', "")
    } else {
        cleaned.to_string()
    };
    cleaned.parse().map_err(|_| parse_error(raw, expected))
}
