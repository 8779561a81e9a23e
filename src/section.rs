//! An ordered, named group of settings.

use std::fmt;

use crate::error::{Error, Result};
use crate::scan;
use crate::setting::{Setting, SettingKind, ToValue};
use crate::track::ChangeTracker;

/// A named container of settings in document order.
///
/// Lookup by name is case-insensitive and only matches regular named
/// settings; blank lines and comment-only entries are kept in order but are
/// invisible to lookup.
#[derive(Debug, Default)]
pub struct Section {
    name: String,
    index: i32,
    items: Vec<Setting>,
    unique_keys: bool,
    tracker: ChangeTracker,
    line: Option<usize>,
}

impl Section {
    /// Create an empty named section.
    ///
    /// Returns an error if the name contains a reserved character.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let mut section = Section::default();
        section.set_name(name)?;
        Ok(section)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the section, rejecting reserved characters.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if let Some(c) = name.chars().find(|c| scan::is_reserved(*c)) {
            return Err(Error::format(format!(
                "reserved character {:?} in section name {:?}",
                c, name
            )));
        }
        self.name = name;
        self.tracker.bump();
        Ok(())
    }

    /// Position within the owning document, maintained on attach.
    pub fn index(&self) -> i32 {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: i32) {
        self.index = index;
    }

    /// Source line of the section header, if parsed from text.
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub(crate) fn set_line(&mut self, line: usize) {
        self.line = Some(line);
    }

    /// When set, adding a setting whose name is already present replaces the
    /// existing one in place instead of appending a duplicate.
    pub fn set_unique_keys(&mut self, unique: bool) {
        self.unique_keys = unique;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Setting> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Setting> {
        self.items.iter_mut()
    }

    /// Index of the named setting, matching case-insensitively against
    /// regular named settings only.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|item| {
            item.kind() == SettingKind::Generic
                && !item.name().is_empty()
                && item.name().eq_ignore_ascii_case(name)
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Setting> {
        self.position(name).map(|i| &self.items[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Setting> {
        self.position(name).map(|i| &mut self.items[i])
    }

    pub fn get_at(&self, index: usize) -> Option<&Setting> {
        self.items.get(index)
    }

    /// Get the named setting, creating an unset one if missing.
    pub fn get_or_insert(&mut self, name: &str) -> Result<&mut Setting> {
        if self.position(name).is_none() {
            let setting = Setting::new(name)?;
            self.add(setting);
        }
        let i = self.position(name).expect("setting just added");
        Ok(&mut self.items[i])
    }

    /// Get the named setting, creating it with `fallback` as its value when
    /// it is missing or has no value. Causes zero, one, or two recorded
    /// changes depending on how much had to be filled in.
    pub fn get_or_set<T: ToValue>(&mut self, name: &str, fallback: T) -> Result<&mut Setting> {
        let setting = self.get_or_insert(name)?;
        if setting.value().is_none() {
            setting.set(fallback);
        }
        Ok(setting)
    }

    /// Array counterpart of [`get_or_set`](Self::get_or_set).
    pub fn get_or_set_array<T: ToValue>(
        &mut self,
        name: &str,
        fallback: &[T],
    ) -> Result<&mut Setting> {
        let setting = self.get_or_insert(name)?;
        if setting.array().is_none() {
            setting.set_array(fallback);
        }
        Ok(setting)
    }

    /// Append a setting, or replace an existing one of the same name when
    /// `unique_keys` is set.
    pub fn add(&mut self, mut setting: Setting) {
        setting.attach(self.tracker.clone());
        if self.unique_keys && setting.kind() == SettingKind::Generic {
            if let Some(i) = self.position(setting.name()) {
                setting.set_index(i);
                self.items[i] = setting;
                self.tracker.bump();
                return;
            }
        }
        setting.set_index(self.items.len());
        self.items.push(setting);
        self.tracker.bump();
    }

    /// Insert a setting at a specific position, shifting later ones.
    pub fn insert(&mut self, index: usize, mut setting: Setting) {
        setting.attach(self.tracker.clone());
        setting.set_index(index);
        self.items.insert(index, setting);
        self.reindex(index + 1);
        self.tracker.bump();
    }

    /// Remove the setting at `index`. The detached setting is returned with
    /// a private change counter.
    pub fn remove_at(&mut self, index: usize) -> Setting {
        let mut setting = self.items.remove(index);
        self.reindex(index);
        self.tracker.bump();
        setting.detach();
        setting
    }

    /// Remove the named setting if present.
    pub fn try_remove(&mut self, name: &str) -> Option<Setting> {
        self.position(name).map(|i| self.remove_at(i))
    }

    fn reindex(&mut self, from: usize) {
        for i in from..self.items.len() {
            self.items[i].set_index(i);
        }
    }

    /// Adopt the owning document's change counter, cascading to every
    /// contained setting.
    pub(crate) fn attach(&mut self, tracker: ChangeTracker) {
        for item in &mut self.items {
            item.attach(tracker.clone());
        }
        self.tracker = tracker;
    }

    pub(crate) fn detach(&mut self) {
        self.attach(ChangeTracker::default());
    }
}

/// Clones detach: the copy and all its settings get a private counter.
impl Clone for Section {
    fn clone(&self) -> Self {
        let mut section = Section {
            name: self.name.clone(),
            index: self.index,
            items: self.items.clone(),
            unique_keys: self.unique_keys,
            tracker: ChangeTracker::default(),
            line: self.line,
        };
        let tracker = section.tracker.clone();
        section.attach(tracker);
        section
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.name)
    }
}
