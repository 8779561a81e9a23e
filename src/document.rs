//! The configuration document: sections, parser, and serializer.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::scan::{
    self, ALT_COMMENT, ARRAY_START, COMMENT, KEY_VALUE_SEPARATOR, QUOTE, SECTION_END,
    SECTION_START,
};
use crate::section::Section;
use crate::setting::{Setting, SettingKind};
use crate::track::ChangeTracker;

/// An INI-style document: a header (settings before the first section) and
/// an ordered list of named sections.
///
/// Formatting behavior is controlled through the public flags; set them
/// before loading or building content. The document tree is single-writer:
/// mutation goes through `&mut` access, and the change counter is the only
/// shared state.
#[derive(Debug)]
pub struct Document {
    header: Section,
    sections: Vec<Section>,
    tracker: ChangeTracker,

    /// Emit a blank line before each section header.
    pub pad_sections: bool,
    /// Keep leading/trailing whitespace in parsed values instead of
    /// trimming it.
    pub preserve_whitespace: bool,
    /// Drop blank lines on load and on output.
    pub strip_empty_lines: bool,
    /// Fail the whole load on the first malformed line instead of skipping
    /// it.
    pub strict: bool,
    /// Adding a section whose name already exists replaces the old one.
    pub unique_sections: bool,
    /// Sections added to this document replace duplicate setting names in
    /// place.
    pub unique_keys: bool,
    /// Line terminator used by `Display` and file output.
    pub line_end: &'static str,

    comment_chars: [char; 2],
}

impl Default for Document {
    fn default() -> Self {
        let tracker = ChangeTracker::default();
        let mut header = Section::default();
        header.set_index(-1);
        header.attach(tracker.clone());
        Document {
            header,
            sections: Vec::new(),
            tracker,
            pad_sections: true,
            preserve_whitespace: false,
            strip_empty_lines: true,
            strict: false,
            unique_sections: false,
            unique_keys: false,
            line_end: "\n",
            comment_chars: [COMMENT, ALT_COMMENT],
        }
    }
}

impl Document {
    /// Create an empty document with default flags.
    pub fn new() -> Self {
        Document::default()
    }

    /// Parse a document from text with default flags.
    pub fn parse(text: &str) -> Result<Self> {
        let mut document = Document::new();
        document.load_str(text)?;
        Ok(document)
    }

    /// Load a document from a UTF-8 file with default flags.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut document = Document::new();
        document.load_file(path)?;
        Ok(document)
    }

    /// Mutations recorded since the last load or reset. Loading itself does
    /// not count as change.
    pub fn changes(&self) -> u64 {
        self.tracker.count()
    }

    /// Zero the change counter, returning the old count.
    pub fn reset_change_count(&self) -> u64 {
        self.tracker.reset()
    }

    /// Settings that appear before the first section header.
    pub fn header(&self) -> &Section {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Section {
        &mut self.header
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Section> {
        self.sections.iter_mut()
    }

    /// Index of the named section, case-insensitive.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.sections
            .iter()
            .position(|s| s.name().eq_ignore_ascii_case(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Section> {
        self.position(name).map(|i| &self.sections[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.position(name).map(|i| &mut self.sections[i])
    }

    pub fn get_at(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Get the named section, creating it if missing.
    pub fn get_or_insert(&mut self, name: &str) -> Result<&mut Section> {
        if self.position(name).is_none() {
            let section = Section::new(name)?;
            self.add(section);
        }
        let i = self.position(name).expect("section just added");
        Ok(&mut self.sections[i])
    }

    /// Append a section, or replace an existing one of the same name when
    /// `unique_sections` is set.
    pub fn add(&mut self, section: Section) {
        self.add_internal(section);
    }

    fn add_internal(&mut self, mut section: Section) -> usize {
        section.attach(self.tracker.clone());
        section.set_unique_keys(self.unique_keys);
        if self.unique_sections {
            if let Some(i) = self.position(section.name()) {
                section.set_index(i as i32);
                self.sections[i] = section;
                self.tracker.bump();
                return i;
            }
        }
        let i = self.sections.len();
        section.set_index(i as i32);
        self.sections.push(section);
        self.tracker.bump();
        i
    }

    /// Insert a section at a specific position, shifting later ones.
    pub fn insert(&mut self, index: usize, mut section: Section) {
        section.attach(self.tracker.clone());
        section.set_unique_keys(self.unique_keys);
        section.set_index(index as i32);
        self.sections.insert(index, section);
        self.reindex(index + 1);
        self.tracker.bump();
    }

    /// Remove the section at `index`, returning it detached.
    pub fn remove_at(&mut self, index: usize) -> Section {
        let mut section = self.sections.remove(index);
        self.reindex(index);
        self.tracker.bump();
        section.detach();
        section
    }

    /// Remove the named section if present.
    pub fn try_remove(&mut self, name: &str) -> Option<Section> {
        self.position(name).map(|i| self.remove_at(i))
    }

    fn reindex(&mut self, from: usize) {
        for i in from..self.sections.len() {
            self.sections[i].set_index(i as i32);
        }
    }

    /// Replace the document's content with the parse of `text`.
    ///
    /// In strict mode the first malformed line aborts the load with its line
    /// number attached; otherwise malformed lines are skipped and logged.
    /// The change counter is reset once loading completes.
    pub fn load_str(&mut self, text: &str) -> Result<()> {
        self.header = Section::default();
        self.header.set_index(-1);
        self.header.attach(self.tracker.clone());
        self.sections.clear();

        let mut current: Option<usize> = None;
        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            if let Err(err) = self.handle_line(raw, line_no, &mut current) {
                if self.strict {
                    return Err(err.at_line(line_no));
                }
                tracing::debug!(line = line_no, error = %err, "skipping malformed line");
            }
        }

        self.tracker.reset();
        Ok(())
    }

    /// Replace the document's content with the parse of a UTF-8 file.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let text = fs::read_to_string(path)?;
        self.load_str(&text)
    }

    fn handle_line(&mut self, raw: &str, line_no: usize, current: &mut Option<usize>) -> Result<()> {
        let line = raw.trim();

        if line.is_empty() {
            if !self.strip_empty_lines {
                self.push_setting(Setting::empty(), *current);
            }
            return Ok(());
        }

        if line.starts_with(SECTION_START) {
            *current = Some(self.parse_section_header(line, line_no)?);
            return Ok(());
        }

        let mut setting = self.parse_value_line(line)?;
        setting.set_line(line_no);
        self.push_setting(setting, *current);
        Ok(())
    }

    fn push_setting(&mut self, setting: Setting, current: Option<usize>) {
        match current {
            Some(i) => self.sections[i].add(setting),
            None => self.header.add(setting),
        }
    }

    fn parse_section_header(&mut self, line: &str, line_no: usize) -> Result<usize> {
        let end = line
            .find(SECTION_END)
            .ok_or_else(|| Error::format(format!("section header without end: {:?}", line)))?;
        let name = line[1..end].trim();
        if name.is_empty() {
            return Err(Error::format("empty section name"));
        }

        let tail = line[end + 1..].trim_start();
        if !tail.is_empty() && !tail.starts_with(&self.comment_chars[..]) {
            return Err(Error::format(format!(
                "unexpected text after section header: {:?}",
                tail
            )));
        }

        let mut section = Section::new(name)?;
        section.set_line(line_no);
        Ok(self.add_internal(section))
    }

    /// Parse a non-blank, non-header line into a setting.
    ///
    /// Dispatches on whichever structural form starts first: a comment
    /// marker before any `=` makes the line comment-only, otherwise the text
    /// before `=` is the name and the remainder is parsed as an array, a
    /// quoted value, or a plain value with an optional trailing comment.
    fn parse_value_line(&self, line: &str) -> Result<Setting> {
        let eq = line.find(KEY_VALUE_SEPARATOR);
        let comment_at = scan::find_comment(line, 0, &self.comment_chars);

        match (eq, comment_at) {
            (Some(e), c) if c.map_or(true, |c| e < c) => {
                let mut setting = Setting::default();
                setting.set_name(line[..e].trim())?;
                self.parse_value_part(&mut setting, &line[e + 1..])?;
                Ok(setting)
            }
            (_, Some(c)) => {
                let mut setting = Setting::default();
                let comment = line[c + 1..].trim();
                if !comment.is_empty() {
                    setting.set_comment(Some(comment.to_string()));
                }
                Ok(setting)
            }
            // the guard above always holds when there is no comment marker,
            // so this arm is only ever reached without a separator
            (_, None) => Err(Error::format(format!(
                "key-value pair without separator: {:?}",
                line
            ))),
        }
    }

    /// Parse the text after `=`: nothing, an inline array, a quoted value,
    /// or a plain value, each optionally followed by a comment.
    fn parse_value_part(&self, setting: &mut Setting, rest: &str) -> Result<()> {
        let first = rest
            .char_indices()
            .find(|(_, c)| !c.is_whitespace());

        let (start, c) = match first {
            Some(pair) => pair,
            None => return Ok(()),
        };

        if self.comment_chars.contains(&c) {
            self.take_comment(setting, rest, start);
            return Ok(());
        }

        if c == ARRAY_START {
            let (raw_items, end) = scan::scan_array(rest, start)?;
            let items = raw_items
                .into_iter()
                .map(|item| self.unescape(item))
                .collect();
            setting.set_raw_array(items);
            self.take_trailing_comment(setting, rest, end);
            return Ok(());
        }

        if c == QUOTE {
            let (inner, end) = scan::scan_quoted(rest, start)?;
            setting.set_raw(Some(inner.replace("\\\"", "\"")));
            self.take_trailing_comment(setting, rest, end);
            return Ok(());
        }

        // a plain value keeps its leading whitespace when preservation is
        // on; quoting is the only way to carry edge whitespace otherwise
        let value_start = if self.preserve_whitespace { 0 } else { start };
        let cut = scan::find_comment(rest, start, &self.comment_chars);
        let value_text = &rest[value_start..cut.unwrap_or(rest.len())];
        let value = self.unescape(value_text);
        setting.set_raw(if value.is_empty() { None } else { Some(value) });
        if let Some(cut) = cut {
            self.take_comment(setting, rest, cut);
        }
        Ok(())
    }

    fn take_trailing_comment(&self, setting: &mut Setting, rest: &str, from: usize) {
        if let Some(at) = scan::find_comment(rest, from, &self.comment_chars) {
            self.take_comment(setting, rest, at);
        }
    }

    fn take_comment(&self, setting: &mut Setting, rest: &str, marker: usize) {
        let comment = rest[marker + 1..].trim();
        if !comment.is_empty() {
            setting.set_comment(Some(comment.to_string()));
        }
    }

    fn unescape(&self, raw: &str) -> String {
        let trim = !self.preserve_whitespace;
        scan::unescape_value(raw, trim).unwrap_or_else(|| raw.to_string())
    }

    /// The document as unterminated output lines.
    pub fn lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.emit_items(&self.header, &mut out);
        for section in &self.sections {
            let last_blank = out.last().map_or(false, |line| line.is_empty());
            if self.pad_sections && !out.is_empty() && !last_blank {
                out.push(String::new());
            }
            out.push(section.to_string());
            self.emit_items(section, &mut out);
        }
        out
    }

    fn emit_items(&self, section: &Section, out: &mut Vec<String>) {
        for item in section.iter() {
            if item.kind() == SettingKind::Empty {
                if !self.strip_empty_lines {
                    out.push(String::new());
                }
                continue;
            }
            let rendered = item.to_string();
            if !rendered.is_empty() {
                out.push(rendered);
            }
        }
    }

    /// Serialize and write to `path`, replacing any existing file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_string())?;
        Ok(())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            f.write_str(&line)?;
            f.write_str(self.line_end)?;
        }
        Ok(())
    }
}
