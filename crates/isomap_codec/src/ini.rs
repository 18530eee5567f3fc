//! Minimal INI document model
//!
//! Sections and keys keep their file order so that a load/save cycle only
//! rewrites the sections the editor owns. Comments are not preserved.

use std::collections::HashMap;
use std::fmt;

/// One `[Name]` section and its `key=value` entries in file order
#[derive(Debug, Clone, Default)]
pub struct IniSection {
    pub name: String,
    entries: Vec<(String, String)>,
    /// Key to position in `entries`
    index: HashMap<String, usize>,
}

impl PartialEq for IniSection {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.entries == other.entries
    }
}

impl Eq for IniSection {}

impl IniSection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let &idx = self.index.get(key)?;
        Some(self.entries[idx].1.as_str())
    }

    /// Set a value, replacing an existing key in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(&idx) = self.index.get(&key) {
            self.entries[idx].1 = value;
        } else {
            self.index.insert(key.clone(), self.entries.len());
            self.entries.push((key, value));
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.index.remove(key)?;
        let (_, value) = self.entries.remove(idx);
        for (key, _) in &self.entries[idx..] {
            if let Some(position) = self.index.get_mut(key.as_str()) {
                *position -= 1;
            }
        }
        Some(value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A parsed INI file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: Vec<IniSection>,
}

impl IniDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse INI text. Lines before the first section header, lines without
    /// `=`, and `;` comments are skipped. Repeated sections are merged.
    pub fn parse(text: &str) -> Self {
        let mut doc = Self::new();
        let mut current: Option<usize> = None;

        for raw in text.lines() {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let name = name.trim();
                current = Some(match doc.position(name) {
                    Some(idx) => idx,
                    None => {
                        doc.sections.push(IniSection::new(name));
                        doc.sections.len() - 1
                    }
                });
                continue;
            }

            let (Some(idx), Some((key, value))) = (current, line.split_once('=')) else {
                continue;
            };
            doc.sections[idx].set(key.trim(), value.trim());
        }

        doc
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.name == name)
    }

    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut IniSection> {
        self.sections.iter_mut().find(|s| s.name == name)
    }

    /// Get a section, appending an empty one at the end if missing
    pub fn section_or_insert(&mut self, name: &str) -> &mut IniSection {
        let idx = match self.position(name) {
            Some(idx) => idx,
            None => {
                self.sections.push(IniSection::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[idx]
    }

    /// Replace all entries of a section, keeping its position in the file
    pub fn replace_section<I>(&mut self, name: &str, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let section = self.section_or_insert(name);
        section.clear();
        for (k, v) in entries {
            section.set(k, v);
        }
    }

    pub fn remove_section(&mut self, name: &str) -> Option<IniSection> {
        let idx = self.position(name)?;
        Some(self.sections.remove(idx))
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?.get(key)
    }

    pub fn sections(&self) -> impl Iterator<Item = &IniSection> {
        self.sections.iter()
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "[{}]", section.name)?;
            for (k, v) in &section.entries {
                writeln!(f, "{}={}", k, v)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "; header comment
[Basic]
Name=Test Map ; trailing
Player=Multi

[Map]
Size=0,0,50,50
Theater=TEMPERATE
[Basic]
Official=no
";

    #[test]
    fn test_parse_sections_and_keys() {
        let doc = IniDocument::parse(SAMPLE);
        assert_eq!(doc.sections().count(), 2);
        assert_eq!(doc.get("Basic", "Name"), Some("Test Map"));
        assert_eq!(doc.get("Basic", "Official"), Some("no"));
        assert_eq!(doc.get("Map", "Size"), Some("0,0,50,50"));
        assert_eq!(doc.get("Map", "Missing"), None);
        assert_eq!(doc.get("Nope", "Name"), None);
    }

    #[test]
    fn test_replace_section_keeps_position() {
        let mut doc = IniDocument::parse(SAMPLE);
        doc.replace_section("Basic", vec![("1".to_string(), "abc".to_string())]);

        let names: Vec<_> = doc.sections().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Basic", "Map"]);
        assert_eq!(doc.section("Basic").unwrap().len(), 1);
        assert_eq!(doc.get("Basic", "1"), Some("abc"));
    }

    #[test]
    fn test_write_and_reparse() {
        let mut doc = IniDocument::parse(SAMPLE);
        doc.section_or_insert("IsoMapPack5").set("1", "AAAA");
        doc.section_mut("Map").unwrap().remove("Theater");

        let text = doc.to_string();
        let reparsed = IniDocument::parse(&text);
        assert_eq!(reparsed, doc);
        assert_eq!(reparsed.get("IsoMapPack5", "1"), Some("AAAA"));
        assert_eq!(reparsed.get("Map", "Theater"), None);
    }

    #[test]
    fn test_large_section_lookup_and_remove() {
        let mut section = IniSection::new("IsoMapPack5");
        for i in 1..=20_000 {
            section.set(i.to_string(), format!("line{}", i));
        }
        section.set("7", "replaced");
        assert_eq!(section.len(), 20_000);
        assert_eq!(section.get("7"), Some("replaced"));
        assert_eq!(section.get("20000"), Some("line20000"));

        assert_eq!(section.remove("2").as_deref(), Some("line2"));
        assert_eq!(section.remove("2"), None);
        assert_eq!(section.get("3"), Some("line3"));
        section.set("3", "moved");
        let first: Vec<_> = section.entries().take(3).collect();
        assert_eq!(first, vec![("1", "line1"), ("3", "moved"), ("4", "line4")]);

        section.clear();
        assert!(section.is_empty());
        assert_eq!(section.get("1"), None);
        section.set("1", "again");
        assert_eq!(section.entries().collect::<Vec<_>>(), vec![("1", "again")]);
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut section = IniSection::new("S");
        section.set("a", "1");
        section.set("b", "2");
        section.set("a", "3");
        let entries: Vec<_> = section.entries().collect();
        assert_eq!(entries, vec![("a", "3"), ("b", "2")]);
    }
}
