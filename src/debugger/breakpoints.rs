use crate::files::CodeFile;
use std::collections::{BTreeMap, BTreeSet};

/// Enabled breakpoint lines per file, in editor numbering.
#[derive(Debug, Clone, Default)]
pub struct BreakpointRegistry {
    points: BTreeMap<String, BTreeSet<u32>>,
}

impl BreakpointRegistry {
    pub fn new() -> Self {
        Self {
            points: BTreeMap::new(),
        }
    }

    /// Seed from a file's breakpoint map; disabled entries are skipped.
    pub fn load_file(&mut self, file: &CodeFile) {
        for (line, enabled) in file.breakpoints() {
            self.set(file.filename(), *line, *enabled);
        }
    }

    /// Returns `true` when the line was not already enabled.
    pub fn add(&mut self, filename: &str, line: u32) -> bool {
        let added = self
            .points
            .entry(filename.to_string())
            .or_default()
            .insert(line);
        if added {
            tracing::debug!(filename, line, "breakpoint set");
        }
        added
    }

    /// Returns `true` when the line was enabled before.
    pub fn remove(&mut self, filename: &str, line: u32) -> bool {
        let Some(lines) = self.points.get_mut(filename) else {
            return false;
        };
        let removed = lines.remove(&line);
        if lines.is_empty() {
            self.points.remove(filename);
        }
        if removed {
            tracing::debug!(filename, line, "breakpoint removed");
        }
        removed
    }

    pub fn set(&mut self, filename: &str, line: u32, enabled: bool) -> bool {
        if enabled {
            self.add(filename, line)
        } else {
            self.remove(filename, line)
        }
    }

    pub fn contains(&self, filename: &str, line: u32) -> bool {
        self.points
            .get(filename)
            .is_some_and(|lines| lines.contains(&line))
    }

    /// Enabled lines for a file, ascending.
    pub fn list_for(&self, filename: &str) -> Vec<u32> {
        self.points
            .get(filename)
            .map(|lines| lines.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Enabled lines shifted into the engine's numbering. Lines the engine
    /// cannot represent are left out.
    pub fn engine_lines(&self, filename: &str, offset: u32) -> Vec<u32> {
        self.list_for(filename)
            .into_iter()
            .filter_map(|line| line.checked_add(offset))
            .collect()
    }

    /// Files with at least one enabled breakpoint.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.points.keys().map(String::as_str)
    }
}
