//! The file set a debug run works on.
//!
//! Files belong to the editor and persistence layers; the controller only reads
//! names, text and breakpoint maps from them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    JavaScript,
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFile {
    #[serde(default)]
    pub text: String,
    pub filename: String,
    /// Editor line (zero-based) to enabled flag.
    #[serde(default)]
    pub breakpoints: BTreeMap<u32, bool>,
}

impl CodeFile {
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            filename: filename.into(),
            breakpoints: BTreeMap::new(),
        }
    }

    pub fn with_breakpoint(mut self, line: u32) -> Self {
        self.breakpoints.insert(line, true);
        self
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn breakpoints(&self) -> &BTreeMap<u32, bool> {
        &self.breakpoints
    }

    /// Language derived from the extension, if it is one we know.
    pub fn mode(&self) -> Option<FileMode> {
        let (_, ext) = self.filename.rsplit_once('.')?;
        match ext {
            "js" => Some(FileMode::JavaScript),
            "html" => Some(FileMode::Html),
            _ => None,
        }
    }

    /// Enabled breakpoint lines in the engine's numbering. Lines past the end
    /// of the engine's range are dropped.
    pub fn debugger_breakpoints(&self, offset: u32) -> Vec<u32> {
        self.breakpoints
            .iter()
            .filter(|(_, enabled)| **enabled)
            .filter_map(|(line, _)| line.checked_add(offset))
            .collect()
    }
}

/// A user's editing session: the ordered set of files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserSession {
    pub files: Vec<CodeFile>,
}

const EXAMPLE_SCRIPT: &str = "\
function randomColor() {
  var n = Math.floor(Math.random() * 16777215);
  return \"#\" + n.toString(16);
}

function changeColor() {
  var TheUltimate = function(a){this.yeah=1; return a+1;};
  var hmm = [\"Hey!\", \"Ho!\", {lets:\"go!\"}];
  var stuff = {parts:[1, 2, 3], thing:\"What\", oohy: function(){return 1;}};
  var tuesday = new Date();
  hmm[1] = \"Oh!\";
  var color = randomColor();
  var elem = document.querySelector(\".hello-world\");
  elem.style.color = color;
}

setInterval(changeColor, 250);";

const EXAMPLE_DOCUMENT: &str = "<div class=\"hello-world\">Hello World</div>";

impl UserSession {
    pub fn new(files: Vec<CodeFile>) -> Self {
        Self { files }
    }

    /// The session a new visitor starts with.
    pub fn example() -> Self {
        Self::new(vec![
            CodeFile::new("index.js", EXAMPLE_SCRIPT).with_breakpoint(8),
            CodeFile::new("index.html", EXAMPLE_DOCUMENT),
        ])
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn file(&self, filename: &str) -> Option<&CodeFile> {
        self.files.iter().find(|f| f.filename == filename)
    }

    pub fn first_of_mode(&self, mode: FileMode) -> Option<&CodeFile> {
        self.files.iter().find(|f| f.mode() == Some(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mode_from_extension() {
        assert_eq!(CodeFile::new("a.js", "").mode(), Some(FileMode::JavaScript));
        assert_eq!(CodeFile::new("a.html", "").mode(), Some(FileMode::Html));
        assert_eq!(CodeFile::new("a.css", "").mode(), None);
        assert_eq!(CodeFile::new("Makefile", "").mode(), None);
    }

    #[test]
    fn debugger_breakpoints_skip_disabled_and_shift() {
        let mut file = CodeFile::new("index.js", "").with_breakpoint(8);
        file.breakpoints.insert(2, false);
        file.breakpoints.insert(0, true);
        assert_eq!(file.debugger_breakpoints(1), vec![1, 9]);
    }

    #[test]
    fn debugger_breakpoints_drop_unrepresentable_lines() {
        let file = CodeFile::new("index.js", "")
            .with_breakpoint(3)
            .with_breakpoint(u32::MAX);
        assert_eq!(file.debugger_breakpoints(1), vec![4]);
    }

    #[test]
    fn json_shape_uses_string_line_keys() {
        let session = UserSession::new(vec![CodeFile::new("index.js", "x").with_breakpoint(8)]);
        let json = session.to_json().unwrap();
        assert_eq!(
            json,
            r#"[{"text":"x","filename":"index.js","breakpoints":{"8":true}}]"#
        );
        assert_eq!(UserSession::from_json(&json).unwrap(), session);
    }

    #[test]
    fn missing_fields_default() {
        let session = UserSession::from_json(r#"[{"filename":"index.html"}]"#).unwrap();
        assert_eq!(session.files[0].text, "");
        assert!(session.files[0].breakpoints.is_empty());
    }

    #[test]
    fn example_session_has_script_and_document() {
        let session = UserSession::example();
        let script = session.first_of_mode(FileMode::JavaScript).unwrap();
        assert_eq!(script.filename(), "index.js");
        assert_eq!(script.debugger_breakpoints(1), vec![9]);
        assert!(session.file("index.html").unwrap().text().contains("hello-world"));
    }
}
