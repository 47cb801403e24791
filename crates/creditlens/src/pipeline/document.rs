use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Output of the document parsing service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub documents: Vec<DocumentPart>,
}

/// One parsed document as markdown, split on its headers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentPart {
    pub content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub tables: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub header: String,
    pub content: String,
}

impl ParsedDocument {
    pub fn from_markdown(markdown: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self {
            documents: vec![DocumentPart::from_markdown(markdown, metadata)],
        }
    }

    /// Content of the first document when it is not blank.
    pub fn primary_content(&self) -> Option<&str> {
        self.documents
            .first()
            .map(|part| part.content.as_str())
            .filter(|content| !content.trim().is_empty())
    }
}

impl DocumentPart {
    pub fn from_markdown(markdown: impl Into<String>, metadata: Map<String, Value>) -> Self {
        let content = markdown.into();
        let sections = split_into_sections(&content);
        Self {
            content,
            metadata,
            sections,
            tables: Vec::new(),
        }
    }
}

/// Split markdown on `#`-style header lines.
///
/// Text before the first header is not part of any section.
pub fn split_into_sections(markdown: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in markdown.lines() {
        if is_header(line) {
            if let Some((header, body)) = current.take() {
                sections.push(section(header, &body));
            }
            current = Some((line.trim().to_string(), Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    if let Some((header, body)) = current {
        sections.push(section(header, &body));
    }
    sections
}

fn is_header(line: &str) -> bool {
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|ch| *ch == '#').count();
    hashes > 0
        && trimmed[hashes..].starts_with(' ')
        && !trimmed[hashes..].trim().is_empty()
}

fn section(header: String, body: &[&str]) -> Section {
    Section {
        header,
        content: body.join("\n").trim().to_string(),
    }
}
