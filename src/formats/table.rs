use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const BUILTIN_FORMATS: &str = include_str!("../../data/onlyoffice-docs-formats.json");

static BUILTIN: OnceLock<FormatTable> = OnceLock::new();

/// Editor family a format opens in.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFamily {
    Word,
    Cell,
    Slide,
    Diagram,
}

impl DocumentFamily {
    fn from_table(raw: &str) -> Option<Self> {
        match raw {
            "word" => Some(DocumentFamily::Word),
            "cell" => Some(DocumentFamily::Cell),
            "slide" => Some(DocumentFamily::Slide),
            "diagram" => Some(DocumentFamily::Diagram),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFamily::Word => "word",
            DocumentFamily::Cell => "cell",
            DocumentFamily::Slide => "slide",
            DocumentFamily::Diagram => "diagram",
        }
    }
}

/// Capabilities listed in the `actions` column.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum FormatAction {
    View,
    Edit,
    Review,
    Comment,
    Fill,
    Encrypt,
    Customfilter,
    LossyEdit,
    AutoConvert,
}

impl FormatAction {
    fn from_table(raw: &str) -> Option<Self> {
        match raw {
            "view" => Some(FormatAction::View),
            "edit" => Some(FormatAction::Edit),
            "review" => Some(FormatAction::Review),
            "comment" => Some(FormatAction::Comment),
            "fill" => Some(FormatAction::Fill),
            "encrypt" => Some(FormatAction::Encrypt),
            "customfilter" => Some(FormatAction::Customfilter),
            "lossy-edit" => Some(FormatAction::LossyEdit),
            "auto-convert" => Some(FormatAction::AutoConvert),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct RawFormat {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    actions: Vec<String>,
    #[serde(default)]
    convert: Vec<String>,
    #[serde(default)]
    mime: Vec<String>,
}

/// One row of the format table. Unknown families and actions are dropped on load.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub name: String,
    pub family: Option<DocumentFamily>,
    pub actions: Vec<FormatAction>,
    pub convert: Vec<String>,
    pub mime: Vec<String>,
}

impl From<RawFormat> for FormatDescriptor {
    fn from(raw: RawFormat) -> Self {
        FormatDescriptor {
            name: raw.name.to_lowercase(),
            family: DocumentFamily::from_table(&raw.kind),
            actions: raw
                .actions
                .iter()
                .filter_map(|a| FormatAction::from_table(a))
                .collect(),
            convert: raw.convert,
            mime: raw.mime,
        }
    }
}

impl FormatDescriptor {
    pub fn supports(&self, action: FormatAction) -> bool {
        self.actions.contains(&action)
    }
}

/// Read-only lookup over the format descriptors, keyed by lowercase extension.
#[derive(Debug)]
pub struct FormatTable {
    formats: Vec<FormatDescriptor>,
    by_name: HashMap<String, usize>,
}

impl FormatTable {
    pub fn from_json(raw: &str) -> Result<Self> {
        let rows: Vec<RawFormat> =
            serde_json::from_str(raw).map_err(|e| Error::Decode(format!("format table: {}", e)))?;
        Ok(Self::from_descriptors(rows.into_iter().map(FormatDescriptor::from).collect()))
    }

    pub fn from_descriptors(formats: Vec<FormatDescriptor>) -> Self {
        let mut by_name = HashMap::with_capacity(formats.len());
        for (index, format) in formats.iter().enumerate() {
            // First row for an extension wins.
            by_name.entry(format.name.to_lowercase()).or_insert(index);
        }
        Self { formats, by_name }
    }

    /// The table shipped with the crate, parsed once.
    pub fn builtin() -> &'static FormatTable {
        BUILTIN.get_or_init(|| {
            FormatTable::from_json(BUILTIN_FORMATS).expect("embedded format table is valid JSON")
        })
    }

    /// Exact, case-insensitive match on the extension.
    pub fn find(&self, extension: &str) -> Option<&FormatDescriptor> {
        self.by_name
            .get(&extension.to_lowercase())
            .map(|&index| &self.formats[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormatDescriptor> {
        self.formats.iter()
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}
