use serde::Serialize;

use super::icon::{Favicon, Icon};
use super::table::{DocumentFamily, FormatAction, FormatTable};

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const PPTX_MIME: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const BINARY_MIME: &str = "application/octet-stream";

/// Lowercase text after the final `.`, or an empty string when there is none.
pub fn extension_of(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

/// Everything the UI needs to know about a file, derived from its name.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub extension: String,
    pub family: Option<DocumentFamily>,
    pub viewable: bool,
    pub editable: bool,
    pub mime: String,
    pub icon: Icon,
    pub icon_asset: &'static str,
    pub favicon: Favicon,
    pub favicon_asset: &'static str,
}

impl FormatTable {
    pub fn family_of(&self, extension: &str) -> Option<DocumentFamily> {
        self.find(extension).and_then(|f| f.family)
    }

    pub fn is_viewable(&self, extension: &str) -> bool {
        self.find(extension)
            .is_some_and(|f| f.supports(FormatAction::View))
    }

    pub fn is_editable(&self, extension: &str) -> bool {
        self.find(extension)
            .is_some_and(|f| f.supports(FormatAction::Edit))
    }

    pub fn mime_type_of(&self, extension: &str) -> String {
        let extension = extension.to_lowercase();
        if let Some(mime) = self.find(&extension).and_then(|f| f.mime.first()) {
            return mime.clone();
        }
        match extension.as_str() {
            "docx" => DOCX_MIME,
            "pptx" => PPTX_MIME,
            "xlsx" => XLSX_MIME,
            _ => BINARY_MIME,
        }
        .to_string()
    }

    pub fn icon_for(&self, extension: &str) -> Icon {
        let extension = extension.to_lowercase();
        if let Some(icon) = Icon::primary(&extension) {
            return icon;
        }
        if self.is_viewable(&extension) {
            Icon::Supported
        } else {
            Icon::Unsupported
        }
    }

    pub fn favicon_for(&self, extension: &str) -> Favicon {
        if !self.is_viewable(extension) {
            return Favicon::Generic;
        }
        match self.family_of(extension) {
            Some(DocumentFamily::Word) => Favicon::Word,
            Some(DocumentFamily::Cell) => Favicon::Cell,
            Some(DocumentFamily::Slide) => Favicon::Slide,
            Some(DocumentFamily::Diagram) => Favicon::Diagram,
            None => Favicon::Generic,
        }
    }

    pub fn classify(&self, filename: &str) -> Classification {
        let extension = extension_of(filename);
        let icon = self.icon_for(&extension);
        let favicon = self.favicon_for(&extension);
        Classification {
            family: self.family_of(&extension),
            viewable: self.is_viewable(&extension),
            editable: self.is_editable(&extension),
            mime: self.mime_type_of(&extension),
            icon,
            icon_asset: icon.asset(),
            favicon,
            favicon_asset: favicon.asset(),
            extension,
        }
    }
}

pub fn family_of(extension: &str) -> Option<DocumentFamily> {
    FormatTable::builtin().family_of(extension)
}

pub fn is_viewable(extension: &str) -> bool {
    FormatTable::builtin().is_viewable(extension)
}

pub fn is_editable(extension: &str) -> bool {
    FormatTable::builtin().is_editable(extension)
}

pub fn mime_type_of(extension: &str) -> String {
    FormatTable::builtin().mime_type_of(extension)
}

pub fn icon_for(extension: &str) -> Icon {
    FormatTable::builtin().icon_for(extension)
}

pub fn favicon_for(extension: &str) -> Favicon {
    FormatTable::builtin().favicon_for(extension)
}

pub fn classify(filename: &str) -> Classification {
    FormatTable::builtin().classify(filename)
}

/// Human readable size, e.g. `1536 -> "1.5 KB"`.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    const UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let scaled = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = format!("{:.*}", decimals, scaled);
    // Drop trailing zeros the way a float round-trip does.
    let trimmed = if rounded.contains('.') {
        rounded.trim_end_matches('0').trim_end_matches('.')
    } else {
        rounded.as_str()
    };
    format!("{} {}", trimmed, UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercase_suffix_after_last_dot() {
        assert_eq!(extension_of("Report.Final.DOCX"), "docx");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("README"), "");
    }

    #[test]
    fn family_lookup_is_case_insensitive() {
        assert_eq!(family_of("DOCX"), family_of("docx"));
        assert_eq!(family_of("docx"), Some(DocumentFamily::Word));
        assert_eq!(family_of("xlsx"), Some(DocumentFamily::Cell));
        assert_eq!(family_of("pptx"), Some(DocumentFamily::Slide));
        assert_eq!(family_of("vsdx"), Some(DocumentFamily::Diagram));
        assert_eq!(family_of("exe"), None);
        assert_eq!(family_of(""), None);
    }

    #[test]
    fn every_viewable_format_has_a_known_family_and_a_supported_icon() {
        let table = FormatTable::builtin();
        for format in table.iter().filter(|f| f.supports(FormatAction::View)) {
            assert!(
                table.family_of(&format.name).is_some(),
                "{} has no family",
                format.name
            );
            assert_ne!(table.icon_for(&format.name), Icon::Unsupported, "{}", format.name);
        }
    }

    #[test]
    fn capabilities_come_from_the_table() {
        assert!(is_viewable("doc"));
        assert!(!is_editable("doc"));
        assert!(is_editable("XLSX"));
        assert!(!is_viewable("png"));
        assert!(!is_viewable("zip"));
    }

    #[test]
    fn mime_prefers_table_then_falls_back() {
        assert_eq!(mime_type_of("doc"), "application/msword");
        // pptx has no MIME entry in the table
        assert_eq!(mime_type_of("pptx"), PPTX_MIME);
        assert_eq!(mime_type_of("zip"), BINARY_MIME);
    }

    #[test]
    fn icons_for_primary_and_other_extensions() {
        assert_eq!(icon_for("DOCX"), Icon::Docx);
        assert_eq!(icon_for("vsdx"), Icon::Vsd);
        assert_eq!(icon_for("odt"), Icon::Supported);
        assert_eq!(icon_for("zip"), Icon::Unsupported);
        assert_eq!(icon_for(""), Icon::Unsupported);
    }

    #[test]
    fn favicon_follows_family() {
        assert_eq!(favicon_for("odp"), Favicon::Slide);
        assert_eq!(favicon_for("csv"), Favicon::Cell);
        assert_eq!(favicon_for("zip"), Favicon::Generic);
    }

    #[test]
    fn classify_without_extension_is_unsupported() {
        let c = classify("Makefile");
        assert_eq!(c.extension, "");
        assert!(!c.viewable);
        assert_eq!(c.icon, Icon::Unsupported);
        assert_eq!(c.icon_asset, "unsupported.svg");
        assert_eq!(c.favicon_asset, "generic.ico");
        assert_eq!(c.mime, BINARY_MIME);
    }

    #[test]
    fn bytes_are_humanized() {
        assert_eq!(format_bytes(0, 2), "0 Bytes");
        assert_eq!(format_bytes(512, 2), "512 Bytes");
        assert_eq!(format_bytes(1536, 2), "1.5 KB");
        assert_eq!(format_bytes(1_048_576, 2), "1 MB");
    }
}
