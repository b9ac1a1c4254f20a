use serde::Serialize;

/// Tile icon shown next to a file.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Icon {
    Docx,
    Xlsx,
    Pptx,
    Pdf,
    Vsd,
    Supported,
    Unsupported,
}

impl Icon {
    /// Icons with a dedicated asset, matched on the exact extension.
    pub fn primary(extension: &str) -> Option<Self> {
        match extension {
            "docx" => Some(Icon::Docx),
            "xlsx" => Some(Icon::Xlsx),
            "pptx" => Some(Icon::Pptx),
            "pdf" => Some(Icon::Pdf),
            "vsd" | "vsdx" => Some(Icon::Vsd),
            _ => None,
        }
    }

    pub fn asset(&self) -> &'static str {
        match self {
            Icon::Docx => "docx.svg",
            Icon::Xlsx => "xlsx.svg",
            Icon::Pptx => "pptx.svg",
            Icon::Pdf => "pdf.svg",
            Icon::Vsd => "vsd.svg",
            Icon::Supported => "supported.svg",
            Icon::Unsupported => "unsupported.svg",
        }
    }
}

/// Browser-tab icon for the editor window.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Favicon {
    Word,
    Cell,
    Slide,
    Diagram,
    Generic,
}

impl Favicon {
    pub fn asset(&self) -> &'static str {
        match self {
            Favicon::Word => "word.ico",
            Favicon::Cell => "cell.ico",
            Favicon::Slide => "slide.ico",
            Favicon::Diagram => "vsd.ico",
            Favicon::Generic => "generic.ico",
        }
    }
}
