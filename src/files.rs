use crate::api::models::Attachment;
use serde::Serialize;

const IMAGE_EXTS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg"];
const AUDIO_EXTS: &[&str] = &["mp3", "ogg", "wav", "mpeg", "m4a", "aac", "opus"];
const VIDEO_EXTS: &[&str] = &["mp4", "webm", "ogg", "avi", "mov", "mkv"];
const SPREADSHEET_EXTS: &[&str] = &["xlsx", "xls", "csv", "ods"];
const DOCUMENT_EXTS: &[&str] = &["doc", "docx", "odt", "txt"];
const ARCHIVE_EXTS: &[&str] = &["zip", "rar", "7z", "tar", "gz"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Audio,
    Video,
    Pdf,
    Spreadsheet,
    Document,
    Archive,
    Other,
}

impl FileKind {
    /// MIME first, then the file extension.
    pub fn detect(name: &str, mime: Option<&str>) -> Self {
        mime.and_then(Self::from_mime)
            .or_else(|| Self::from_extension(&extension(name)))
            .unwrap_or(Self::Other)
    }

    pub fn of(attachment: &Attachment) -> Self {
        Self::detect(&attachment.name, attachment.mime.as_deref())
    }

    fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.is_empty() {
            return None;
        }
        if mime.starts_with("image/") {
            Some(Self::Image)
        } else if mime.starts_with("audio/") {
            Some(Self::Audio)
        } else if mime.starts_with("video/") {
            Some(Self::Video)
        } else if mime.contains("pdf") {
            Some(Self::Pdf)
        } else if mime.contains("spreadsheet") {
            Some(Self::Spreadsheet)
        } else if mime.contains("document") || mime.contains("word") {
            Some(Self::Document)
        } else if mime.contains("zip") || mime.contains("compressed") {
            Some(Self::Archive)
        } else {
            None
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        // Audio is checked before video so `ogg` lands on audio.
        let table: [(&[&str], Self); 6] = [
            (IMAGE_EXTS, Self::Image),
            (AUDIO_EXTS, Self::Audio),
            (VIDEO_EXTS, Self::Video),
            (SPREADSHEET_EXTS, Self::Spreadsheet),
            (DOCUMENT_EXTS, Self::Document),
            (ARCHIVE_EXTS, Self::Archive),
        ];
        if ext == "pdf" {
            return Some(Self::Pdf);
        }
        table
            .iter()
            .find(|(exts, _)| exts.contains(&ext))
            .map(|(_, kind)| *kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Pdf => "pdf",
            Self::Spreadsheet => "spreadsheet",
            Self::Document => "document",
            Self::Archive => "archive",
            Self::Other => "other",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Image => "🖼️",
            Self::Audio => "🎵",
            Self::Video => "🎬",
            Self::Pdf => "📄",
            Self::Spreadsheet => "📊",
            Self::Document => "📝",
            Self::Archive => "🗜️",
            Self::Other => "📎",
        }
    }
}

/// Lowercased text after the last dot; empty when there is none.
pub fn extension(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}
