//! Raw harvested records.
//!
//! A [`Record`] is the unparsed content of one metadata record plus a tag
//! saying which parser backend understands it. Records are immutable.

use std::fmt;

/// Content type of a raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Xml,
    Json,
}

impl ContentType {
    /// Guess the content type from the first non-whitespace character.
    ///
    /// # Examples
    /// ```
    /// use crosswalk_core::record::ContentType;
    ///
    /// assert_eq!(ContentType::detect("  <mods/>"), Some(ContentType::Xml));
    /// assert_eq!(ContentType::detect("{\"a\": 1}"), Some(ContentType::Json));
    /// assert_eq!(ContentType::detect("plain"), None);
    /// ```
    #[must_use]
    pub fn detect(content: &str) -> Option<Self> {
        match content.trim_start().chars().next()? {
            '<' => Some(Self::Xml),
            '{' | '[' => Some(Self::Json),
            _ => None,
        }
    }

    /// Map a MIME type (parameters ignored) to a content type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "text/xml" | "application/xml" => Some(Self::Xml),
            "application/json" | "text/json" => Some(Self::Json),
            other if other.ends_with("+xml") => Some(Self::Xml),
            other if other.ends_with("+json") => Some(Self::Json),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw record content as harvested or loaded from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    content: String,
    content_type: ContentType,
    local_name: Option<String>,
}

impl Record {
    /// Create a record with an explicit content type.
    #[must_use]
    pub fn new(content: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            content: content.into(),
            content_type,
            local_name: None,
        }
    }

    /// Create an XML record.
    #[must_use]
    pub fn xml(content: impl Into<String>) -> Self {
        Self::new(content, ContentType::Xml)
    }

    /// Create a JSON record.
    #[must_use]
    pub fn json(content: impl Into<String>) -> Self {
        Self::new(content, ContentType::Json)
    }

    /// Create a record, detecting the content type from the content itself.
    #[must_use]
    pub fn detect(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        let content_type = ContentType::detect(&content)?;
        Some(Self::new(content, content_type))
    }

    /// Attach the local identifier this record was harvested under.
    #[must_use]
    pub fn with_local_name(mut self, local_name: impl Into<String>) -> Self {
        self.local_name = Some(local_name.into());
        self
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    #[must_use]
    pub fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }
}
