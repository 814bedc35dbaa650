use std::fmt;

pub const DROP_BUTTON_PREFIX: &str = "drop:";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropKind {
    File,
    Image,
    Link,
    Text,
}

impl DropKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "file" => Some(Self::File),
            "image" => Some(Self::Image),
            "link" => Some(Self::Link),
            "text" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Image => "image",
            Self::Link => "link",
            Self::Text => "text",
        }
    }

    /// File and image drops carry an upload; link and text drops are typed into a modal.
    pub fn needs_attachment(self) -> bool {
        matches!(self, Self::File | Self::Image)
    }
}

impl fmt::Display for DropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum DropInputError {
    MissingAttachment,
    UnexpectedAttachment,
}

impl DropInputError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingAttachment => "❌ Please upload a file or image for this drop type.",
            Self::UnexpectedAttachment => "❌ Link and text drops cannot have an attachment.",
        }
    }
}

pub fn validate_input(kind: DropKind, has_attachment: bool) -> Result<(), DropInputError> {
    match (kind.needs_attachment(), has_attachment) {
        (true, false) => Err(DropInputError::MissingAttachment),
        (false, true) => Err(DropInputError::UnexpectedAttachment),
        _ => Ok(()),
    }
}

/// What a claimer receives: an attachment URL for file/image drops, typed content otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropPost {
    pub kind: DropKind,
    pub title: String,
    pub description: String,
    pub payload: String,
    pub author: String,
}

pub fn new_drop_id() -> String {
    format!("{:016x}", rand::random::<u64>())
}

pub fn button_id(drop_id: &str) -> String {
    format!("{}{}", DROP_BUTTON_PREFIX, drop_id)
}

pub fn parse_button_id(custom_id: &str) -> Option<&str> {
    custom_id
        .strip_prefix(DROP_BUTTON_PREFIX)
        .filter(|id| !id.is_empty())
}
