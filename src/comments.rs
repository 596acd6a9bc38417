//! Comment collection, driven by [`crate::ParserOptions::comments`].

use crate::position::Span;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum CommentKind {
    Line,
    Block,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    #[serde(rename = "type")]
    pub kind: CommentKind,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<u32>,
}

impl Comment {
    pub(crate) fn new(kind: CommentKind, value: String, span: Span, ranges: bool) -> Self {
        Self {
            kind,
            value,
            start: ranges.then_some(span.start),
            end: ranges.then_some(span.end),
        }
    }
}
