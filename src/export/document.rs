// Structured document export
//
// The same sections as the text export, rendered as a heading/paragraph
// block tree suitable for conversion into a word-processor document.
// Each major section after the transcript starts on a fresh page, and
// transcript speaker prefixes carry a role-dependent color and weight.

use serde::Serialize;

use super::{strip_unclear_markers, ExportContent};
use crate::model::{ChatRole, Speaker};

/// Accent color for psychologist utterances (indigo).
pub const PSYCHOLOGIST_COLOR: &str = "4F46E5";
/// Accent color for client utterances (emerald).
pub const CLIENT_COLOR: &str = "059669";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    Title,
    Section,
    Meta,
}

/// A styled run of text inside a paragraph.
#[derive(Debug, Clone, Serialize)]
pub struct DocRun {
    pub text: String,
    pub bold: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

impl DocRun {
    fn plain(text: String) -> Self {
        Self {
            text,
            bold: false,
            color: None,
        }
    }

    fn accent(text: String, color: &'static str) -> Self {
        Self {
            text,
            bold: true,
            color: Some(color),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum DocBlock {
    Heading {
        level: HeadingLevel,
        text: String,
        page_break_before: bool,
    },
    Paragraph {
        runs: Vec<DocRun>,
    },
}

/// The assembled document.
#[derive(Debug, Clone, Serialize)]
pub struct StructuredDoc {
    pub blocks: Vec<DocBlock>,
}

fn heading(level: HeadingLevel, text: impl Into<String>) -> DocBlock {
    DocBlock::Heading {
        level,
        text: text.into(),
        page_break_before: false,
    }
}

fn section_on_new_page(text: impl Into<String>) -> DocBlock {
    DocBlock::Heading {
        level: HeadingLevel::Section,
        text: text.into(),
        page_break_before: true,
    }
}

fn speaker_color(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::Psychologist => PSYCHOLOGIST_COLOR,
        _ => CLIENT_COLOR,
    }
}

/// Render the export as a structured document.
pub fn render(data: &ExportContent) -> StructuredDoc {
    let mut blocks = vec![
        heading(HeadingLevel::Title, "Psikoloji Ağı - Seans Dökümü"),
        heading(
            HeadingLevel::Meta,
            format!("Danışan: {}", data.metadata.client_alias),
        ),
        heading(HeadingLevel::Meta, format!("Tarih: {}", data.metadata.date)),
    ];

    if let Some(number) = &data.metadata.session_number {
        blocks.push(heading(HeadingLevel::Meta, format!("{}. Seans", number)));
    }

    if let Some(segments) = data.transcript_segments() {
        blocks.push(heading(HeadingLevel::Section, "Transkript"));

        for seg in segments {
            let prefix = format!("{} ({}): ", seg.speaker.label(), seg.timestamp);
            blocks.push(DocBlock::Paragraph {
                runs: vec![
                    DocRun::accent(prefix, speaker_color(seg.speaker)),
                    DocRun::plain(strip_unclear_markers(&seg.text)),
                ],
            });
        }
    }

    if let Some(report) = &data.report {
        blocks.push(section_on_new_page("Seans Raporu"));
        blocks.push(DocBlock::Paragraph {
            runs: vec![DocRun::plain(report.clone())],
        });
    }

    if let Some(critique) = &data.critique {
        blocks.push(section_on_new_page("Süpervizyon Geri Bildirimi"));
        blocks.push(DocBlock::Paragraph {
            runs: vec![DocRun::plain(critique.clone())],
        });
    }

    if let Some(messages) = data.chat_messages() {
        blocks.push(section_on_new_page("Asistan Sohbet Geçmişi"));
        for msg in messages {
            let label = match msg.role {
                ChatRole::User => "Siz: ",
                ChatRole::Model => "Asistan: ",
            };
            blocks.push(DocBlock::Paragraph {
                runs: vec![
                    DocRun {
                        text: label.to_string(),
                        bold: true,
                        color: None,
                    },
                    DocRun::plain(msg.content.clone()),
                ],
            });
        }
    }

    StructuredDoc { blocks }
}
