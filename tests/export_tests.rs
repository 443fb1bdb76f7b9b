// Integration tests for the export pipeline
//
// All three renderers share one contract: metadata header first, fixed
// section order, no header for empty sections, uncertainty markers
// stripped from transcript text.

use psikoscribe::export::document::{self, DocBlock, HeadingLevel};
use psikoscribe::export::paged::{self, PagedLayout};
use psikoscribe::export::{text, ExportContent, ExportMetadata};
use psikoscribe::model::{ChatMessage, ChatRole, Speaker, TranscriptSegment};

fn segment(id: u32, speaker: Speaker, timestamp: &str, text: &str) -> TranscriptSegment {
    TranscriptSegment {
        id,
        speaker,
        text: text.to_string(),
        timestamp: timestamp.to_string(),
        is_unclear: None,
    }
}

fn message(role: ChatRole, content: &str) -> ChatMessage {
    ChatMessage {
        id: format!("m-{}", content.len()),
        role,
        content: content.to_string(),
        timestamp: None,
    }
}

fn full_content() -> ExportContent {
    ExportContent {
        transcript: Some(vec![
            segment(1, Speaker::Psychologist, "00:05", "Bugün nasılsınız?"),
            segment(2, Speaker::Client, "00:11", "Dün gece [?] hiç uyuyamadım."),
        ]),
        report: Some("Seans özeti.".to_string()),
        critique: Some("Yansıtma iyi kullanılmış.".to_string()),
        chat: Some(vec![
            message(ChatRole::User, "Uyku sorunu ne zamandır var?"),
            message(ChatRole::Model, "İki haftadır sürdüğü belirtiliyor."),
        ]),
        metadata: ExportMetadata {
            client_alias: "DN-01".to_string(),
            date: "2026-02-10".to_string(),
            session_number: Some("4".to_string()),
        },
    }
}

fn header_only_content() -> ExportContent {
    ExportContent {
        transcript: Some(Vec::new()),
        report: None,
        critique: None,
        chat: None,
        metadata: ExportMetadata {
            client_alias: "DN-01".to_string(),
            date: "2026-02-10".to_string(),
            session_number: None,
        },
    }
}

// -- plain text --------------------------------------------------------------

#[test]
fn test_text_sections_in_fixed_order() {
    let output = text::render(&full_content());

    let order = [
        "PSİKOLOJİ AĞI - SEANS KAYDI",
        "Danışan: DN-01",
        "Tarih: 2026-02-10",
        "Seans No: 4",
        "=== TRANSKRİPT ===",
        "=== SEANS RAPORU ===",
        "=== SÜPERVİZYON ===",
        "=== ASİSTAN NOTLARI ===",
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|needle| output.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_text_strips_uncertainty_markers() {
    let output = text::render(&full_content());
    assert!(!output.contains("[?]"));
    assert!(output.contains("[00:11] Danışan: Dün gece  hiç uyuyamadım."));
}

#[test]
fn test_text_speaker_and_chat_labels() {
    let output = text::render(&full_content());
    assert!(output.contains("[00:05] Psikolog: Bugün nasılsınız?"));
    assert!(output.contains("Siz: Uyku sorunu ne zamandır var?"));
    assert!(output.contains("Asistan: İki haftadır sürdüğü belirtiliyor."));
}

#[test]
fn test_text_empty_transcript_renders_header_only() {
    let output = text::render(&header_only_content());
    assert!(output.starts_with("PSİKOLOJİ AĞI - SEANS KAYDI\n"));
    assert!(!output.contains("==="));
    assert!(!output.contains("Seans No:"));
}

// -- structured document -----------------------------------------------------

fn section_headings(doc: &document::StructuredDoc) -> Vec<(String, bool)> {
    doc.blocks
        .iter()
        .filter_map(|b| match b {
            DocBlock::Heading {
                level: HeadingLevel::Section,
                text,
                page_break_before,
            } => Some((text.clone(), *page_break_before)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_document_sections_after_transcript_break_pages() {
    let doc = document::render(&full_content());
    assert_eq!(
        section_headings(&doc),
        vec![
            ("Transkript".to_string(), false),
            ("Seans Raporu".to_string(), true),
            ("Süpervizyon Geri Bildirimi".to_string(), true),
            ("Asistan Sohbet Geçmişi".to_string(), true),
        ]
    );
}

#[test]
fn test_document_speaker_prefix_colored_by_role() {
    let doc = document::render(&full_content());

    let prefixes: Vec<_> = doc
        .blocks
        .iter()
        .filter_map(|b| match b {
            DocBlock::Paragraph { runs } if runs[0].color.is_some() => Some(runs[0].clone()),
            _ => None,
        })
        .collect();

    assert_eq!(prefixes.len(), 2);
    assert_eq!(prefixes[0].text, "Psikolog (00:05): ");
    assert_eq!(prefixes[0].color, Some(document::PSYCHOLOGIST_COLOR));
    assert_eq!(prefixes[1].text, "Danışan (00:11): ");
    assert_eq!(prefixes[1].color, Some(document::CLIENT_COLOR));
    assert!(prefixes.iter().all(|r| r.bold));
}

#[test]
fn test_document_empty_sections_leave_no_heading() {
    let doc = document::render(&header_only_content());
    assert!(section_headings(&doc).is_empty());
    // Title plus the two metadata lines, nothing else.
    assert_eq!(doc.blocks.len(), 3);
}

// -- paginated layout --------------------------------------------------------

fn all_lines(layout: &PagedLayout) -> Vec<String> {
    layout
        .pages
        .iter()
        .flat_map(|p| p.lines.iter().map(|l| l.text.clone()))
        .collect()
}

#[test]
fn test_paged_header_comes_first() {
    let layout = paged::render(&full_content());
    let first = &layout.pages[0].lines[0];
    assert_eq!(first.text, "PSİKOLOJİ AĞI - SEANS DÖKÜMÜ");
    assert_eq!(first.font_size, 16);
    assert!(first.bold);
}

#[test]
fn test_paged_long_transcript_spans_pages() {
    let mut content = full_content();
    content.transcript = Some(
        (0..60)
            .map(|i| segment(i, Speaker::Client, "00:30", "Kısa bir cümle daha."))
            .collect(),
    );

    let layout = paged::render(&content);
    assert!(layout.pages.len() >= 2, "expected a page break");
    assert!(layout.pages.iter().all(|p| !p.lines.is_empty()));

    // The report section still follows the transcript.
    let lines = all_lines(&layout);
    let transcript_at = lines.iter().position(|l| l == "Transkript").unwrap();
    let report_at = lines.iter().position(|l| l == "Seans Raporu").unwrap();
    assert!(transcript_at < report_at);
}

#[test]
fn test_paged_strips_markdown_headings_from_report() {
    let mut content = full_content();
    content.report = Some("## Değerlendirme\nSeans verimli geçti.".to_string());

    let lines = all_lines(&paged::render(&content));
    assert!(lines.iter().any(|l| l.contains("Değerlendirme")));
    assert!(lines.iter().all(|l| !l.contains('#')));
}

#[test]
fn test_paged_empty_transcript_renders_header_only() {
    let layout = paged::render(&header_only_content());
    assert_eq!(layout.pages.len(), 1);

    let lines = all_lines(&layout);
    assert_eq!(lines.len(), 3);
    assert!(!lines.iter().any(|l| l == "Transkript"));
}
