// Plain-text export
//
// Header block, then sections in the fixed transcript → report →
// critique → chat order. Transcript lines carry the timestamp and the
// speaker's display label; uncertainty markers are stripped.

use super::{strip_unclear_markers, ExportContent, APP_NAME};
use crate::model::ChatRole;

const DIVIDER: &str = "----------------------------------------";

/// Render the export as plain text.
pub fn render(data: &ExportContent) -> String {
    let mut content = format!("{} - SEANS KAYDI\n", APP_NAME);
    content.push_str(&format!("Danışan: {}\n", data.metadata.client_alias));
    content.push_str(&format!("Tarih: {}\n", data.metadata.date));
    if let Some(number) = &data.metadata.session_number {
        content.push_str(&format!("Seans No: {}\n", number));
    }
    content.push_str(DIVIDER);
    content.push_str("\n\n");

    if let Some(segments) = data.transcript_segments() {
        content.push_str("=== TRANSKRİPT ===\n\n");
        for seg in segments {
            let clean = strip_unclear_markers(&seg.text);
            content.push_str(&format!(
                "[{}] {}: {}\n\n",
                seg.timestamp,
                seg.speaker.label(),
                clean
            ));
        }
        content.push('\n');
    }

    if let Some(report) = &data.report {
        content.push_str(&format!("=== SEANS RAPORU ===\n\n{}\n\n", report));
    }

    if let Some(critique) = &data.critique {
        content.push_str(&format!("=== SÜPERVİZYON ===\n\n{}\n\n", critique));
    }

    if let Some(messages) = data.chat_messages() {
        content.push_str("=== ASİSTAN NOTLARI ===\n\n");
        for msg in messages {
            let label = match msg.role {
                ChatRole::User => "Siz",
                ChatRole::Model => "Asistan",
            };
            content.push_str(&format!("{}: {}\n\n", label, msg.content));
        }
    }

    content
}
