use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{ScaleRecord, SessionRecord};

/// Group label for sessions saved without a client alias.
pub const UNNAMED_CLIENT_LABEL: &str = "İsimsiz Danışanlar";

/// One client's sessions as shown on the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ClientGroup {
    pub alias: String,
    pub sessions: Vec<SessionRecord>,
}

/// A past scale administration, passed as context when interpreting a
/// new score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorePoint {
    pub date: NaiveDate,
    pub score: f64,
}

/// Per-character collation key for Turkish alphabetical order.
///
/// Aliases are Turkish text, and byte order would push "Çağla", "Ömer",
/// or "Şule" behind every ASCII alias. Letters rank by their position in
/// the Turkish alphabet, case-insensitively with the dotted/dotless I
/// pairing (İ→i, I→ı); anything else keeps its scalar value, offset past
/// the alphabet so digits and punctuation sort after letters.
fn turkish_alias_key(alias: &str) -> Vec<u32> {
    const ALPHABET: &[char] = &[
        'a', 'b', 'c', 'ç', 'd', 'e', 'f', 'g', 'ğ', 'h', 'ı', 'i', 'j', 'k', 'l', 'm', 'n',
        'o', 'ö', 'p', 'r', 's', 'ş', 't', 'u', 'ü', 'v', 'y', 'z',
    ];

    alias
        .chars()
        .map(|c| {
            let lower = match c {
                'I' => 'ı',
                'İ' => 'i',
                _ => c.to_lowercase().next().unwrap_or(c),
            };
            match ALPHABET.iter().position(|&a| a == lower) {
                Some(rank) => rank as u32,
                None => lower as u32 + ALPHABET.len() as u32,
            }
        })
        .collect()
}

/// Group sessions by client alias, groups sorted by alias ascending in
/// Turkish alphabetical order.
///
/// Within a group, sessions keep storage order (new sessions are
/// prepended at save time, so storage order is already most-recent-first
/// for untouched records). Display sorting happens in [`filter_groups`].
pub fn group_by_client(sessions: &[SessionRecord]) -> Vec<ClientGroup> {
    let mut groups: Vec<ClientGroup> = Vec::new();

    for session in sessions {
        let alias = session
            .client_alias
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or(UNNAMED_CLIENT_LABEL);

        match groups.iter_mut().find(|g| g.alias == alias) {
            Some(group) => group.sessions.push(session.clone()),
            None => groups.push(ClientGroup {
                alias: alias.to_string(),
                sessions: vec![session.clone()],
            }),
        }
    }

    groups.sort_by_key(|g| turkish_alias_key(&g.alias));
    groups
}

/// Filter grouped sessions by a search term.
///
/// Matches are case-insensitive substrings of the session title or the
/// group alias, or a plain substring of the date. Surviving sessions are
/// sorted newest first; groups left empty are dropped entirely.
pub fn filter_groups(groups: Vec<ClientGroup>, query: &str) -> Vec<ClientGroup> {
    let needle = query.to_lowercase();

    groups
        .into_iter()
        .filter_map(|group| {
            let alias_matches = group.alias.to_lowercase().contains(&needle);
            let mut sessions: Vec<SessionRecord> = group
                .sessions
                .into_iter()
                .filter(|s| {
                    alias_matches
                        || s.title.to_lowercase().contains(&needle)
                        || s.date.to_string().contains(query)
                })
                .collect();

            if sessions.is_empty() {
                return None;
            }

            sessions.sort_by(|a, b| b.date.cmp(&a.date));
            Some(ClientGroup {
                alias: group.alias,
                sessions,
            })
        })
        .collect()
}

/// Score history for one client and scale name, excluding the record
/// being interpreted. The excluded id wins even when every other field
/// matches.
pub fn history_for(
    scales: &[ScaleRecord],
    client_alias: &str,
    scale_name: &str,
    exclude_id: &str,
) -> Vec<ScorePoint> {
    scales
        .iter()
        .filter(|s| s.client_alias == client_alias && s.name == scale_name && s.id != exclude_id)
        .map(|s| ScorePoint {
            date: s.date,
            score: s.score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Transcript;

    fn session(id: &str, alias: Option<&str>, title: &str, date: &str) -> SessionRecord {
        SessionRecord {
            id: id.to_string(),
            date: date.parse().unwrap(),
            title: title.to_string(),
            client_alias: alias.map(str::to_string),
            session_number: None,
            duration: 60,
            transcript: Transcript::Raw(String::new()),
            report: None,
            critique: None,
            critique_approach: None,
            bulk_analysis_id: None,
        }
    }

    #[test]
    fn test_group_by_client_partitions_exactly() {
        let sessions = vec![
            session("1", Some("DN-02"), "Seans", "2026-01-10"),
            session("2", Some("DN-01"), "Seans", "2026-01-11"),
            session("3", Some("DN-02"), "Seans", "2026-01-12"),
            session("4", None, "Seans", "2026-01-13"),
        ];

        let groups = group_by_client(&sessions);
        let aliases: Vec<&str> = groups.iter().map(|g| g.alias.as_str()).collect();
        assert_eq!(aliases, vec!["DN-01", "DN-02", UNNAMED_CLIENT_LABEL]);

        let total: usize = groups.iter().map(|g| g.sessions.len()).sum();
        assert_eq!(total, sessions.len());

        let mut ids: Vec<&str> = groups
            .iter()
            .flat_map(|g| g.sessions.iter().map(|s| s.id.as_str()))
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_groups_sort_in_turkish_alphabet_order() {
        let sessions = vec![
            session("1", Some("Ümit"), "Seans", "2026-01-10"),
            session("2", Some("Şule"), "Seans", "2026-01-10"),
            session("3", Some("Can"), "Seans", "2026-01-10"),
            session("4", Some("Ömer"), "Seans", "2026-01-10"),
            session("5", Some("Çağla"), "Seans", "2026-01-10"),
            session("6", Some("Sevgi"), "Seans", "2026-01-10"),
            session("7", Some("Olcay"), "Seans", "2026-01-10"),
        ];

        let aliases: Vec<String> = group_by_client(&sessions)
            .into_iter()
            .map(|g| g.alias)
            .collect();
        assert_eq!(
            aliases,
            vec!["Can", "Çağla", "Olcay", "Ömer", "Sevgi", "Şule", "Ümit"]
        );
    }

    #[test]
    fn test_alias_sort_pairs_dotted_and_dotless_i() {
        let sessions = vec![
            session("1", Some("İpek"), "Seans", "2026-01-10"),
            session("2", Some("Irmak"), "Seans", "2026-01-10"),
            session("3", Some("Halil"), "Seans", "2026-01-10"),
            session("4", Some("Jale"), "Seans", "2026-01-10"),
        ];

        let aliases: Vec<String> = group_by_client(&sessions)
            .into_iter()
            .map(|g| g.alias)
            .collect();
        // Turkish order: h < ı < i < j.
        assert_eq!(aliases, vec!["Halil", "Irmak", "İpek", "Jale"]);
    }

    #[test]
    fn test_empty_alias_falls_back_to_default_label() {
        let sessions = vec![session("1", Some(""), "Seans", "2026-01-10")];
        let groups = group_by_client(&sessions);
        assert_eq!(groups[0].alias, UNNAMED_CLIENT_LABEL);
    }

    #[test]
    fn test_filter_drops_empty_groups() {
        let sessions = vec![
            session("1", Some("DN-01"), "İlk görüşme", "2026-01-10"),
            session("2", Some("DN-02"), "Takip", "2026-01-11"),
        ];

        let groups = filter_groups(group_by_client(&sessions), "ilk");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].alias, "DN-01");
    }

    #[test]
    fn test_filter_matches_alias_and_date() {
        let sessions = vec![
            session("1", Some("DN-01"), "Seans", "2026-01-10"),
            session("2", Some("DN-01"), "Seans", "2026-02-15"),
        ];
        let groups = group_by_client(&sessions);

        // Alias match keeps every session in the group.
        let by_alias = filter_groups(groups.clone(), "dn-01");
        assert_eq!(by_alias[0].sessions.len(), 2);

        // Date match keeps only the matching session.
        let by_date = filter_groups(groups, "2026-02");
        assert_eq!(by_date[0].sessions.len(), 1);
        assert_eq!(by_date[0].sessions[0].id, "2");
    }

    #[test]
    fn test_filter_sorts_sessions_newest_first() {
        let sessions = vec![
            session("old", Some("DN-01"), "Seans", "2026-01-10"),
            session("new", Some("DN-01"), "Seans", "2026-03-01"),
        ];
        let groups = filter_groups(group_by_client(&sessions), "");
        assert_eq!(groups[0].sessions[0].id, "new");
        assert_eq!(groups[0].sessions[1].id, "old");
    }

    fn scale(id: &str, alias: &str, name: &str, date: &str, score: f64) -> ScaleRecord {
        ScaleRecord {
            id: id.to_string(),
            client_alias: alias.to_string(),
            date: date.parse().unwrap(),
            name: name.to_string(),
            score,
            max_score: None,
            interpretation: None,
            next_scheduled_date: None,
        }
    }

    #[test]
    fn test_history_excludes_interpreted_record() {
        let scales = vec![
            scale("a", "DN-01", "Beck Depresyon Envanteri", "2026-01-05", 28.0),
            scale("b", "DN-01", "Beck Depresyon Envanteri", "2026-02-05", 21.0),
            scale("c", "DN-01", "Beck Anksiyete Envanteri", "2026-02-05", 14.0),
            scale("d", "DN-02", "Beck Depresyon Envanteri", "2026-02-05", 9.0),
        ];

        let history = history_for(&scales, "DN-01", "Beck Depresyon Envanteri", "b");
        assert_eq!(
            history,
            vec![ScorePoint {
                date: "2026-01-05".parse().unwrap(),
                score: 28.0
            }]
        );
    }
}
