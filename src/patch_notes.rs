use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

pub struct PatchNote {
    pub date: &'static str,
    pub title: &'static str,
    pub items: &'static [&'static str],
}

impl PatchNote {
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        NaiveDate::parse_from_str(self.date, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }
}

/// Newest first.
pub const PATCH_NOTES: &[PatchNote] = &[
    PatchNote {
        date: "2025-09-22",
        title: "News sentiment",
        items: &[
            "News panel shows overall sentiment, score, impact and article counts",
            "Top keywords and representative stories with impact tags",
            "Falls back to a plain headline list when no sentiment summary is available",
        ],
    },
    PatchNote {
        date: "2025-09-08",
        title: "Prediction and summary",
        items: &[
            "1-day BUY/SELL/HOLD prediction with predicted return and close",
            "Press f to force a fresh prediction for the current ticker",
            "One-line LLM summary of the ratio narrative",
        ],
    },
    PatchNote {
        date: "2025-08-25",
        title: "First release",
        items: &[
            "Liquidity and solvency ratios with Strong/Fair/Weak bands",
            "Narrative explanation in Korean or English",
        ],
    },
];

#[derive(Serialize, Deserialize, Default)]
struct PatchNotesState {
    #[serde(default)]
    last_seen: Option<DateTime<Utc>>,
}

/// Tracks which patch notes the user has acknowledged.
pub struct PatchNotes {
    path: Option<PathBuf>,
    last_seen: Option<DateTime<Utc>>,
}

impl PatchNotes {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            last_seen: None,
        }
    }

    /// A missing or unreadable state file counts as "nothing seen yet".
    pub fn load(path: Option<PathBuf>) -> Self {
        let last_seen = path.as_ref().and_then(|p| match fs::read_to_string(p) {
            Ok(text) => match serde_json::from_str::<PatchNotesState>(&text) {
                Ok(state) => state.last_seen,
                Err(e) => {
                    warn!(path = %p.display(), error = %e, "ignoring unreadable patch-notes state");
                    None
                }
            },
            Err(_) => None,
        });
        Self { path, last_seen }
    }

    pub fn entries(&self) -> &'static [PatchNote] {
        PATCH_NOTES
    }

    pub fn latest(&self) -> Option<DateTime<Utc>> {
        PATCH_NOTES.iter().filter_map(PatchNote::published_at).max()
    }

    #[cfg(test)]
    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.last_seen
    }

    pub fn has_unread(&self) -> bool {
        match (self.latest(), self.last_seen) {
            (Some(latest), Some(seen)) => latest > seen,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    pub fn is_unread(&self, note: &PatchNote) -> bool {
        match (note.published_at(), self.last_seen) {
            (Some(published), Some(seen)) => published > seen,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Marks everything as read and persists the timestamp.
    pub fn acknowledge(&mut self) -> Result<()> {
        let Some(latest) = self.latest() else {
            return Ok(());
        };
        self.last_seen = Some(latest);

        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let state = PatchNotesState {
            last_seen: self.last_seen,
        };
        let text = serde_json::to_string_pretty(&state)?;
        fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_state(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("tickview-test-{}-{}", std::process::id(), name))
            .join("state.json")
    }

    #[test]
    fn notes_are_newest_first_and_parse() {
        let dates: Vec<_> = PATCH_NOTES.iter().map(|n| n.published_at().unwrap()).collect();
        assert!(dates.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn fresh_install_has_unread_notes() {
        let notes = PatchNotes::in_memory();
        assert!(notes.has_unread());
        assert!(notes.is_unread(&PATCH_NOTES[0]));
    }

    #[test]
    fn acknowledgement_persists_across_loads() {
        let path = temp_state("ack");
        let _ = fs::remove_file(&path);

        let mut notes = PatchNotes::load(Some(path.clone()));
        assert!(notes.has_unread());
        notes.acknowledge().unwrap();
        assert!(!notes.has_unread());

        let reloaded = PatchNotes::load(Some(path.clone()));
        assert_eq!(reloaded.last_seen(), notes.latest());
        assert!(!reloaded.has_unread());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn corrupt_state_file_is_ignored() {
        let path = temp_state("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();

        let notes = PatchNotes::load(Some(path.clone()));
        assert!(notes.last_seen().is_none());
        assert!(notes.has_unread());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
