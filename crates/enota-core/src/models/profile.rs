use serde::{Deserialize, Serialize};

/// Notes needed for the first milestone shown on the profile page
const MILESTONE_NOTES: u32 = 10;

/// Summary of the signed-in user from `/api/notes/profile/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub note_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_date: Option<String>,
}

impl Profile {
    /// Up to two initials from the username's words, uppercased
    pub fn initials(&self) -> String {
        self.username
            .split(' ')
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }

    pub fn note_count_label(&self) -> String {
        if self.note_count == 1 {
            "1 Note".to_string()
        } else {
            format!("{} Notes", self.note_count)
        }
    }

    /// Percent progress toward the first milestone, capped at 100
    pub fn milestone_progress(&self) -> u32 {
        (self.note_count.saturating_mul(100) / MILESTONE_NOTES).min(100)
    }

    pub fn notes_to_milestone(&self) -> u32 {
        MILESTONE_NOTES.saturating_sub(self.note_count)
    }
}
