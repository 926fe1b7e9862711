//! Daily quest checklist

use std::collections::HashSet;
use std::fmt::Write;

use super::html::escape;
use crate::model::UserState;

/// Placeholder shown while the list regenerates
pub const REGENERATING: &str =
    r#"<p class="text-muted small text-center my-2">Regenerating quests...</p>"#;

const EMPTY: &str = r#"<p class="text-muted small text-center my-2">No daily quests generated yet.</p>"#;

/// Today's checklist. Items in `settling` were checked and are waiting to
/// complete: they render struck through and locked.
pub fn render_daily_quests(state: &UserState, settling: &HashSet<String>) -> String {
    if state.daily_quests.is_empty() {
        return EMPTY.to_string();
    }

    let mut out = String::new();
    for quest in &state.daily_quests {
        let locked = settling.contains(&quest.id);
        let struck = quest.completed || locked;

        let item_class = match (quest.completed, locked) {
            (true, _) => " completed-daily",
            (false, true) => " processing-complete",
            (false, false) => "",
        };
        let label_class = if struck {
            "text-decoration-line-through text-muted"
        } else {
            "fw-semibold text-dark"
        };
        let input_state = if quest.completed {
            " checked disabled"
        } else if locked {
            " checked"
        } else {
            ""
        };

        let id = escape(&quest.id);
        let _ = write!(
            out,
            concat!(
                r#"<div class="daily-quest-item d-flex align-items-center p-2 rounded-3{item_class}" data-daily-id="{id}">"#,
                r#"<input class="form-check-input me-3" type="checkbox" id="dailyCheck_{id}"{input_state}>"#,
                r#"<label class="form-check-label flex-grow-1 daily-task-label {label_class}" for="dailyCheck_{id}">{task}</label>"#,
                r#"<span class="badge rounded-pill ms-2">+{xp} XP</span>"#,
                r#"</div>"#,
            ),
            item_class = item_class,
            id = id,
            input_state = input_state,
            label_class = label_class,
            task = escape(&quest.task),
            xp = quest.xp_reward,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DailyQuest;

    fn daily(id: &str, completed: bool) -> DailyQuest {
        DailyQuest {
            id: id.to_string(),
            task: format!("task {id}"),
            xp_reward: 20,
            completed,
        }
    }

    #[test]
    fn test_empty_list() {
        let html = render_daily_quests(&UserState::default(), &HashSet::new());
        assert!(html.contains("No daily quests generated yet."));
    }

    #[test]
    fn test_item_states() {
        let state = UserState {
            daily_quests: vec![daily("daily_1", true), daily("daily_2", false), daily("daily_3", false)],
            ..Default::default()
        };
        let settling = HashSet::from(["daily_2".to_string()]);
        let html = render_daily_quests(&state, &settling);

        assert!(html.contains(r#"completed-daily" data-daily-id="daily_1""#));
        assert!(html.contains(r#"id="dailyCheck_daily_1" checked disabled"#));
        assert!(html.contains(r#"processing-complete" data-daily-id="daily_2""#));
        assert!(html.contains(r#"id="dailyCheck_daily_3">"#));
        assert!(html.contains("+20 XP"));
    }
}
