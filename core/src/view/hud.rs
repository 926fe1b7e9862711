//! HUD: level, coins and XP bar

use crate::model::UserState;

/// Header and profile stats
pub fn render_hud(state: &UserState) -> String {
    format!(
        concat!(
            r#"<div class="hud-stats" id="header-gamification-stats">"#,
            r#"<span class="hud-level">Lv. <span id="user-level">{level}</span></span>"#,
            r#"<span class="hud-coins"><span id="user-coins">{coins}</span> coins</span>"#,
            r#"<div class="progress"><div class="progress-bar" id="user-xp-bar" role="progressbar" style="width: {xp}%;" aria-valuenow="{xp}"></div></div>"#,
            r#"</div>"#,
            r#"<div class="profile-stats">"#,
            r#"<span id="profile-level">{level}</span>"#,
            r#"<span id="profile-coins">{coins}</span>"#,
            r#"<span id="profile-streak">{streak}</span>"#,
            r#"<div class="progress"><div class="progress-bar" id="profile-xp-bar" style="width: {xp}%;"></div></div>"#,
            r#"<span id="profile-xp-text">{xp}</span>"#,
            r#"</div>"#,
        ),
        level = state.level,
        coins = state.coins,
        xp = state.xp,
        streak = state.current_streak,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hud_shows_stats() {
        let state = UserState {
            level: 4,
            xp: 35,
            coins: 120,
            ..Default::default()
        };
        let html = render_hud(&state);
        assert!(html.contains(r#"<span id="user-level">4</span>"#));
        assert!(html.contains(r#"<span id="user-coins">120</span>"#));
        assert!(html.contains("width: 35%;"));
        assert!(html.contains(r#"aria-valuenow="35""#));
    }
}
