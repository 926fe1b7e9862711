//! Inventory and store grids

use std::fmt::Write;

use super::html::escape;
use crate::catalog::{SkinId, ROULETTE_COST, STORE_ITEMS};
use crate::model::UserState;

/// Owned skins with equip buttons
pub fn render_inventory(state: &UserState) -> String {
    let mut out = String::new();
    for item in STORE_ITEMS.iter().filter(|i| state.owns(&i.skin_id())) {
        let equipped = state.equipped_skin.as_str() == item.id;
        let button = if equipped {
            r#"<button class="btn btn-sm btn-success w-100 rounded-pill fw-bold disabled">Equipped</button>"#
                .to_string()
        } else {
            format!(
                r#"<button class="btn btn-sm btn-outline-primary w-100 rounded-pill fw-bold btn-equip" data-skin="{}">Equip</button>"#,
                escape(item.id)
            )
        };

        let _ = write!(
            out,
            concat!(
                r#"<div class="store-card{border}">"#,
                r#"<div class="store-card-img-wrapper"><img src="{image}" alt="{name}" class="store-card-img"></div>"#,
                r#"<div><div class="store-card-title">{name}</div>{button}</div>"#,
                r#"</div>"#,
            ),
            border = if equipped { " border-primary" } else { "" },
            image = item.image,
            name = escape(item.name),
            button = button,
        );
    }
    out
}

/// Purchasable skins plus the roulette panel. Owned items show as owned,
/// unaffordable ones are disabled, and `buying` marks an in-flight purchase.
pub fn render_store(state: &UserState, buying: Option<&SkinId>) -> String {
    let mut out = String::new();
    let spin_disabled = if state.coins < ROULETTE_COST { " disabled" } else { "" };
    let _ = write!(
        out,
        concat!(
            r#"<div class="roulette-panel">"#,
            r#"<img id="roulette-display-img" src="{image}" alt="Roulette">"#,
            r#"<p id="roulette-msg" class="small mt-2 mb-0"></p>"#,
            r#"<button id="btn-spin-roulette" class="btn btn-primary rounded-pill fw-bold"{disabled}>Spin ({cost} coins)</button>"#,
            r#"</div>"#,
        ),
        image = STORE_ITEMS[0].image,
        disabled = spin_disabled,
        cost = ROULETTE_COST,
    );

    for item in STORE_ITEMS.iter().filter(|i| i.cost > 0) {
        let skin = item.skin_id();
        let button = if state.owns(&skin) {
            r#"<button class="btn btn-sm btn-secondary w-100 rounded-pill fw-bold disabled">Owned</button>"#.to_string()
        } else if buying == Some(&skin) {
            r#"<button class="btn btn-sm btn-primary w-100 rounded-pill fw-bold" disabled><span class="spinner-border spinner-border-sm"></span></button>"#.to_string()
        } else if state.coins < item.cost {
            format!(
                r#"<button class="btn btn-sm btn-outline-secondary w-100 rounded-pill fw-bold" disabled>{} coins</button>"#,
                item.cost
            )
        } else {
            format!(
                r#"<button class="btn btn-sm btn-primary w-100 rounded-pill fw-bold btn-buy" data-skin="{}">Buy · {} coins</button>"#,
                escape(item.id),
                item.cost
            )
        };

        let _ = write!(
            out,
            concat!(
                r#"<div class="store-card">"#,
                r#"<div class="store-card-img-wrapper"><img src="{image}" alt="{name}" class="store-card-img"></div>"#,
                r#"<div><div class="store-card-title">{name}</div>{button}</div>"#,
                r#"</div>"#,
            ),
            image = item.image,
            name = escape(item.name),
            button = button,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(coins: u32) -> UserState {
        UserState {
            coins,
            owned_skins: vec![SkinId::default(), SkinId::from("skin_2")],
            equipped_skin: SkinId::from("skin_2"),
            ..Default::default()
        }
    }

    #[test]
    fn test_inventory_shows_owned_with_equip_state() {
        let html = render_inventory(&state(0));
        assert!(html.contains("Original"));
        assert!(html.contains("Variant Beta"));
        assert!(!html.contains("Variant Alpha"));
        assert!(html.contains(r#"data-skin="default">Equip"#));
        assert!(html.contains(">Equipped<"));
    }

    #[test]
    fn test_store_gating() {
        let html = render_store(&state(50), None);
        assert!(html.contains(">Owned<"));
        assert!(!html.contains("btn-buy"));
        assert!(html.contains(r#"id="btn-spin-roulette" class="btn btn-primary rounded-pill fw-bold" disabled"#));

        let html = render_store(&state(150), Some(&SkinId::from("skin_1")));
        assert!(!html.contains(r#"data-skin="skin_1""#));
        assert!(html.contains(r#"btn-buy" data-skin="skin_3""#));
        assert!(html.contains("spinner-border"));
    }
}
