//! View rendering
//!
//! Pure functions from `&UserState` to complete HTML fragments, one per
//! [`Region`](crate::messages::Region). Surfaces replace a region's contents
//! wholesale with the returned fragment. Every interpolated string is
//! escaped.

mod chat;
mod daily;
mod html;
mod hud;
mod inventory;
mod quests;

pub use chat::{quest_saved_notice, render_bubble, render_explanation};
pub use daily::{render_daily_quests, REGENERATING};
pub use html::{escape, escape_multiline};
pub use hud::render_hud;
pub use inventory::{render_inventory, render_store};
pub use quests::{render_active_quests, render_completed_quests, render_quest_detail};
