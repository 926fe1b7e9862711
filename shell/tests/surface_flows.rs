//! Controller output applied to a headless page

use oria_core::api::Endpoint;
use oria_core::catalog::skin_image;
use oria_core::{
    ClientConfig, Controller, Quest, Region, ScriptedApi, SkinId, SubTask, UiEvent, UserState,
    ViewMessage,
};
use oria_shell::surface::{region_container, HIDDEN, SHOWN};
use oria_shell::{Document, DomSurface, HeadlessDocument, SurfaceOutput};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::mpsc;

fn seeded() -> UserState {
    UserState {
        level: 3,
        xp: 20,
        coins: 150,
        quests: vec![Quest::new(
            "Learn Rust",
            "Hard",
            [SubTask::new("Ownership"), SubTask::new("Borrowing")],
        )],
        owned_skins: vec![SkinId::default(), SkinId::from("skin_1")],
        ..Default::default()
    }
}

struct Page {
    controller: Controller<ScriptedApi>,
    rx: mpsc::Receiver<ViewMessage>,
    surface: DomSurface<HeadlessDocument>,
}

impl Page {
    fn new(api: ScriptedApi) -> Self {
        let (tx, rx) = mpsc::channel(1024);
        Self {
            controller: Controller::new(api, ClientConfig::default(), tx),
            rx,
            surface: DomSurface::new(HeadlessDocument::oria_page()),
        }
    }

    fn seeded(api: ScriptedApi) -> Self {
        let mut page = Self::new(api);
        page.controller = page.controller.with_state(seeded());
        page
    }

    /// Handle an event, settle requests and apply everything to the page
    async fn event(&mut self, event: UiEvent) -> Vec<SurfaceOutput> {
        self.controller.handle_event(event).await.unwrap();
        self.controller.drain().await.unwrap();

        let mut out = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            out.push(self.surface.apply(msg));
        }
        out
    }

    fn doc(&self) -> &HeadlessDocument {
        self.surface.document()
    }
}

fn lines(out: &[SurfaceOutput]) -> Vec<&str> {
    out.iter()
        .filter_map(|o| match o {
            SurfaceOutput::Line(line) => Some(line.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn startup_fills_regions_and_chat() {
    let api = ScriptedApi::new();
    api.ok(
        Endpoint::UserState,
        json!({
            "level": 2, "xp": 10, "coins": 40,
            "quests": [{"title": "Learn Rust", "difficulty": "Hard",
                        "sub_tasks": [{"task": "Ownership", "completed": false}]}]
        }),
    );
    api.ok(
        Endpoint::ChatHistory,
        json!({"history": [{"role": "assistant", "content": "Welcome back"}]}),
    );
    let mut page = Page::new(api);

    let out = page.event(UiEvent::Started).await;

    let active = page.surface.region_text(Region::ActiveQuests).unwrap();
    assert!(active.contains("Learn Rust"), "{active}");
    assert!(page.doc().exists("user-level"));
    let hud = page.surface.region_text(Region::Hud).unwrap();
    assert!(hud.contains("Lv. 2"), "{hud}");
    assert!(page.doc().exists("roulette-display-img"));
    assert!(page
        .doc()
        .inner_html("chat-messages")
        .unwrap()
        .contains("Welcome back"));
    assert!(lines(&out).contains(&"ORIA: Welcome back"));
    assert!(lines(&out).contains(&"[updated] Active quests"));
}

#[tokio::test]
async fn profile_hides_dashboard_and_header_stats() {
    let mut page = Page::seeded(ScriptedApi::new());
    page.event(UiEvent::ShowProfile).await;
    // Hud rerender must keep the header hidden
    page.surface.apply(ViewMessage::Render {
        region: Region::Hud,
        html: oria_core::view::render_hud(page.controller.store().state()),
    });

    let doc = page.doc();
    assert!(doc.has_class("dashboard-view", HIDDEN));
    assert!(!doc.has_class("profile-view", HIDDEN));
    assert!(doc.has_class("header-gamification-stats", HIDDEN));
    assert!(doc.has_class("nav-btn-profile", "active"));
    assert!(!doc.has_class("nav-btn-home", "active"));

    page.event(UiEvent::ShowDashboard).await;
    let doc = page.doc();
    assert!(!doc.has_class("dashboard-view", HIDDEN));
    assert!(doc.has_class("profile-view", HIDDEN));
    assert!(!doc.has_class("header-gamification-stats", HIDDEN));
}

#[tokio::test]
async fn equip_swaps_mascot_images() {
    let api = ScriptedApi::new();
    api.ok(Endpoint::Equip, json!({"success": true}));
    let mut page = Page::seeded(api);

    page.event(UiEvent::EquipSkin {
        skin: SkinId::from("skin_1"),
    })
    .await;

    let expected = skin_image(&SkinId::from("skin_1"));
    for id in oria_shell::mascot::MASCOT_IDS {
        assert_eq!(page.doc().attribute(id, "src").as_deref(), Some(expected));
    }
}

#[tokio::test]
async fn finishing_a_quest_shows_level_up_modal() {
    let mut page = Page::seeded(ScriptedApi::new());
    page.event(UiEvent::CompleteSubTask { quest: 0, task: 0 })
        .await;
    let out = page
        .event(UiEvent::CompleteSubTask { quest: 0, task: 1 })
        .await;

    assert!(page.doc().has_class("levelUpModal", SHOWN));
    assert_eq!(page.doc().inner_html("newLevelText").as_deref(), Some("4"));
    assert!(lines(&out).contains(&"LEVEL UP! You reached level 4"));

    let completed = page.surface.region_text(Region::CompletedQuests).unwrap();
    assert!(completed.contains("Learn Rust"));
}

#[tokio::test]
async fn roulette_result_lands_in_store_panel() {
    let api = ScriptedApi::new();
    api.ok(
        Endpoint::Roulette,
        json!({"success": true, "coins": 50, "unlocked_skin": "skin_3"}),
    );
    let mut page = Page::seeded(api);
    page.event(UiEvent::ShowProfile).await;
    page.surface.apply(ViewMessage::Render {
        region: Region::Store,
        html: oria_core::view::render_store(page.controller.store().state(), None),
    });
    assert!(page.doc().exists(region_container(Region::Store)));

    let out = page.event(UiEvent::SpinRoulette).await;

    assert_eq!(
        page.doc().attribute("roulette-display-img", "src").as_deref(),
        Some("/static/img/skins/IMG_8475.PNG")
    );
    assert!(lines(&out).contains(&"Spinning..."));
}

#[tokio::test]
async fn quit_stops_the_surface() {
    let mut page = Page::seeded(ScriptedApi::new());
    let out = page.event(UiEvent::QuitRequested).await;
    assert_eq!(out, vec![SurfaceOutput::Quit]);
}
