//! Controller - The Client Orchestrator
//!
//! The Controller owns the [`Store`] and is the only thing that mutates it.
//! It turns [`UiEvent`]s into [`Command`]s, re-renders the regions a command
//! touched, and drives the [`SyncQueue`] against the [`OriaApi`].
//!
//! # Event Loop
//!
//! Network calls never block event handling. Each request runs on its own
//! tokio task and reports back as a `Completion` on an internal channel;
//! [`Controller::run`] selects over surface events and completions. Tests
//! call [`Controller::handle_event`] directly and then [`Controller::drain`]
//! to settle every outstanding request.
//!
//! Double-triggers are dropped, not queued: a control listed as busy, a spin
//! while `is_spinning`, or a daily quest that is still settling.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;

use crate::api::{
    ApiError, ChatReply, DailyRefresh, ExplainRequest, LeaderboardEntry, OriaApi, Purchase,
    RouletteOutcome, UpdateResponse,
};
use crate::catalog::{self, SkinId, ROULETTE_COST};
use crate::config::ClientConfig;
use crate::error::CommandError;
use crate::events::UiEvent;
use crate::messages::{Control, Input, NotifyLevel, Region, View, ViewMessage};
use crate::model::{ChatEntry, ChatRole, QuizQuestion, UserState};
use crate::store::Store;
use crate::sync::{Command, Effect, FailurePolicy, PersistIntent, SyncQueue, Transition, Undo};
use crate::timers;
use crate::view;

// ============================================================================
// User-facing text
// ============================================================================

const CONNECTION_LOST: &str = "Connection lost. Neural link severed.";
const CHAT_FAILED: &str = "Error communicating with Neural Link.";
const EMPTY_GOAL: &str = "Please enter a short goal to generate a quest!";
const QUICK_QUEST_FAILED: &str = "Failed to generate quest from neural link.";
const QUICK_QUEST_UNREACHABLE: &str = "Error generating quest. Re-establishing link...";
const QUIZ_FAILED: &str = "Error generating quiz.";
const QUIZ_UNREACHABLE: &str = "Connection error.";
const SPIN_UNAFFORDABLE: &str = "Not enough coins to spin!";
const SYSTEM_UNREACHABLE: &str = "Error connecting to system.";
const SPIN_FAILED: &str = "Spin failed.";
const EQUIP_FAILED: &str = "Failed to equip skin";
const PURCHASE_FAILED: &str = "Purchase failed.";
const SYNC_FAILED: &str = "Progress could not be saved. Reload to resync.";

/// Result of a background request, delivered back to the controller
#[derive(Debug)]
enum Completion {
    StateLoaded(Result<UserState, ApiError>),
    HistoryLoaded(Result<Vec<ChatEntry>, ApiError>),
    Persisted(Result<UpdateResponse, ApiError>),
    DailySettled(String),
    DailyRefreshed(Result<DailyRefresh, ApiError>),
    QuizGenerated {
        quest: usize,
        task: usize,
        result: Result<Vec<QuizQuestion>, ApiError>,
    },
    Explained {
        quest: usize,
        task: usize,
        question: usize,
        result: Result<String, ApiError>,
    },
    ChatReplied {
        quick_quest: bool,
        result: Result<ChatReply, ApiError>,
    },
    Spun(Result<RouletteOutcome, ApiError>),
    Bought {
        skin: SkinId,
        result: Result<Purchase, ApiError>,
    },
    LeaderboardLoaded(Result<Vec<LeaderboardEntry>, ApiError>),
}

/// The client orchestrator
pub struct Controller<A: OriaApi + 'static> {
    api: Arc<A>,
    store: Store,
    config: ClientConfig,
    tx: mpsc::Sender<ViewMessage>,
    sync: SyncQueue,
    view: View,
    open_quest: Option<usize>,
    busy: HashSet<Control>,
    is_spinning: bool,
    settling: HashSet<String>,
    buying: Option<SkinId>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    outstanding: usize,
    running: bool,
}

impl<A: OriaApi + 'static> Controller<A> {
    /// Create a controller with an empty, unloaded store
    pub fn new(api: A, config: ClientConfig, tx: mpsc::Sender<ViewMessage>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let sync = SyncQueue::new(config.sync.coalesce);
        Self {
            api: Arc::new(api),
            store: Store::new(),
            config,
            tx,
            sync,
            view: View::default(),
            open_quest: None,
            busy: HashSet::new(),
            is_spinning: false,
            settling: HashSet::new(),
            buying: None,
            completions_tx,
            completions_rx,
            outstanding: 0,
            running: true,
        }
    }

    /// Seed the store as if the state had been fetched
    #[must_use]
    pub fn with_state(mut self, state: UserState) -> Self {
        self.store = Store::with_state(state);
        self
    }

    /// The API client
    pub fn api(&self) -> &A {
        &self.api
    }

    /// The state store
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Current top-level view
    pub fn view(&self) -> View {
        self.view
    }

    /// Quest shown in the detail modal
    pub fn open_quest(&self) -> Option<usize> {
        self.open_quest
    }

    /// Whether a control is waiting on a request
    pub fn is_busy(&self, control: &Control) -> bool {
        self.busy.contains(control)
    }

    /// Whether a roulette spin is in flight
    pub fn is_spinning(&self) -> bool {
        self.is_spinning
    }

    /// Whether a daily quest is inside its settle delay
    pub fn is_settling(&self, id: &str) -> bool {
        self.settling.contains(id)
    }

    /// The persistence queue
    pub fn sync_queue(&self) -> &SyncQueue {
        &self.sync
    }

    /// Background requests not yet handled
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Whether the controller still accepts events
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Event Loop
    // ========================================================================

    /// Process surface events and completions until the surface quits or
    /// the event channel closes
    pub async fn run(&mut self, mut events: mpsc::Receiver<UiEvent>) -> anyhow::Result<()> {
        tracing::info!("Controller started");

        while self.running {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await?,
                    None => {
                        tracing::info!("Event channel closed");
                        break;
                    }
                },
                Some(completion) = self.completions_rx.recv() => {
                    self.outstanding = self.outstanding.saturating_sub(1);
                    self.handle_completion(completion).await?;
                }
            }
        }

        tracing::info!(outstanding = self.outstanding, "Controller stopped");
        Ok(())
    }

    /// Wait for one background request and handle its result.
    ///
    /// Returns false when nothing is outstanding.
    pub async fn step(&mut self) -> anyhow::Result<bool> {
        if self.outstanding == 0 {
            return Ok(false);
        }
        let completion = self
            .completions_rx
            .recv()
            .await
            .context("completion channel closed")?;
        self.outstanding -= 1;
        self.handle_completion(completion).await?;
        Ok(true)
    }

    /// Handle completions until nothing is outstanding, including requests
    /// started by earlier completions
    pub async fn drain(&mut self) -> anyhow::Result<()> {
        while self.step().await? {}
        Ok(())
    }

    fn spawn<F>(&mut self, request: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let tx = self.completions_tx.clone();
        self.outstanding += 1;
        tokio::spawn(async move {
            let _ = tx.send(request.await);
        });
    }

    async fn send(&self, msg: ViewMessage) -> anyhow::Result<()> {
        self.tx.send(msg).await.context("view channel closed")
    }

    async fn alert(&self, message: impl Into<String>) -> anyhow::Result<()> {
        self.send(ViewMessage::Alert {
            message: message.into(),
        })
        .await
    }

    async fn notify(&self, level: NotifyLevel, message: impl Into<String>) -> anyhow::Result<()> {
        self.send(ViewMessage::Notify {
            level,
            message: message.into(),
        })
        .await
    }

    async fn set_busy(&mut self, control: Control, busy: bool) -> anyhow::Result<()> {
        if busy {
            self.busy.insert(control.clone());
        } else {
            self.busy.remove(&control);
        }
        self.send(ViewMessage::Busy { control, busy }).await
    }

    // ========================================================================
    // Surface Events
    // ========================================================================

    /// Handle one surface event
    pub async fn handle_event(&mut self, event: UiEvent) -> anyhow::Result<()> {
        if !self.running {
            tracing::debug!(?event, "Ignoring event after quit");
            return Ok(());
        }

        match event {
            UiEvent::Started | UiEvent::Reload => {
                tracing::info!(server = %self.config.server.base_url, "Loading user state");
                let api = Arc::clone(&self.api);
                self.spawn(async move { Completion::StateLoaded(api.fetch_state().await) });
            }

            UiEvent::QuitRequested => {
                tracing::info!("Quit requested");
                self.running = false;
                self.send(ViewMessage::Quit).await?;
            }

            UiEvent::ShowDashboard => {
                self.view = View::Dashboard;
                self.send(ViewMessage::Navigate { view: self.view }).await?;
            }

            UiEvent::ShowProfile => {
                self.view = View::Profile;
                self.send(ViewMessage::Navigate { view: self.view }).await?;
                self.render(&[Region::Hud, Region::Inventory, Region::CompletedQuests])
                    .await?;
            }

            UiEvent::OpenQuest { quest } => {
                if let Err(e) = self.store.quest(quest) {
                    tracing::debug!(error = %e, "Ignoring open of missing quest");
                    return Ok(());
                }
                self.open_quest = Some(quest);
                self.render(&[Region::QuestDetail]).await?;
                self.send(ViewMessage::ShowQuestDetail { quest }).await?;
            }

            UiEvent::CompleteSubTask { quest, task } => {
                self.commit(Command::CompleteSubTask { quest, task }).await?;
            }

            UiEvent::DailyChecked { id } => self.check_daily(id).await?,

            UiEvent::RefreshDaily => {
                if self.is_busy(&Control::RefreshDaily) {
                    return Ok(());
                }
                self.set_busy(Control::RefreshDaily, true).await?;
                self.send(ViewMessage::Render {
                    region: Region::DailyQuests,
                    html: view::REGENERATING.to_string(),
                })
                .await?;

                let api = Arc::clone(&self.api);
                self.spawn(async move { Completion::DailyRefreshed(api.refresh_daily().await) });
            }

            UiEvent::GenerateQuiz { quest, task } => {
                let control = Control::GenerateQuiz { quest, task };
                if self.is_busy(&control) {
                    return Ok(());
                }
                let topic = match self.store.sub_task(quest, task) {
                    Ok(sub_task) => sub_task.task.clone(),
                    Err(e) => {
                        tracing::debug!(error = %e, "Ignoring quiz request");
                        return Ok(());
                    }
                };
                self.set_busy(control, true).await?;

                let api = Arc::clone(&self.api);
                self.spawn(async move {
                    let result = api.generate_quiz(&topic).await;
                    Completion::QuizGenerated {
                        quest,
                        task,
                        result,
                    }
                });
            }

            UiEvent::SubmitQuiz {
                quest,
                task,
                answers,
            } => {
                self.commit(Command::SubmitQuiz {
                    quest,
                    task,
                    answers,
                })
                .await?;
            }

            UiEvent::RetakeQuiz { quest, task } => {
                self.commit(Command::ResetQuiz { quest, task }).await?;
            }

            UiEvent::ExplainAnswer {
                quest,
                task,
                question,
            } => self.explain(quest, task, question).await?,

            UiEvent::SendChat { text } => self.send_chat(text).await?,

            UiEvent::QuickQuest { goal } => {
                let goal = goal.trim().to_string();
                if goal.is_empty() {
                    return self.alert(EMPTY_GOAL).await;
                }
                if self.is_busy(&Control::QuickQuest) {
                    return Ok(());
                }
                self.set_busy(Control::QuickQuest, true).await?;

                let api = Arc::clone(&self.api);
                self.spawn(async move {
                    Completion::ChatReplied {
                        quick_quest: true,
                        result: api.send_chat(&goal, true).await,
                    }
                });
            }

            UiEvent::SpinRoulette => {
                if self.is_spinning {
                    tracing::debug!("Spin already in progress");
                    return Ok(());
                }
                if self.store.state().coins < ROULETTE_COST {
                    return self.alert(SPIN_UNAFFORDABLE).await;
                }
                self.is_spinning = true;
                self.send(ViewMessage::RouletteSpinning).await?;
                self.set_busy(Control::Spin, true).await?;

                let api = Arc::clone(&self.api);
                self.spawn(async move { Completion::Spun(api.spin_roulette().await) });
            }

            UiEvent::BuySkin { skin } => self.buy(skin).await?,

            UiEvent::EquipSkin { skin } => {
                self.commit(Command::EquipSkin(skin)).await?;
            }

            UiEvent::LoadLeaderboard => {
                let api = Arc::clone(&self.api);
                self.spawn(async move { Completion::LeaderboardLoaded(api.leaderboard().await) });
            }
        }

        Ok(())
    }

    async fn check_daily(&mut self, id: String) -> anyhow::Result<()> {
        if self.settling.contains(&id) {
            tracing::debug!(%id, "Daily quest already settling");
            return Ok(());
        }
        match self.store.daily(&id) {
            Ok(daily) if !daily.completed => {}
            Ok(_) => return Ok(()),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring daily check");
                return Ok(());
            }
        }

        self.settling.insert(id.clone());
        self.send(ViewMessage::DailySettling { id: id.clone() })
            .await?;

        let delay = Duration::from_millis(self.config.sync.settle_ms);
        self.outstanding += 1;
        timers::defer(delay, self.completions_tx.clone(), Completion::DailySettled(id));
        Ok(())
    }

    async fn explain(&mut self, quest: usize, task: usize, question: usize) -> anyhow::Result<()> {
        let control = Control::Explain {
            quest,
            task,
            question,
        };
        if self.is_busy(&control) {
            return Ok(());
        }

        let request = self.store.sub_task(quest, task).ok().and_then(|sub_task| {
            let q = sub_task.quiz_data.as_ref()?.get(question)?;
            let picked = *sub_task.user_answers.as_ref()?.get(question)?;
            Some(ExplainRequest {
                question: q.question.clone(),
                user_answer: q.options.get(picked)?.clone(),
                correct_answer: q.options.get(q.correct_option_index)?.clone(),
            })
        });
        let Some(request) = request else {
            tracing::debug!(quest, task, question, "Nothing to explain");
            return Ok(());
        };

        self.set_busy(control, true).await?;
        let api = Arc::clone(&self.api);
        self.spawn(async move {
            Completion::Explained {
                quest,
                task,
                question,
                result: api.explain(&request).await,
            }
        });
        Ok(())
    }

    async fn send_chat(&mut self, text: String) -> anyhow::Result<()> {
        let text = text.trim().to_string();
        if text.is_empty() || self.is_busy(&Control::SendChat) {
            return Ok(());
        }

        self.send(ViewMessage::ChatBubble {
            role: ChatRole::User,
            html: view::render_bubble(ChatRole::User, &text),
        })
        .await?;
        self.send(ViewMessage::ClearInput { input: Input::Chat })
            .await?;
        self.send(ViewMessage::Typing { active: true }).await?;
        self.set_busy(Control::SendChat, true).await?;

        let api = Arc::clone(&self.api);
        self.spawn(async move {
            Completion::ChatReplied {
                quick_quest: false,
                result: api.send_chat(&text, false).await,
            }
        });
        Ok(())
    }

    async fn buy(&mut self, skin: SkinId) -> anyhow::Result<()> {
        let control = Control::Buy { skin: skin.clone() };
        if self.buying.is_some() || self.is_busy(&control) {
            return Ok(());
        }

        let state = self.store.state();
        let rejection = match catalog::find_item(&skin) {
            None => Err(CommandError::UnknownSkin(skin.clone())),
            Some(_) if state.owns(&skin) => Err(CommandError::AlreadyOwned(skin.clone())),
            Some(item) if state.coins < item.cost => Err(CommandError::InsufficientCoins {
                needed: item.cost,
                available: state.coins,
            }),
            Some(item) => Ok(item.cost),
        };
        let price = match rejection {
            Ok(price) => price,
            Err(e) => return self.reject(&e).await,
        };

        self.buying = Some(skin.clone());
        self.set_busy(control, true).await?;
        self.render(&[Region::Store]).await?;

        let api = Arc::clone(&self.api);
        self.spawn(async move {
            let result = api.buy_skin(&skin, price).await;
            Completion::Bought { skin, result }
        });
        Ok(())
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Apply a command, surfacing a rejection to the user.
    ///
    /// Returns whether the command was applied.
    async fn commit(&mut self, command: Command) -> anyhow::Result<bool> {
        match self.try_apply(command) {
            Ok(transition) => {
                self.publish(transition).await?;
                Ok(true)
            }
            Err(e) => {
                self.reject(&e).await?;
                Ok(false)
            }
        }
    }

    fn try_apply(&mut self, command: Command) -> Result<Transition, CommandError> {
        tracing::debug!(?command, "Applying command");
        command.apply(&mut self.store)
    }

    async fn reject(&self, error: &CommandError) -> anyhow::Result<()> {
        tracing::debug!(%error, "Command rejected");
        match error.user_message() {
            Some(message) => self.alert(message).await,
            None => Ok(()),
        }
    }

    /// Redraw, announce and persist an applied transition
    async fn publish(&mut self, transition: Transition) -> anyhow::Result<()> {
        let Transition {
            effects,
            redraw,
            intent,
            undo,
        } = transition;

        self.render(&redraw).await?;

        for effect in effects {
            match effect {
                Effect::XpAwarded(award) => {
                    if award.leveled_up() {
                        tracing::info!(level = award.new_level, "Level up");
                        self.send(ViewMessage::LevelUp {
                            level: award.new_level,
                        })
                        .await?;
                    }
                }
                Effect::SkinChanged(_) => self.send_mascot_skin().await?,
                Effect::QuizScored { quest, score } => {
                    tracing::info!(quest, score, "Quiz graded");
                }
            }
        }

        if let Some(intent) = intent {
            self.sync.enqueue(intent, undo);
            self.pump_sync();
        }
        Ok(())
    }

    fn pump_sync(&mut self) {
        let Some(intent) = self.sync.start_next().cloned() else {
            return;
        };
        tracing::debug!(?intent, waiting = self.sync.waiting(), "Sending sync");

        let api = Arc::clone(&self.api);
        match intent {
            PersistIntent::FullState => {
                let snapshot = self.store.state().clone();
                self.spawn(async move { Completion::Persisted(api.save_state(&snapshot).await) });
            }
            PersistIntent::Equip(skin) => {
                self.spawn(async move {
                    let result = api
                        .equip_skin(&skin)
                        .await
                        .map(|()| UpdateResponse::default());
                    Completion::Persisted(result)
                });
            }
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    fn region_html(&self, region: Region) -> Option<String> {
        let state = self.store.state();
        match region {
            Region::Hud => Some(view::render_hud(state)),
            Region::ActiveQuests => Some(view::render_active_quests(state)),
            Region::DailyQuests => Some(view::render_daily_quests(state, &self.settling)),
            Region::QuestDetail => self
                .open_quest
                .and_then(|quest| view::render_quest_detail(state, quest)),
            Region::CompletedQuests => Some(view::render_completed_quests(state)),
            Region::Inventory => Some(view::render_inventory(state)),
            Region::Store => Some(view::render_store(state, self.buying.as_ref())),
        }
    }

    async fn render(&self, regions: &[Region]) -> anyhow::Result<()> {
        for &region in regions {
            if let Some(html) = self.region_html(region) {
                self.send(ViewMessage::Render { region, html }).await?;
            }
        }
        Ok(())
    }

    async fn send_mascot_skin(&self) -> anyhow::Result<()> {
        let skin = self.store.state().equipped_skin.clone();
        let image = catalog::skin_image(&skin).to_string();
        self.send(ViewMessage::MascotSkin { skin, image }).await
    }

    async fn record_achievements(&mut self, ids: Vec<String>) -> anyhow::Result<()> {
        if !self.config.sync.track_achievements {
            return Ok(());
        }
        for id in ids {
            if self.store.state_mut().unlock_achievement(&id) {
                tracing::info!(%id, "Achievement unlocked");
                self.send(ViewMessage::AchievementUnlocked { id }).await?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Completions
    // ========================================================================

    async fn handle_completion(&mut self, completion: Completion) -> anyhow::Result<()> {
        match completion {
            Completion::StateLoaded(Ok(state)) => {
                tracing::info!(
                    level = state.level,
                    quests = state.quests.len(),
                    "User state loaded"
                );
                let first_load = !self.store.is_loaded();
                self.store.replace(state);
                self.render(&Region::ALL).await?;
                self.send_mascot_skin().await?;

                if first_load {
                    let api = Arc::clone(&self.api);
                    self.spawn(async move { Completion::HistoryLoaded(api.chat_history().await) });
                }
            }
            Completion::StateLoaded(Err(e)) => {
                tracing::error!(error = %e, "Failed to load user state");
                self.notify(NotifyLevel::Error, SYSTEM_UNREACHABLE).await?;
            }

            Completion::HistoryLoaded(Ok(history)) => {
                if history.is_empty() {
                    return Ok(());
                }
                self.send(ViewMessage::ChatCleared).await?;
                for entry in history {
                    self.send(ViewMessage::ChatBubble {
                        role: entry.role,
                        html: view::render_bubble(entry.role, &entry.content),
                    })
                    .await?;
                }
            }
            Completion::HistoryLoaded(Err(e)) => {
                tracing::warn!(error = %e, "Failed to load chat history");
            }

            Completion::Persisted(result) => self.finish_sync(result).await?,

            Completion::DailySettled(id) => {
                self.settling.remove(&id);
                if !self.commit(Command::CompleteDailyQuest { id }).await? {
                    self.render(&[Region::DailyQuests]).await?;
                }
            }

            Completion::DailyRefreshed(result) => {
                self.set_busy(Control::RefreshDaily, false).await?;
                match result {
                    Ok(refresh) if refresh.success => {
                        self.commit(Command::ReplaceDailyQuests(refresh.daily_quests))
                            .await?;
                        return Ok(());
                    }
                    Ok(_) => tracing::warn!("Daily refresh declined"),
                    Err(e) => tracing::warn!(error = %e, "Daily refresh failed"),
                }
                self.render(&[Region::DailyQuests]).await?;
            }

            Completion::QuizGenerated {
                quest,
                task,
                result,
            } => {
                let control = Control::GenerateQuiz { quest, task };
                self.busy.remove(&control);
                let failure = match result {
                    Ok(quiz) => match self.try_apply(Command::AttachQuiz { quest, task, quiz }) {
                        Ok(transition) => {
                            self.open_quest = Some(quest);
                            return self.publish(transition).await;
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Generated quiz not attached");
                            QUIZ_FAILED
                        }
                    },
                    Err(e) if e.is_transport() => {
                        tracing::error!(error = %e, "Quiz generation unreachable");
                        QUIZ_UNREACHABLE
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Quiz generation failed");
                        QUIZ_FAILED
                    }
                };
                self.alert(failure).await?;
                self.set_busy(control, false).await?;
            }

            Completion::Explained {
                quest,
                task,
                question,
                result,
            } => {
                let control = Control::Explain {
                    quest,
                    task,
                    question,
                };
                match result {
                    Ok(text) => {
                        self.busy.remove(&control);
                        self.send(ViewMessage::Explanation {
                            quest,
                            task,
                            question,
                            html: view::render_explanation(&text),
                        })
                        .await?;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Explanation failed");
                        self.set_busy(control, false).await?;
                    }
                }
            }

            Completion::ChatReplied {
                quick_quest: false,
                result,
            } => self.finish_chat(result).await?,

            Completion::ChatReplied {
                quick_quest: true,
                result,
            } => self.finish_quick_quest(result).await?,

            Completion::Spun(result) => {
                self.is_spinning = false;
                self.set_busy(Control::Spin, false).await?;
                match result {
                    Ok(outcome) => {
                        let name = catalog::skin_name(&outcome.unlocked_skin);
                        let image = catalog::skin_image(&outcome.unlocked_skin).to_string();
                        tracing::info!(skin = %outcome.unlocked_skin, coins = outcome.coins, "Roulette won");

                        self.commit(Command::SettleSkinPurchase {
                            skin: outcome.unlocked_skin,
                            coins: outcome.coins,
                        })
                        .await?;
                        self.send_mascot_skin().await?;
                        self.send(ViewMessage::RouletteResult {
                            image,
                            message: format!("You unlocked {name}! 🎉"),
                            success: true,
                        })
                        .await?;
                        self.record_achievements(outcome.newly_unlocked).await?;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Roulette failed");
                        let message = if e.is_transport() {
                            SYSTEM_UNREACHABLE
                        } else {
                            e.server_message().unwrap_or(SPIN_FAILED)
                        };
                        self.send(ViewMessage::RouletteResult {
                            image: self.config.mascot.frames.blinking.clone(),
                            message: message.to_string(),
                            success: false,
                        })
                        .await?;
                    }
                }
            }

            Completion::Bought { skin, result } => {
                self.buying = None;
                self.set_busy(Control::Buy { skin: skin.clone() }, false)
                    .await?;
                match result {
                    Ok(purchase) => {
                        tracing::info!(%skin, coins = purchase.coins, "Skin purchased");
                        let name = catalog::skin_name(&skin);
                        self.commit(Command::SettleSkinPurchase {
                            skin,
                            coins: purchase.coins,
                        })
                        .await?;
                        self.notify(NotifyLevel::Success, format!("Purchased {name}!"))
                            .await?;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, %skin, "Purchase failed");
                        let message = if e.is_transport() {
                            SYSTEM_UNREACHABLE
                        } else {
                            e.server_message().unwrap_or(PURCHASE_FAILED)
                        };
                        self.alert(message).await?;
                        self.render(&[Region::Store]).await?;
                    }
                }
            }

            Completion::LeaderboardLoaded(Ok(entries)) => {
                tracing::info!(entries = entries.len(), "Leaderboard loaded");
                for entry in &entries {
                    tracing::debug!(
                        username = %entry.username,
                        level = entry.level,
                        xp = entry.xp,
                        streak = entry.current_streak,
                        me = entry.is_current_user,
                        "Leaderboard entry"
                    );
                }
            }
            Completion::LeaderboardLoaded(Err(e)) => {
                tracing::warn!(error = %e, "Failed to load leaderboard");
            }
        }

        Ok(())
    }

    async fn finish_sync(&mut self, result: Result<UpdateResponse, ApiError>) -> anyhow::Result<()> {
        let Some(pending) = self.sync.finish() else {
            tracing::warn!("Sync completion with nothing in flight");
            return Ok(());
        };

        match result {
            Ok(response) => {
                tracing::debug!(intent = ?pending.intent, "Sync confirmed");
                self.record_achievements(response.newly_unlocked).await?;
            }
            Err(e) => match pending.policy {
                FailurePolicy::Rollback(undo) => {
                    tracing::warn!(error = %e, intent = ?pending.intent, "Sync rejected, rolling back");
                    let fallback = match undo {
                        Undo::EquippedSkin { .. } => EQUIP_FAILED,
                    };
                    let regions = undo.restore(&mut self.store);
                    if !regions.is_empty() {
                        self.render(&regions).await?;
                        self.send_mascot_skin().await?;
                    }

                    if e.is_transport() {
                        self.notify(NotifyLevel::Error, SYSTEM_UNREACHABLE).await?;
                    } else {
                        self.alert(e.server_message().unwrap_or(fallback)).await?;
                    }
                }
                FailurePolicy::Reconcile => {
                    tracing::warn!(error = %e, intent = ?pending.intent, "Sync failed, local state is ahead of server");
                    self.store.mark_stale();
                    self.notify(NotifyLevel::Warning, SYNC_FAILED).await?;
                }
            },
        }

        self.pump_sync();
        Ok(())
    }

    async fn finish_chat(&mut self, result: Result<ChatReply, ApiError>) -> anyhow::Result<()> {
        self.send(ViewMessage::Typing { active: false }).await?;
        self.set_busy(Control::SendChat, false).await?;

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                let text = if e.is_transport() {
                    tracing::error!(error = %e, "Chat unreachable");
                    CONNECTION_LOST
                } else {
                    tracing::warn!(error = %e, "Chat failed");
                    CHAT_FAILED
                };
                return self.assistant_bubble(text).await;
            }
        };

        let Some(text) = reply.reply else {
            return self.assistant_bubble(CHAT_FAILED).await;
        };
        self.assistant_bubble(&text).await?;

        if let (true, Some(quest)) = (reply.quest_added, reply.quest) {
            let title = quest.title.clone();
            // The server already saved this quest
            if self
                .commit(Command::AddQuest {
                    quest,
                    persist: false,
                })
                .await?
            {
                self.assistant_bubble(&view::quest_saved_notice(&title))
                    .await?;
            }
        }
        Ok(())
    }

    async fn finish_quick_quest(
        &mut self,
        result: Result<ChatReply, ApiError>,
    ) -> anyhow::Result<()> {
        self.set_busy(Control::QuickQuest, false).await?;

        match result {
            Ok(reply) => {
                self.send(ViewMessage::ClearInput {
                    input: Input::QuickQuest,
                })
                .await?;
                match reply.quest {
                    Some(quest) => {
                        tracing::info!(title = %quest.title, "Quick quest generated");
                        self.commit(Command::AddQuest {
                            quest,
                            persist: true,
                        })
                        .await?;
                    }
                    None => self.alert(QUICK_QUEST_FAILED).await?,
                }
            }
            Err(e) if e.is_transport() => {
                tracing::error!(error = %e, "Quick quest unreachable");
                self.alert(QUICK_QUEST_UNREACHABLE).await?;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Quick quest failed");
                self.send(ViewMessage::ClearInput {
                    input: Input::QuickQuest,
                })
                .await?;
                self.alert(QUICK_QUEST_FAILED).await?;
            }
        }
        Ok(())
    }

    async fn assistant_bubble(&self, text: &str) -> anyhow::Result<()> {
        self.send(ViewMessage::ChatBubble {
            role: ChatRole::Assistant,
            html: view::render_bubble(ChatRole::Assistant, text),
        })
        .await
    }
}
