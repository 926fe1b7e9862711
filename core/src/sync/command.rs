//! State Commands
//!
//! Every change to the [`Store`] is a [`Command`]. Applying a command mutates
//! the store synchronously and returns a [`Transition`] describing what
//! happened: which regions to redraw, what to tell the user, what to persist
//! and how to undo it.
//!
//! A command that fails validation leaves the store untouched.

use crate::catalog::SkinId;
use crate::error::CommandError;
use crate::messages::Region;
use crate::model::{DailyQuest, Quest, QuizQuestion};
use crate::progression::{self, XpAward};
use crate::store::Store;

use super::queue::PersistIntent;

/// A state change
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Mark a sub-task done and award its XP
    CompleteSubTask {
        /// Quest index
        quest: usize,
        /// Sub-task index
        task: usize,
    },

    /// Mark a daily quest done and award its XP
    CompleteDailyQuest {
        /// Daily quest id
        id: String,
    },

    /// Replace today's daily quests with a server-generated list
    ReplaceDailyQuests(Vec<DailyQuest>),

    /// Attach a freshly generated quiz to a sub-task
    AttachQuiz {
        /// Quest index
        quest: usize,
        /// Sub-task index
        task: usize,
        /// Questions
        quiz: Vec<QuizQuestion>,
    },

    /// Grade and record a quiz attempt
    SubmitQuiz {
        /// Quest index
        quest: usize,
        /// Sub-task index
        task: usize,
        /// Selected option per question
        answers: Vec<Option<usize>>,
    },

    /// Drop a sub-task's quiz and attempt
    ResetQuiz {
        /// Quest index
        quest: usize,
        /// Sub-task index
        task: usize,
    },

    /// Append a quest
    AddQuest {
        /// The quest
        quest: Quest,
        /// Whether the client must push it (false when the server saved it)
        persist: bool,
    },

    /// Equip an owned skin
    EquipSkin(SkinId),

    /// Record a server-confirmed skin acquisition and the resulting balance
    SettleSkinPurchase {
        /// Skin acquired
        skin: SkinId,
        /// Balance reported by the server
        coins: u32,
    },
}

/// Observable consequence of a command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// XP (and coins) were awarded
    XpAwarded(XpAward),
    /// The equipped skin changed
    SkinChanged(SkinId),
    /// A quiz attempt was graded
    QuizScored {
        /// Quest index
        quest: usize,
        /// Score in percent
        score: u32,
    },
}

/// Field-level restore for an optimistic change
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Undo {
    /// Put the previously equipped skin back
    EquippedSkin {
        /// Skin equipped before the change
        previous: SkinId,
        /// Skin the change equipped
        attempted: SkinId,
    },
}

impl Undo {
    /// Restore the recorded value; returns the regions to redraw.
    ///
    /// A later change to the same field wins: if the store no longer holds
    /// the value this undo was recorded for, nothing is restored.
    pub fn restore(self, store: &mut Store) -> Vec<Region> {
        match self {
            Self::EquippedSkin { previous, attempted } => {
                let equipped = &mut store.state_mut().equipped_skin;
                if *equipped != attempted {
                    tracing::debug!(%attempted, current = %equipped, "Equip superseded, keeping current skin");
                    return Vec::new();
                }
                tracing::debug!(skin = %previous, "Restoring equipped skin");
                *equipped = previous;
                vec![Region::Inventory]
            }
        }
    }
}

/// Result of applying a command
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transition {
    /// What happened
    pub effects: Vec<Effect>,
    /// Regions whose contents changed
    pub redraw: Vec<Region>,
    /// What to push to the server, if anything
    pub intent: Option<PersistIntent>,
    /// How to revert if the push fails
    pub undo: Option<Undo>,
}

impl Transition {
    fn redraw(regions: &[Region]) -> Self {
        Self {
            redraw: regions.to_vec(),
            ..Default::default()
        }
    }

    fn persist(mut self, intent: PersistIntent) -> Self {
        self.intent = Some(intent);
        self
    }

    fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// The XP award carried by this transition
    pub fn xp_award(&self) -> Option<&XpAward> {
        self.effects.iter().find_map(|e| match e {
            Effect::XpAwarded(award) => Some(award),
            _ => None,
        })
    }
}

impl Command {
    /// Apply to the store
    pub fn apply(self, store: &mut Store) -> Result<Transition, CommandError> {
        match self {
            Self::CompleteSubTask { quest, task } => {
                let sub_task = store.sub_task_mut(quest, task)?;
                if sub_task.completed {
                    return Err(CommandError::AlreadyCompleted);
                }
                sub_task.completed = true;
                let reward = sub_task.reward();

                let award = progression::award_xp(store.state_mut(), reward);
                Ok(Transition::redraw(&[
                    Region::Hud,
                    Region::ActiveQuests,
                    Region::CompletedQuests,
                    Region::QuestDetail,
                ])
                .effect(Effect::XpAwarded(award))
                .persist(PersistIntent::FullState))
            }

            Self::CompleteDailyQuest { id } => {
                let daily = store.daily_mut(&id)?;
                if daily.completed {
                    return Err(CommandError::AlreadyCompleted);
                }
                daily.completed = true;
                let reward = daily.xp_reward;

                let award = progression::award_xp(store.state_mut(), reward);
                Ok(Transition::redraw(&[Region::Hud, Region::DailyQuests])
                    .effect(Effect::XpAwarded(award))
                    .persist(PersistIntent::FullState))
            }

            Self::ReplaceDailyQuests(daily_quests) => {
                store.state_mut().daily_quests = daily_quests;
                Ok(Transition::redraw(&[Region::DailyQuests]))
            }

            Self::AttachQuiz { quest, task, quiz } => {
                if quiz.is_empty() {
                    return Err(CommandError::NoQuiz);
                }
                let sub_task = store.sub_task_mut(quest, task)?;
                sub_task.clear_quiz();
                sub_task.quiz_data = Some(quiz);
                Ok(Transition::redraw(&[Region::QuestDetail]).persist(PersistIntent::FullState))
            }

            Self::SubmitQuiz {
                quest,
                task,
                answers,
            } => {
                let sub_task = store.sub_task_mut(quest, task)?;
                let questions = sub_task.quiz_data.as_deref().ok_or(CommandError::NoQuiz)?;
                let result = progression::score_quiz(questions, &answers)?;

                sub_task.quiz_score = Some(result.score);
                sub_task.user_answers = Some(result.answers);
                Ok(Transition::redraw(&[Region::QuestDetail])
                    .effect(Effect::QuizScored {
                        quest,
                        score: result.score,
                    })
                    .persist(PersistIntent::FullState))
            }

            Self::ResetQuiz { quest, task } => {
                store.sub_task_mut(quest, task)?.clear_quiz();
                Ok(Transition::redraw(&[Region::QuestDetail]).persist(PersistIntent::FullState))
            }

            Self::AddQuest { quest, persist } => {
                store.state_mut().quests.push(quest);
                let transition =
                    Transition::redraw(&[Region::ActiveQuests, Region::CompletedQuests]);
                Ok(if persist {
                    transition.persist(PersistIntent::FullState)
                } else {
                    transition
                })
            }

            Self::EquipSkin(skin) => {
                if !store.state().owns(&skin) {
                    return Err(CommandError::NotOwned(skin));
                }
                let previous =
                    std::mem::replace(&mut store.state_mut().equipped_skin, skin.clone());

                let mut transition = Transition::redraw(&[Region::Inventory])
                    .effect(Effect::SkinChanged(skin.clone()))
                    .persist(PersistIntent::Equip(skin.clone()));
                transition.undo = Some(Undo::EquippedSkin {
                    previous,
                    attempted: skin,
                });
                Ok(transition)
            }

            Self::SettleSkinPurchase { skin, coins } => {
                let state = store.state_mut();
                state.coins = coins;
                state.grant_skin(skin);
                Ok(Transition::redraw(&[
                    Region::Hud,
                    Region::Inventory,
                    Region::Store,
                ]))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SubTask, UserState};
    use pretty_assertions::assert_eq;

    fn quiz() -> Vec<QuizQuestion> {
        (0..3)
            .map(|i| QuizQuestion {
                question: format!("Q{i}"),
                options: vec!["a".into(), "b".into()],
                correct_option_index: 1,
            })
            .collect()
    }

    fn store() -> Store {
        Store::with_state(UserState {
            xp: 90,
            quests: vec![Quest::new(
                "Learn Rust",
                "Hard",
                [SubTask::new("Ownership"), SubTask::new("Traits").with_reward(30)],
            )],
            daily_quests: vec![DailyQuest {
                id: "daily_1".into(),
                task: "Stretch".into(),
                xp_reward: 20,
                completed: false,
            }],
            owned_skins: vec![SkinId::default(), SkinId::from("skin_1")],
            ..Default::default()
        })
    }

    #[test]
    fn test_complete_sub_task_awards_default_xp() {
        let mut store = store();
        let transition = Command::CompleteSubTask { quest: 0, task: 0 }
            .apply(&mut store)
            .unwrap();

        let award = transition.xp_award().unwrap();
        assert_eq!(award.amount, 50);
        assert!(award.leveled_up());
        assert_eq!(store.state().level, 2);
        assert_eq!(store.state().xp, 40);
        assert_eq!(store.state().coins, 25);
        assert_eq!(transition.intent, Some(PersistIntent::FullState));
        assert!(transition.undo.is_none());
    }

    #[test]
    fn test_double_completion_rejected_without_award() {
        let mut store = store();
        Command::CompleteSubTask { quest: 0, task: 1 }
            .apply(&mut store)
            .unwrap();
        let xp = store.state().xp;

        let err = Command::CompleteSubTask { quest: 0, task: 1 }
            .apply(&mut store)
            .unwrap_err();
        assert_eq!(err, CommandError::AlreadyCompleted);
        assert_eq!(store.state().xp, xp);
    }

    #[test]
    fn test_complete_daily() {
        let mut store = store();
        let transition = Command::CompleteDailyQuest {
            id: "daily_1".into(),
        }
        .apply(&mut store)
        .unwrap();

        assert!(store.daily("daily_1").unwrap().completed);
        assert_eq!(transition.redraw, vec![Region::Hud, Region::DailyQuests]);
        assert_eq!(store.state().coins, 10);
    }

    #[test]
    fn test_incomplete_quiz_changes_nothing() {
        let mut store = store();
        Command::AttachQuiz {
            quest: 0,
            task: 0,
            quiz: quiz(),
        }
        .apply(&mut store)
        .unwrap();
        let before = store.state().clone();

        let err = Command::SubmitQuiz {
            quest: 0,
            task: 0,
            answers: vec![Some(1), None, Some(0)],
        }
        .apply(&mut store)
        .unwrap_err();

        assert_eq!(err, CommandError::IncompleteQuiz);
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_submit_then_reset_quiz() {
        let mut store = store();
        Command::AttachQuiz {
            quest: 0,
            task: 0,
            quiz: quiz(),
        }
        .apply(&mut store)
        .unwrap();

        let transition = Command::SubmitQuiz {
            quest: 0,
            task: 0,
            answers: vec![Some(1), Some(1), Some(0)],
        }
        .apply(&mut store)
        .unwrap();
        assert_eq!(
            transition.effects,
            vec![Effect::QuizScored { quest: 0, score: 67 }]
        );
        let sub_task = store.sub_task(0, 0).unwrap();
        assert_eq!(sub_task.quiz_score, Some(67));
        assert_eq!(sub_task.user_answers, Some(vec![1, 1, 0]));

        Command::ResetQuiz { quest: 0, task: 0 }
            .apply(&mut store)
            .unwrap();
        let sub_task = store.sub_task(0, 0).unwrap();
        assert!(sub_task.quiz_data.is_none());
        assert!(sub_task.quiz_score.is_none());
        assert!(sub_task.user_answers.is_none());
    }

    #[test]
    fn test_equip_records_undo() {
        let mut store = store();
        let transition = Command::EquipSkin(SkinId::from("skin_1"))
            .apply(&mut store)
            .unwrap();
        assert_eq!(store.state().equipped_skin, SkinId::from("skin_1"));

        let undo = transition.undo.unwrap();
        assert_eq!(undo.clone().restore(&mut store), vec![Region::Inventory]);
        assert!(store.state().equipped_skin.is_default());
    }

    #[test]
    fn test_superseded_equip_undo_keeps_newer_skin() {
        let mut store = store();
        store.state_mut().owned_skins.push(SkinId::from("skin_2"));
        let first = Command::EquipSkin(SkinId::from("skin_1"))
            .apply(&mut store)
            .unwrap();
        Command::EquipSkin(SkinId::from("skin_2"))
            .apply(&mut store)
            .unwrap();

        assert!(first.undo.unwrap().restore(&mut store).is_empty());
        assert_eq!(store.state().equipped_skin, SkinId::from("skin_2"));
    }

    #[test]
    fn test_equip_unowned_rejected() {
        let mut store = store();
        let err = Command::EquipSkin(SkinId::from("skin_5"))
            .apply(&mut store)
            .unwrap_err();
        assert_eq!(err, CommandError::NotOwned(SkinId::from("skin_5")));
    }

    #[test]
    fn test_add_quest_persist_flag() {
        let mut store = store();
        let saved = Command::AddQuest {
            quest: Quest::new("From chat", "Easy", []),
            persist: false,
        }
        .apply(&mut store)
        .unwrap();
        assert!(saved.intent.is_none());

        let local = Command::AddQuest {
            quest: Quest::new("Quick", "Easy", [SubTask::new("a")]),
            persist: true,
        }
        .apply(&mut store)
        .unwrap();
        assert_eq!(local.intent, Some(PersistIntent::FullState));
        assert_eq!(store.state().quests.len(), 3);
    }

    #[test]
    fn test_settle_purchase() {
        let mut store = store();
        Command::SettleSkinPurchase {
            skin: SkinId::from("skin_4"),
            coins: 12,
        }
        .apply(&mut store)
        .unwrap();
        assert_eq!(store.state().coins, 12);
        assert!(store.state().owns(&SkinId::from("skin_4")));
    }
}
