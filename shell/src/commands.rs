//! Line commands
//!
//! The shell reads one command per line. Most commands become a
//! [`UiEvent`] for the controller; the rest are handled by the shell itself.

use oria_core::{Region, SkinId, UiEvent};
use thiserror::Error;

/// Help text printed by `help`
pub const HELP: &str = "\
Commands:
  open <quest>                    Open a quest's detail
  complete <quest> <task>         Complete a sub-task
  daily <id>                      Check off a daily quest
  refresh                         Regenerate daily quests
  quiz <quest> <task>             Generate a quiz for a sub-task
  answer <quest> <task> <a,b,..>  Submit quiz answers (`-` leaves one blank)
  retake <quest> <task>           Clear a submitted quiz
  explain <quest> <task> <n>      Explain a quiz answer
  equip <skin>                    Equip an owned skin
  buy <skin>                      Buy a skin from the store
  spin                            Spin the roulette
  chat <message>                  Talk to ORIA
  goal <goal>                     Generate a quest from a short goal
  leaderboard                     Fetch the leaderboard
  dashboard | profile             Switch view
  show <region>                   Print a region (hud, quests, daily, detail, completed, inventory, store)
  asset <path>                    Fetch a static asset through the cache
  poke                            Click the mascot
  reload                          Reload state from the server
  help                            This text
  quit                            Exit";

/// A parsed line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    /// Forward to the controller
    Event(UiEvent),
    /// Click the mascot
    Poke,
    /// Print a region
    Show(Region),
    /// Fetch an asset
    Asset(String),
    /// Print help
    Help,
}

/// Why a line could not be parsed
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Blank line
    #[error("empty command")]
    Empty,

    /// First word is not a command
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),

    /// Wrong or malformed arguments
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parse one input line
pub fn parse_line(line: &str) -> Result<ShellCommand, ParseError> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));
    let args: Vec<&str> = rest.split_whitespace().collect();

    let event = match word.to_ascii_lowercase().as_str() {
        "" => return Err(ParseError::Empty),
        "help" | "?" => return Ok(ShellCommand::Help),
        "poke" => return Ok(ShellCommand::Poke),
        "show" => {
            let [name] = args.as_slice() else {
                return Err(ParseError::Usage("show <region>"));
            };
            return region(name)
                .map(ShellCommand::Show)
                .ok_or(ParseError::Usage("show <region>"));
        }
        "asset" => {
            let [path] = args.as_slice() else {
                return Err(ParseError::Usage("asset <path>"));
            };
            return Ok(ShellCommand::Asset((*path).to_string()));
        }

        "quit" | "exit" => UiEvent::QuitRequested,
        "reload" => UiEvent::Reload,
        "dashboard" | "home" => UiEvent::ShowDashboard,
        "profile" => UiEvent::ShowProfile,
        "refresh" => UiEvent::RefreshDaily,
        "spin" => UiEvent::SpinRoulette,
        "leaderboard" => UiEvent::LoadLeaderboard,
        "open" => {
            const USAGE: &str = "open <quest>";
            let [quest] = args.as_slice() else {
                return Err(ParseError::Usage(USAGE));
            };
            UiEvent::OpenQuest {
                quest: index(quest, USAGE)?,
            }
        }
        "complete" => {
            let (quest, task) = quest_task(&args, "complete <quest> <task>")?;
            UiEvent::CompleteSubTask { quest, task }
        }
        "quiz" => {
            let (quest, task) = quest_task(&args, "quiz <quest> <task>")?;
            UiEvent::GenerateQuiz { quest, task }
        }
        "retake" => {
            let (quest, task) = quest_task(&args, "retake <quest> <task>")?;
            UiEvent::RetakeQuiz { quest, task }
        }
        "answer" => {
            const USAGE: &str = "answer <quest> <task> <a,b,..>";
            let [quest, task, answers] = args.as_slice() else {
                return Err(ParseError::Usage(USAGE));
            };
            UiEvent::SubmitQuiz {
                quest: index(quest, USAGE)?,
                task: index(task, USAGE)?,
                answers: answers
                    .split(',')
                    .map(|a| match a.trim() {
                        "-" | "_" => Ok(None),
                        a => index(a, USAGE).map(Some),
                    })
                    .collect::<Result<_, _>>()?,
            }
        }
        "explain" => {
            const USAGE: &str = "explain <quest> <task> <n>";
            let [quest, task, question] = args.as_slice() else {
                return Err(ParseError::Usage(USAGE));
            };
            UiEvent::ExplainAnswer {
                quest: index(quest, USAGE)?,
                task: index(task, USAGE)?,
                question: index(question, USAGE)?,
            }
        }
        "daily" => {
            let [id] = args.as_slice() else {
                return Err(ParseError::Usage("daily <id>"));
            };
            UiEvent::DailyChecked {
                id: (*id).to_string(),
            }
        }
        "equip" => {
            let [skin] = args.as_slice() else {
                return Err(ParseError::Usage("equip <skin>"));
            };
            UiEvent::EquipSkin {
                skin: SkinId::new(*skin),
            }
        }
        "buy" => {
            let [skin] = args.as_slice() else {
                return Err(ParseError::Usage("buy <skin>"));
            };
            UiEvent::BuySkin {
                skin: SkinId::new(*skin),
            }
        }
        "chat" | "say" => {
            if rest.is_empty() {
                return Err(ParseError::Usage("chat <message>"));
            }
            UiEvent::SendChat {
                text: rest.to_string(),
            }
        }
        // An empty goal still reaches the controller, which answers it
        "goal" => UiEvent::QuickQuest {
            goal: rest.to_string(),
        },
        other => return Err(ParseError::Unknown(other.to_string())),
    };

    Ok(ShellCommand::Event(event))
}

fn index(arg: &str, usage: &'static str) -> Result<usize, ParseError> {
    arg.parse().map_err(|_| ParseError::Usage(usage))
}

fn quest_task(args: &[&str], usage: &'static str) -> Result<(usize, usize), ParseError> {
    let [quest, task] = args else {
        return Err(ParseError::Usage(usage));
    };
    Ok((index(quest, usage)?, index(task, usage)?))
}

fn region(name: &str) -> Option<Region> {
    match name.to_ascii_lowercase().as_str() {
        "hud" | "stats" => Some(Region::Hud),
        "quests" | "active" => Some(Region::ActiveQuests),
        "daily" => Some(Region::DailyQuests),
        "detail" | "quest" => Some(Region::QuestDetail),
        "completed" => Some(Region::CompletedQuests),
        "inventory" => Some(Region::Inventory),
        "store" => Some(Region::Store),
        _ => None,
    }
}
