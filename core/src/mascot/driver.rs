//! Mascot Driver
//!
//! Runs a [`MascotAnimator`] on its own tokio task with real timers. The
//! surface talks to it through a [`MascotHandle`].

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::animator::MascotAnimator;
use super::element::MascotElement;
use super::frames::{MascotFrames, MascotTiming, SkinMode};
use crate::catalog::SkinId;
use crate::timers::TokioTimers;

/// Commands accepted by a running mascot
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MascotCommand {
    /// The element was clicked
    Click,
    /// A different skin was equipped
    SetSkin(SkinId),
    /// Stop the idle loops (page hidden)
    Pause,
    /// Restart the idle loops
    Resume,
    /// Tear down and exit
    Shutdown,
}

/// Handle to a spawned mascot task
#[derive(Debug)]
pub struct MascotHandle {
    tx: mpsc::UnboundedSender<MascotCommand>,
    join: JoinHandle<()>,
}

impl MascotHandle {
    /// Forward a command. Commands sent after shutdown are dropped.
    pub fn send(&self, command: MascotCommand) {
        let _ = self.tx.send(command);
    }

    /// The element was clicked
    pub fn click(&self) {
        self.send(MascotCommand::Click);
    }

    /// A different skin was equipped
    pub fn set_skin(&self, skin: SkinId) {
        self.send(MascotCommand::SetSkin(skin));
    }

    /// Tear down and wait for the task to exit
    pub async fn shutdown(self) {
        self.send(MascotCommand::Shutdown);
        if let Err(e) = self.join.await {
            tracing::warn!(error = %e, "Mascot task ended abnormally");
        }
    }
}

/// Spawn the animator for `element` with the given skin equipped
pub fn spawn_mascot<E>(
    element: Option<E>,
    frames: MascotFrames,
    timing: MascotTiming,
    skin: &SkinId,
) -> MascotHandle
where
    E: MascotElement + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mode = SkinMode::for_skin(skin);

    let join = tokio::spawn(async move {
        let (mut timers, mut fired) = TokioTimers::new();
        let mut animator =
            MascotAnimator::new(element, frames, timing, StdRng::from_entropy()).with_mode(mode);
        animator.start(&mut timers);

        loop {
            tokio::select! {
                command = rx.recv() => match command {
                    Some(MascotCommand::Click) => {
                        animator.click(&mut timers);
                    }
                    Some(MascotCommand::SetSkin(skin)) => {
                        animator.set_skin_mode(SkinMode::for_skin(&skin));
                    }
                    Some(MascotCommand::Pause) => animator.pause(&mut timers),
                    Some(MascotCommand::Resume) => animator.resume(&mut timers),
                    Some(MascotCommand::Shutdown) | None => {
                        animator.teardown(&mut timers);
                        break;
                    }
                },
                Some((id, timer)) = fired.recv() => {
                    animator.on_timer(id, timer, &mut timers);
                }
            }
        }
    });

    MascotHandle { tx, join }
}
