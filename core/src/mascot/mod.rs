//! Mascot animation
//!
//! - [`MascotAnimator`]: timer-driven state machine for blink/talk idles
//! - [`spawn_mascot`]: runs an animator on a tokio task
//! - [`MascotElement`]: what a surface implements to be animated

mod animator;
mod driver;
mod element;
mod frames;

pub use animator::{Animation, MascotAnimator, MascotPhase, MascotTimer, Trigger};
pub use driver::{spawn_mascot, MascotCommand, MascotHandle};
pub use element::MascotElement;
pub use frames::{Frame, MascotFrames, MascotTiming, SkinMode, ROCKING_CLASS};
