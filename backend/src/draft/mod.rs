pub mod chooser;
pub mod machine;
pub mod roles;
pub mod sequence;
pub mod timer;

pub use chooser::{ItemChooser, RandomChooser};
pub use machine::Advance;
pub use roles::{ActorRef, ORGANIZER_ROLE};
pub use sequence::{
    ActionType, DRAFT_SEQUENCE, GameState, Slot, TURN_DURATION_MS, Turn, UnknownGameState,
};
pub use timer::{
    ScheduleOutcome, ScheduleRequest, Scheduler, SchedulerError, TimeoutPayload, TimerController,
    schedule_name,
};
