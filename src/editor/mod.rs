pub mod button;
pub mod session;
pub mod sessions;

pub use button::{BUTTON_BAR_SIZE, Button, ButtonCommand, ButtonDisplay, ButtonPlacement, EditedShop};
pub use session::{CloseOutcome, EditorAction, EditorSession, RejectedDraft, SessionState};
pub use sessions::EditorSessions;
