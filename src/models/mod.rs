pub mod game_kind;
pub mod game_record;
pub mod game_status;
pub mod payload;
pub mod session;
pub mod team;
pub mod treatment;

pub use game_kind::GameKind;
pub use game_record::GameRecord;
pub use game_status::GameStatus;
pub use payload::GamePayload;
pub use session::Session;
pub use team::{Team, TeamRef};
pub use treatment::Treatment;
