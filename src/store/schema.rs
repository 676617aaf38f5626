//! Storage key names and the persisted result version.
//!
//! Every key is stored under `<save_key>_<name>`, see
//! [`Storage`](super::storage::Storage).

pub const UNLOCK: &str = "unlock";
pub const PROFILE: &str = "profile";
pub const ATTEMPT: &str = "attempt";
pub const TEST_STATE: &str = "testState";
pub const LAST_QUESTION_IDS: &str = "lastQuestionIds";
pub const RESULT: &str = "result";
pub const TOAST_MUTED: &str = "toastMuted";
pub const INSTALL_DISMISSED: &str = "installDismissed";

/// Version tag written into every finished result.
pub const RESULT_VERSION: &str = "2026.01";

pub const DEFAULT_SAVE_KEY: &str = "step2026";
