pub mod format;
pub mod level;
pub mod response;
pub mod status;

pub(crate) use level::log_at;

pub use format::format_message;
pub use level::{LogLevel, ViewLevel};
pub use response::{ApiResponse, DEFAULT_FAIL_LEVEL, DEFAULT_OK_LEVEL};
pub use status::Status;
