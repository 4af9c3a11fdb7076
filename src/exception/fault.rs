use crate::common::{LogLevel, Status, ViewLevel, format_message, log_at};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::fmt::{self, Display};
use std::sync::OnceLock;
use strum_macros::{Display as StrumDisplay, EnumString};

/// Type-erased error, as carried through tower services.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Shown for base faults when nothing more specific is given.
pub const BASE_VIEW_MESSAGE: &str = "服务器内部错误";

/// Shown for business faults when nothing more specific is given.
pub const BUSINESS_VIEW_MESSAGE: &str = "不支持的操作";

/// Which branch of the fault taxonomy a [`Fault`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
#[strum(serialize_all = "snake_case")]
pub enum FaultKind {
    /// Generic fault, hides its message behind [`BASE_VIEW_MESSAGE`].
    Base,
    /// Expected, user-facing refusal; safe to show.
    Business,
    /// Unexpected server-side failure.
    Internal,
}

/// What internal faults show to the user when no view message is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum InternalViewMessage {
    /// The developer message is shown verbatim.
    #[default]
    Raw,
    /// [`BASE_VIEW_MESSAGE`] is shown instead.
    Generic,
}

static INTERNAL_VIEW_MESSAGE: OnceLock<InternalViewMessage> = OnceLock::new();

/// Install the process-wide internal view policy.
///
/// Only the first call wins; returns `false` if a policy was already installed.
pub fn set_internal_view_message(policy: InternalViewMessage) -> bool {
    INTERNAL_VIEW_MESSAGE.set(policy).is_ok()
}

pub fn internal_view_message() -> InternalViewMessage {
    INTERNAL_VIEW_MESSAGE.get().copied().unwrap_or_default()
}

impl FaultKind {
    fn default_view_message(self, message: &str, policy: InternalViewMessage) -> String {
        match (self, policy) {
            (FaultKind::Base, _) => BASE_VIEW_MESSAGE.to_owned(),
            (FaultKind::Business, _) => BUSINESS_VIEW_MESSAGE.to_owned(),
            (FaultKind::Internal, InternalViewMessage::Raw) => message.to_owned(),
            (FaultKind::Internal, InternalViewMessage::Generic) => BASE_VIEW_MESSAGE.to_owned(),
        }
    }
}

/// Call-site frames attached to a fault.
#[derive(Debug)]
pub enum StackTrace {
    /// Captured where the fault was built (honours `RUST_BACKTRACE`).
    Captured(Backtrace),
    /// Substituted by the caller.
    Frames(Vec<String>),
    Suppressed,
}

impl StackTrace {
    pub fn capture() -> Self {
        Self::Captured(Backtrace::capture())
    }

    pub fn is_present(&self) -> bool {
        match self {
            StackTrace::Captured(bt) => bt.status() == BacktraceStatus::Captured,
            StackTrace::Frames(frames) => !frames.is_empty(),
            StackTrace::Suppressed => false,
        }
    }
}

impl Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackTrace::Captured(bt) if bt.status() == BacktraceStatus::Captured => {
                write!(f, "{bt}")
            }
            StackTrace::Frames(frames) => f.write_str(&frames.join("\n")),
            _ => Ok(()),
        }
    }
}

/// Everything a caller may pin down when building a [`Fault`].
///
/// Unset fields fall back to the defaults of the fault kind. This is how the log-facing
/// and the user-facing sides are decoupled:
///
/// ```
/// use keystone::common::{LogLevel, ViewLevel, format_message};
/// use keystone::exception::{Fault, FaultOptions};
///
/// let fault = Fault::business_with(FaultOptions {
///     message: Some(format_message("stock of sku {} is {}", &[&"A-1", &0])),
///     view_message: Some("该商品已售罄".to_owned()),
///     log_level: Some(LogLevel::Info),
///     view_level: Some(ViewLevel::Warn),
///     ..Default::default()
/// });
///
/// assert_eq!(fault.message(), "stock of sku A-1 is 0");
/// assert_eq!(fault.view_message(), "该商品已售罄");
/// ```
#[derive(Debug, Default)]
pub struct FaultOptions {
    pub message: Option<String>,
    pub cause: Option<BoxError>,
    pub stack_trace: Option<StackTrace>,
    pub log_level: Option<LogLevel>,
    pub view_message: Option<String>,
    pub view_level: Option<ViewLevel>,
    /// Catalog status of the envelope; `web.unknown` when unset.
    pub status: Option<Status>,
}

impl FaultOptions {
    pub fn message(mut self, pattern: &str, args: &[&dyn Display]) -> Self {
        self.message = Some(format_message(pattern, args));
        self
    }

    pub fn view_message(mut self, pattern: &str, args: &[&dyn Display]) -> Self {
        self.view_message = Some(format_message(pattern, args));
        self
    }

    pub fn cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn stack_trace(mut self, stack_trace: StackTrace) -> Self {
        self.stack_trace = Some(stack_trace);
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn view_level(mut self, level: ViewLevel) -> Self {
        self.view_level = Some(level);
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }
}

/// A fault raised while handling a request.
///
/// Carries a developer-facing side (`message`, `cause`, `log_level`, stack trace) and a
/// user-facing side (`view_message`, `view_level`). Both are fixed when the fault is
/// built; there are no setters.
#[derive(Debug)]
pub struct Fault {
    kind: FaultKind,
    message: String,
    cause: Option<BoxError>,
    stack_trace: StackTrace,
    log_level: LogLevel,
    view_message: String,
    view_level: ViewLevel,
    status: Option<Status>,
}

impl Fault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self::with_options(
            kind,
            FaultOptions {
                message: Some(message.into()),
                ..Default::default()
            },
        )
    }

    /// Interpolates `pattern` right away, see [`format_message`].
    pub fn format(kind: FaultKind, pattern: &str, args: &[&dyn Display]) -> Self {
        Self::new(kind, format_message(pattern, args))
    }

    /// Wraps a lower-level error; the message is the cause's display text.
    pub fn from_cause(kind: FaultKind, cause: impl Into<BoxError>) -> Self {
        Self::with_options(
            kind,
            FaultOptions {
                cause: Some(cause.into()),
                ..Default::default()
            },
        )
    }

    pub fn format_with_cause(
        kind: FaultKind,
        pattern: &str,
        cause: impl Into<BoxError>,
        args: &[&dyn Display],
    ) -> Self {
        Self::with_options(kind, FaultOptions::default().message(pattern, args).cause(cause))
    }

    pub fn with_options(kind: FaultKind, options: FaultOptions) -> Self {
        Self::build(kind, options, internal_view_message())
    }

    fn build(kind: FaultKind, options: FaultOptions, policy: InternalViewMessage) -> Self {
        let message = match (options.message, &options.cause) {
            (Some(message), _) => message,
            (None, Some(cause)) => cause.to_string(),
            (None, None) => String::new(),
        };
        let view_message = options
            .view_message
            .unwrap_or_else(|| kind.default_view_message(&message, policy));

        Self {
            kind,
            message,
            cause: options.cause,
            stack_trace: options.stack_trace.unwrap_or_else(StackTrace::capture),
            log_level: options.log_level.unwrap_or_default(),
            view_message,
            view_level: options.view_level.unwrap_or_default(),
            status: options.status,
        }
    }

    pub fn base(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Base, message)
    }

    pub fn business(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Business, message)
    }

    pub fn business_fmt(pattern: &str, args: &[&dyn Display]) -> Self {
        Self::format(FaultKind::Business, pattern, args)
    }

    pub fn business_from(cause: impl Into<BoxError>) -> Self {
        Self::from_cause(FaultKind::Business, cause)
    }

    pub fn business_with(options: FaultOptions) -> Self {
        Self::with_options(FaultKind::Business, options)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Internal, message)
    }

    pub fn internal_fmt(pattern: &str, args: &[&dyn Display]) -> Self {
        Self::format(FaultKind::Internal, pattern, args)
    }

    pub fn internal_from(cause: impl Into<BoxError>) -> Self {
        Self::from_cause(FaultKind::Internal, cause)
    }

    pub fn internal_with(options: FaultOptions) -> Self {
        Self::with_options(FaultKind::Internal, options)
    }

    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    pub fn stack_trace(&self) -> &StackTrace {
        &self.stack_trace
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn view_message(&self) -> &str {
        &self.view_message
    }

    pub fn view_level(&self) -> ViewLevel {
        self.view_level
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// `Err(self)` when `condition` holds.
    ///
    /// ```
    /// use keystone::exception::Fault;
    ///
    /// fn withdraw(balance: u32, amount: u32) -> Result<u32, Fault> {
    ///     Fault::business("insufficient balance").throw_if_true(amount > balance)?;
    ///     Ok(balance - amount)
    /// }
    ///
    /// assert!(withdraw(10, 20).is_err());
    /// assert_eq!(withdraw(10, 4).unwrap(), 6);
    /// ```
    pub fn throw_if_true(self, condition: bool) -> Result<(), Fault> {
        if condition { Err(self) } else { Ok(()) }
    }

    /// `Err(self)` unless `condition` holds.
    pub fn throw_if_false(self, condition: bool) -> Result<(), Fault> {
        self.throw_if_true(!condition)
    }

    /// Display text of every error below this one, outermost first.
    pub fn cause_chain(&self) -> Vec<String> {
        let mut chain = Vec::new();
        let mut next = self.source();
        while let Some(err) = next {
            chain.push(err.to_string());
            next = err.source();
        }
        chain
    }

    /// Record the fault at its own log level.
    pub fn log(&self) {
        let causes = self.cause_chain();
        log_at!(
            self.log_level,
            kind = %self.kind,
            view_message = %self.view_message,
            view_level = %self.view_level,
            causes = ?causes,
            stack_trace = %self.stack_trace,
            "{}",
            self.message
        );
    }
}

impl Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for Fault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct ConnectError;

    #[test]
    fn test_business_fault_from_template() {
        let fault = Fault::business_fmt("order {} not found", &[&"42"]);
        assert_eq!(fault.kind(), FaultKind::Business);
        assert_eq!(fault.message(), "order 42 not found");
        assert_eq!(fault.view_message(), BUSINESS_VIEW_MESSAGE);
        assert_eq!(fault.log_level(), LogLevel::Error);
        assert_eq!(fault.view_level(), ViewLevel::Error);
        assert!(fault.status().is_none());
    }

    #[test]
    fn test_base_fault_hides_message() {
        let fault = Fault::base("disk quota exceeded on /var");
        assert_eq!(fault.view_message(), BASE_VIEW_MESSAGE);
    }

    #[test]
    fn test_internal_view_policy() {
        let raw = Fault::build(
            FaultKind::Internal,
            FaultOptions::default().message("pool exhausted", &[]),
            InternalViewMessage::Raw,
        );
        assert_eq!(raw.view_message(), "pool exhausted");

        let generic = Fault::build(
            FaultKind::Internal,
            FaultOptions::default().message("pool exhausted", &[]),
            InternalViewMessage::Generic,
        );
        assert_eq!(generic.view_message(), BASE_VIEW_MESSAGE);
        assert_eq!(generic.message(), "pool exhausted");
    }

    #[test]
    fn test_wrapping_a_cause() {
        let fault = Fault::internal_from(ConnectError);
        assert_eq!(fault.message(), "connection refused");
        assert_eq!(fault.source().unwrap().to_string(), "connection refused");

        let outer = Fault::format_with_cause(FaultKind::Base, "loading user {}", fault, &[&7]);
        assert_eq!(outer.message(), "loading user 7");
        assert_eq!(
            outer.cause_chain(),
            vec!["connection refused".to_string(), "connection refused".to_string()]
        );
    }

    #[test]
    fn test_options_override_everything() {
        let fault = Fault::internal_with(
            FaultOptions::default()
                .message("upstream {} returned {}", &[&"billing", &503])
                .view_message("请稍后重试", &[])
                .log_level(LogLevel::Warn)
                .view_level(ViewLevel::Fatal)
                .stack_trace(StackTrace::Frames(vec!["billing::charge".into()]))
                .status(Status::SERVICE_UNAVAILABLE),
        );
        assert_eq!(fault.message(), "upstream billing returned 503");
        assert_eq!(fault.view_message(), "请稍后重试");
        assert_eq!(fault.log_level(), LogLevel::Warn);
        assert_eq!(fault.view_level(), ViewLevel::Fatal);
        assert_eq!(fault.status(), Some(&Status::SERVICE_UNAVAILABLE));
        assert!(fault.stack_trace().is_present());
        assert_eq!(fault.stack_trace().to_string(), "billing::charge");
    }

    #[test]
    fn test_business_options_keep_default_view_message() {
        let fault = Fault::business_with(FaultOptions::default().message("bad state", &[]));
        assert_eq!(fault.view_message(), BUSINESS_VIEW_MESSAGE);
    }

    #[test]
    fn test_suppressed_stack_trace() {
        let fault = Fault::business_with(FaultOptions {
            stack_trace: Some(StackTrace::Suppressed),
            ..Default::default()
        });
        assert!(!fault.stack_trace().is_present());
        assert_eq!(fault.stack_trace().to_string(), "");
        assert_eq!(fault.message(), "");
    }

    #[test]
    fn test_throw_guards() {
        assert!(Fault::business("x").throw_if_true(false).is_ok());
        assert!(Fault::business("x").throw_if_false(true).is_ok());

        let err = Fault::business("too many").throw_if_true(true).unwrap_err();
        assert_eq!(err.message(), "too many");
        assert!(Fault::business("x").throw_if_false(false).is_err());
    }
}
