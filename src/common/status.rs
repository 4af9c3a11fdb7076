use std::borrow::Cow;
use std::fmt;

/// A `(code, reason)` pair carried by every [`ApiResponse`](super::ApiResponse).
///
/// The built-in catalog lives in the associated constants. Applications define their own
/// with [`Status::new`], using a `<namespace>.<name>` code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Status {
    code: Cow<'static, str>,
    reason: Cow<'static, str>,
}

impl Status {
    pub const OK: Status = Status::from_static("web.ok", "处理成功");
    pub const BAD_REQUEST: Status = Status::from_static("web.badRequest", "错误的请求");
    pub const UNAUTHORIZED: Status = Status::from_static("web.unauthorized", "未认证");
    pub const FORBIDDEN: Status = Status::from_static("web.forbidden", "未授权");
    pub const NOT_FOUND: Status = Status::from_static("web.notFound", "没有可用的数据");
    pub const INTERNAL_SERVER_ERROR: Status =
        Status::from_static("web.unknown", "服务器遇到了一个未曾预料的状况");
    pub const SERVICE_UNAVAILABLE: Status =
        Status::from_static("web.serviceUnavailable", "服务器当前无法处理请求");
    pub const FAIL: Status = Status::from_static("web.fail", "错误");

    /// Every built-in status, in declaration order.
    pub const CATALOG: [Status; 8] = [
        Status::OK,
        Status::BAD_REQUEST,
        Status::UNAUTHORIZED,
        Status::FORBIDDEN,
        Status::NOT_FOUND,
        Status::INTERNAL_SERVER_ERROR,
        Status::SERVICE_UNAVAILABLE,
        Status::FAIL,
    ];

    pub const fn from_static(code: &'static str, reason: &'static str) -> Self {
        Self {
            code: Cow::Borrowed(code),
            reason: Cow::Borrowed(reason),
        }
    }

    pub fn new(code: impl Into<Cow<'static, str>>, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code: code.into(),
            reason: reason.into(),
        }
    }

    /// Looks a code up in the built-in catalog.
    pub fn lookup(code: &str) -> Option<Status> {
        Self::CATALOG.into_iter().find(|status| status.code == code)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Same code, different reason.
    pub fn with_reason(&self, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code: self.code.clone(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.reason)
    }
}
