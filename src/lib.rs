//! # Keystone
//!
//! Shared web infrastructure for axum services.
//!
//! Keystone gives every service the same answer to "what does the client see when
//! something goes wrong": a single response envelope, a small fault taxonomy and one
//! exception handler that maps any failure onto that envelope.
//!
//! ## Features
//!
//! - **Response envelope**: [`ApiResponse`] carries `code`, `reason`, `level` and `data`,
//!   always served with HTTP 200
//! - **Status catalog**: the fixed `web.*` codes in [`common::Status`]
//! - **Fault taxonomy**: base, business and internal [`Fault`]s with separate log and view
//!   messages and levels
//! - **Global fault mapping**: [`exception::WebExceptionHandler`] behind an
//!   [`exception::ExceptionFilterLayer`], so faults escaping guards and interceptors get
//!   the same envelope as faults returned by handlers
//! - **Validation**: [`pipe::ValidJson`] / [`pipe::ValidQuery`] report every violated
//!   field as one `web.badRequest`; [`pipe::Bound`] does the same for any other axum
//!   extractor
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use axum::{Router, extract::Path, routing::get};
//! use keystone::prelude::*;
//!
//! async fn find_order(Bound(Path(id)): Bound<Path<u64>>) -> Result<ApiResponse<u64>, Fault> {
//!     Fault::business_fmt("订单 {} 不存在", &[&id]).throw_if_true(id == 0)?;
//!     Ok(ApiResponse::ok(id))
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = WebStarter::new()
//!         .interceptor(LoggingInterceptor)
//!         .apply(Router::new().route("/orders/{id}", get(find_order)));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod common;
pub mod config;
pub mod error;
pub mod exception;
pub mod guard;
pub mod interceptor;
pub mod pipe;
pub mod starter;
pub mod util;

// Re-export core types
pub use common::{ApiResponse, Status};
pub use error::{KeystoneError, Result};
pub use exception::{Fault, FaultKind, ValidationFault};
pub use starter::WebStarter;

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use keystone::prelude::*;
/// ```
pub mod prelude {
    pub use crate::common::{ApiResponse, LogLevel, Status, ViewLevel};
    pub use crate::config::{ConfigService, WebProperties};
    pub use crate::error::KeystoneError;
    pub use crate::exception::{
        ArgumentsHost, BindingResult, Exception, ExceptionFilter, Fault, FaultKind,
        FaultOptions, StackTrace, ValidationFault,
    };
    pub use crate::guard::{Guard, GuardError, GuardResult};
    pub use crate::interceptor::{Interceptor, InterceptorResult, LoggingInterceptor, Next};
    pub use crate::pipe::builtins::*;
    pub use crate::pipe::{Bound, Pipe, PipeResult, ValidJson, ValidQuery, Validate};
    pub use crate::starter::WebStarter;
    pub use async_trait::async_trait;
    pub use axum::http::request::Parts;
    pub use std::sync::Arc;
}
