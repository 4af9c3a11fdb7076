//! Thin helpers over a process-wide [`reqwest::Client`].
//!
//! The client is built once, either explicitly at startup with [`init_http_client`] or
//! lazily with default [`HttpClientProps`] on first use. Helpers return the response body
//! whatever the HTTP status is; callers that care check it themselves through
//! [`request`].

use crate::config::HttpClientProps;
use crate::error::Result;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, redirect};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

static CLIENT: OnceLock<Client> = OnceLock::new();
static PROPS: OnceLock<HttpClientProps> = OnceLock::new();

/// Header name/value pairs sent with a request.
pub type Headers<'a> = &'a [(&'a str, &'a str)];

fn build_client(props: &HttpClientProps) -> Result<Client> {
    let redirect = if props.follow_redirects {
        redirect::Policy::limited(props.max_redirects)
    } else {
        redirect::Policy::none()
    };

    let mut builder = Client::builder()
        .connect_timeout(props.connect_timeout())
        .redirect(redirect);
    if props.http1_only {
        builder = builder.http1_only();
    }
    Ok(builder.build()?)
}

/// Build the shared client from `props`.
///
/// Returns `Ok(false)` when a client already exists; the first configuration wins.
pub fn init_http_client(props: HttpClientProps) -> Result<bool> {
    if CLIENT.get().is_some() || PROPS.set(props).is_err() {
        return Ok(false);
    }
    let client = build_client(client_props())?;
    Ok(CLIENT.set(client).is_ok())
}

/// Properties the shared client was (or will be) built with.
pub fn client_props() -> &'static HttpClientProps {
    PROPS.get_or_init(HttpClientProps::default)
}

/// The shared client, built on first use.
pub fn http_client() -> Result<&'static Client> {
    if let Some(client) = CLIENT.get() {
        return Ok(client);
    }
    let client = build_client(client_props())?;
    Ok(CLIENT.get_or_init(|| client))
}

/// Start a request with headers and a timeout (the configured default read timeout when
/// `timeout` is `None`).
pub fn request(
    method: Method,
    url: &str,
    headers: Headers<'_>,
    timeout: Option<Duration>,
) -> Result<RequestBuilder> {
    let timeout = timeout.unwrap_or_else(|| client_props().default_read_timeout());
    let builder = headers.iter().fold(
        http_client()?.request(method, url).timeout(timeout),
        |builder, (name, value)| builder.header(*name, *value),
    );
    Ok(builder)
}

fn with_default_content_type(builder: RequestBuilder, headers: Headers<'_>) -> RequestBuilder {
    let has_content_type = headers
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));
    if has_content_type {
        builder
    } else {
        builder.header(CONTENT_TYPE, client_props().default_content_type.as_str())
    }
}

async fn send_text(builder: RequestBuilder) -> Result<String> {
    let response = builder.send().await?;
    tracing::debug!(url = %response.url(), status = %response.status(), "http response");
    Ok(response.text().await?)
}

async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
    let body = send_text(builder).await?;
    Ok(serde_json::from_str(&body)?)
}

pub async fn get(url: &str, headers: Headers<'_>, timeout: Option<Duration>) -> Result<String> {
    send_text(request(Method::GET, url, headers, timeout)?).await
}

pub async fn get_json<T: DeserializeOwned>(
    url: &str,
    headers: Headers<'_>,
    timeout: Option<Duration>,
) -> Result<T> {
    send_json(request(Method::GET, url, headers, timeout)?).await
}

/// POST a raw body, with the default content type unless `headers` set one.
pub async fn post_body(
    url: &str,
    headers: Headers<'_>,
    body: impl Into<String>,
    timeout: Option<Duration>,
) -> Result<String> {
    let builder = request(Method::POST, url, headers, timeout)?.body(body.into());
    send_text(with_default_content_type(builder, headers)).await
}

pub async fn post_json<B, T>(
    url: &str,
    headers: Headers<'_>,
    body: &B,
    timeout: Option<Duration>,
) -> Result<T>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    send_json(request(Method::POST, url, headers, timeout)?.json(body)).await
}

pub async fn post_form(
    url: &str,
    headers: Headers<'_>,
    form: &[(&str, &str)],
    timeout: Option<Duration>,
) -> Result<String> {
    send_text(request(Method::POST, url, headers, timeout)?.form(form)).await
}

pub async fn put_body(
    url: &str,
    headers: Headers<'_>,
    body: impl Into<String>,
    timeout: Option<Duration>,
) -> Result<String> {
    let builder = request(Method::PUT, url, headers, timeout)?.body(body.into());
    send_text(with_default_content_type(builder, headers)).await
}

pub async fn put_form(
    url: &str,
    headers: Headers<'_>,
    form: &[(&str, &str)],
    timeout: Option<Duration>,
) -> Result<String> {
    send_text(request(Method::PUT, url, headers, timeout)?.form(form)).await
}

pub async fn delete(url: &str, headers: Headers<'_>, timeout: Option<Duration>) -> Result<String> {
    send_text(request(Method::DELETE, url, headers, timeout)?).await
}

/// GET `url` and store the body at `path`.
pub async fn download(url: &str, headers: Headers<'_>, path: impl AsRef<Path>) -> Result<PathBuf> {
    let response = request(Method::GET, url, headers, None)?.send().await?;
    let bytes = response.bytes().await?;
    tokio::fs::write(path.as_ref(), &bytes).await?;
    Ok(path.as_ref().to_path_buf())
}
