use crate::error::{LauncherError, Result};
use futures_util::StreamExt;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, Response, Url};
use std::time::Duration;

/// Maximum number of redirect hops followed by a single fetch
pub const MAX_REDIRECTS: usize = 3;

/// Upper bound on the buffer reserved from a response's Content-Length
const MAX_PREALLOC: usize = 64 << 20;

/// HTTP client that follows redirects itself so the hop bound is explicit
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!("buf-launcher/", env!("CARGO_PKG_VERSION")))
            .redirect(Policy::none());

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// GET `url`, following up to [`MAX_REDIRECTS`] redirects
    pub async fn fetch(&self, url: &str) -> Result<Response> {
        self.fetch_following_redirects(url, Vec::new()).await
    }

    /// GET `url` with `chain` holding the hops already taken by the caller.
    ///
    /// Every 3xx response is followed via its `Location` header. The chain
    /// grows by one per hop and the fetch fails once it is longer than
    /// [`MAX_REDIRECTS`]. The returned response has a 2xx status and an
    /// undrained body.
    pub async fn fetch_following_redirects(
        &self,
        url: &str,
        mut chain: Vec<String>,
    ) -> Result<Response> {
        let mut current = parse_http_url(url)?;

        loop {
            tracing::debug!("GET {}", current);
            let response = self.client.get(current.clone()).send().await?;
            let status = response.status();

            if status.is_redirection() {
                let next = redirect_location(&current, &response)?;
                chain.push(next.to_string());
                if chain.len() > MAX_REDIRECTS {
                    return Err(LauncherError::TooManyRedirects {
                        url: url.to_string(),
                        chain,
                    });
                }
                tracing::debug!("Redirect {}/{}: {}", chain.len(), MAX_REDIRECTS, next);
                current = next;
                continue;
            }

            if !status.is_success() {
                return Err(LauncherError::HttpStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            return Ok(response);
        }
    }

    /// Issue a single GET and report where it redirects to.
    ///
    /// The first response must be a redirect; the target is not fetched.
    pub async fn resolve_redirect_target(&self, url: &str) -> Result<String> {
        let current = parse_http_url(url)?;
        let response = self.client.get(current.clone()).send().await?;
        let status = response.status();

        if !status.is_redirection() {
            return Err(LauncherError::ExpectedRedirect {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let target = redirect_location(&current, &response)?;
        tracing::debug!("{} redirects to {}", url, target);
        Ok(target.to_string())
    }

    /// Fetch `url` and drain the whole body into memory
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.fetch(url).await?;
        let mut bytes = Vec::with_capacity(initial_capacity(response.content_length()));
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            bytes.extend_from_slice(&chunk?);
        }

        tracing::debug!("Downloaded {} bytes from {}", bytes.len(), url);
        Ok(bytes)
    }
}

/// Buffer size to reserve for a body; the header is not trusted beyond
/// [`MAX_PREALLOC`]
fn initial_capacity(content_length: Option<u64>) -> usize {
    content_length
        .map(|len| usize::try_from(len).unwrap_or(usize::MAX).min(MAX_PREALLOC))
        .unwrap_or(0)
}

/// Parse an absolute http(s) URL, rejecting anything else
fn parse_http_url(url: &str) -> Result<Url> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(LauncherError::InvalidUrl {
            url: url.to_string(),
        });
    }

    Url::parse(url).map_err(|_| LauncherError::InvalidUrl {
        url: url.to_string(),
    })
}

/// Resolve the `Location` header of a redirect response against `base`
fn redirect_location(base: &Url, response: &Response) -> Result<Url> {
    let missing = || LauncherError::MissingLocation {
        url: base.to_string(),
        status: response.status().as_u16(),
    };

    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(missing)?;

    let target = base.join(location).map_err(|_| LauncherError::InvalidUrl {
        url: location.to_string(),
    })?;

    match target.scheme() {
        "http" | "https" => Ok(target),
        _ => Err(LauncherError::InvalidUrl {
            url: target.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_http_url_accepts_http_and_https() {
        assert!(parse_http_url("http://example.com/a").is_ok());
        assert!(parse_http_url("https://example.com/a").is_ok());
    }

    #[test]
    fn test_parse_http_url_rejects_other_input() {
        for url in ["", "ftp://example.com", "example.com/buf", "file:///tmp/buf"] {
            let result = parse_http_url(url);
            assert!(
                matches!(result, Err(LauncherError::InvalidUrl { .. })),
                "expected InvalidUrl for {url:?}"
            );
        }
    }

    #[test]
    fn test_initial_capacity_is_capped() {
        assert_eq!(initial_capacity(None), 0);
        assert_eq!(initial_capacity(Some(1024)), 1024);
        assert_eq!(initial_capacity(Some(u64::MAX)), MAX_PREALLOC);
        assert_eq!(initial_capacity(Some(1 << 40)), MAX_PREALLOC);
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_url_without_network() {
        let fetcher = HttpFetcher::new(None).unwrap();
        let result = fetcher.fetch("not a url").await;
        assert!(matches!(result, Err(LauncherError::InvalidUrl { .. })));
    }
}
