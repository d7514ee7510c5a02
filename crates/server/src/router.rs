use async_trait::async_trait;
use httpfromtcp::connection::ResponseWriter;
use httpfromtcp::handler::{Handler, HandlerError};
use httpfromtcp::protocol::{default_headers, header, Request, StatusCode};
use indoc::formatdoc;
use tokio::io::AsyncWrite;

use crate::proxy::Proxy;

const PROXY_PREFIX: &str = "/httpbin";

/// Dispatches on the request target.
///
/// - `/yourproblem`: 400 page
/// - `/myproblem`: 500 page
/// - `/httpbin` and `/httpbin/<path>`: fetched from the upstream through the [`Proxy`]
/// - anything else: 200 page
#[derive(Debug, Clone)]
pub struct Router {
    proxy: Proxy,
}

impl Router {
    pub fn new(proxy: Proxy) -> Self {
        Self { proxy }
    }
}

#[async_trait]
impl<W> Handler<W> for Router
where
    W: AsyncWrite + Unpin + Send,
{
    async fn call(&self, request: Request, writer: &mut ResponseWriter<W>) -> Result<(), HandlerError> {
        let target = request.target();

        if let Some(path) = proxied_path(target) {
            return self.proxy.forward(path, writer).await;
        }

        match target {
            "/yourproblem" => {
                let page = Page::new("400 Bad Request", "Your request honestly kinda sucked.");
                page.write_to(writer, StatusCode::BAD_REQUEST, &[]).await
            }
            "/myproblem" => {
                let page = Page::new("500 Internal Server Error", "Okay, you know what? This one is on me.");
                page.write_to(writer, StatusCode::INTERNAL_SERVER_ERROR, &[]).await
            }
            _ => {
                let page = Page::new("200 OK", "Your request was an absolute banger.");
                page.write_to(writer, StatusCode::OK, &[("letsgo", "YES")]).await
            }
        }
    }
}

/// The upstream path for targets under [`PROXY_PREFIX`], which must end there or
/// continue with a `/`.
fn proxied_path(target: &str) -> Option<&str> {
    target.strip_prefix(PROXY_PREFIX).filter(|path| path.is_empty() || path.starts_with('/'))
}

struct Page {
    body: String,
}

impl Page {
    fn new(title: &str, message: &str) -> Self {
        let body = formatdoc! {"
            <html>
              <head>
                <title>{title}</title>
              </head>
              <body>
                <h1>{title}</h1>
                <p>{message}</p>
              </body>
            </html>
        "};
        Self { body }
    }

    async fn write_to<W>(&self, writer: &mut ResponseWriter<W>, status: StatusCode, extra: &[(&str, &str)]) -> Result<(), HandlerError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut headers = default_headers(self.body.len());
        headers.insert(header::CONTENT_TYPE, "text/html");
        for (name, value) in extra {
            headers.insert(name, *value);
        }

        writer.write_status_line(status).await?;
        writer.write_headers(&headers).await?;
        writer.write_body(self.body.as_bytes()).await?;
        Ok(())
    }
}
