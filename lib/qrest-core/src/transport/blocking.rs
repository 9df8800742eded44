use http::header::CONTENT_TYPE;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder};

use super::{RawResponse, Transport, TransportError};
use crate::{AssembledRequest, RequestBody};

/// Blocking HTTP transport backed by [`reqwest`].
///
/// A client is built for every request so that the connect timeout and the TLS verification
/// flag of the request apply. reqwest has no read-only timeout: the read timeout bounds the
/// whole exchange, and without one the request waits indefinitely.
///
/// The reason phrase of a response is the canonical phrase of its status, as reqwest does not
/// expose the one sent by the server.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestTransport;

impl ReqwestTransport {
    /// Creates the transport.
    pub fn new() -> Self {
        Self
    }

    fn client(request: &AssembledRequest) -> Result<Client, reqwest::Error> {
        let timeout = request.timeout();
        Client::builder()
            .connect_timeout(timeout.connect)
            .timeout(timeout.read)
            .danger_accept_invalid_certs(!request.verify_tls())
            .build()
    }

    fn prepare(client: &Client, request: &AssembledRequest) -> Result<RequestBuilder, TransportError> {
        let mut headers = request.headers().clone();
        if matches!(request.body(), RequestBody::Multipart(_)) {
            // the form sets its own boundary
            headers.remove(CONTENT_TYPE);
        }
        let mut builder = client
            .request(request.method().into(), request.full_url())
            .headers(headers);

        if let Some(auth) = request.auth() {
            let (name, value) = auth.to_header().map_err(|err| connection_error(request, &err))?;
            builder = builder.header(name, value);
        }

        let builder = match request.body() {
            RequestBody::None => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(files) => {
                let mut form = Form::new();
                for (wire_name, file) in files {
                    let mut part =
                        Part::bytes(file.content().to_vec()).file_name(file.file_name().to_string());
                    if let Some(mime_type) = file.mime_type() {
                        part = part
                            .mime_str(mime_type)
                            .map_err(|err| connection_error(request, &err))?;
                    }
                    form = form.part(wire_name.clone(), part);
                }
                builder.multipart(form)
            }
        };
        Ok(builder)
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: &AssembledRequest) -> Result<RawResponse, TransportError> {
        let client = Self::client(request).map_err(|err| map_error(request, &err))?;
        let response = Self::prepare(&client, request)?
            .send()
            .map_err(|err| map_error(request, &err))?;

        let status = response.status();
        let url = response.url().to_string();
        let headers = response.headers().clone();
        let content = response.bytes().map_err(|err| map_error(request, &err))?;

        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            url,
            headers,
            content: content.to_vec(),
        })
    }
}

fn map_error(request: &AssembledRequest, err: &reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            url: request.full_url().to_string(),
            message: err.to_string(),
        }
    } else {
        connection_error(request, err)
    }
}

fn connection_error(request: &AssembledRequest, err: &dyn std::error::Error) -> TransportError {
    TransportError::Connection {
        url: request.full_url().to_string(),
        message: err.to_string(),
    }
}
