//! Local HTTP server for tests. Answers a fixed sequence of requests with
//! canned responses and hands back what it received.

use std::thread::{self, JoinHandle};

use url::Url;

#[derive(Debug)]
pub(crate) struct Captured {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

pub(crate) struct StubServer {
    pub base_url: Url,
    handle: JoinHandle<Vec<Captured>>,
}

impl StubServer {
    /// Serves one `(status, body)` pair per incoming request, in order.
    pub fn serve(responses: Vec<(u16, String)>) -> StubServer {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();

        let handle = thread::spawn(move || {
            let mut captured = Vec::new();
            for (status, body) in responses {
                let mut request = server.recv().unwrap();

                let mut received = String::new();
                request.as_reader().read_to_string(&mut received).unwrap();
                captured.push(Captured {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|h| (h.field.as_str().to_string(), h.value.to_string()))
                        .collect(),
                    body: received,
                });

                request
                    .respond(
                        tiny_http::Response::from_string(body)
                            .with_status_code(status)
                            .with_header(tiny_http::Header {
                                field: "Content-Type".parse().unwrap(),
                                value: "application/json".parse().unwrap(),
                            }),
                    )
                    .unwrap();
            }
            captured
        });

        StubServer {
            base_url: Url::parse(&format!("http://{addr}")).unwrap(),
            handle,
        }
    }

    pub fn finish(self) -> Vec<Captured> {
        self.handle.join().unwrap()
    }
}
