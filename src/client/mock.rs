//! # Mock Transport
//!
//! Scripted, in-memory [`Transport`] for driving page controllers without a
//! backend. Replies are registered per `(method, path)`; each route pops its
//! queued replies in order and keeps repeating the last one. Every request
//! is recorded so tests can assert on call counts and bodies.

use std::cell::RefCell;
use std::collections::VecDeque;

use super::error::ConsoleError;
use super::transport::{ApiRequest, ApiResponse, Method, Transport};

/// Outcome a route produces for one request.
pub type Reply = Result<ApiResponse, ConsoleError>;

type SendHook = Box<dyn FnMut(&ApiRequest)>;

struct Route {
    method: Method,
    path: String,
    replies: VecDeque<Reply>,
}

/// Recording transport with scripted replies.
#[derive(Default)]
pub struct MockTransport {
    routes: RefCell<Vec<Route>>,
    requests: RefCell<Vec<ApiRequest>>,
    on_send: RefCell<Option<SendHook>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `(method, path)`.
    pub fn push_reply(&self, method: Method, path: &str, reply: Reply) -> &Self {
        let mut routes = self.routes.borrow_mut();
        match routes
            .iter_mut()
            .find(|r| r.method == method && r.path == path)
        {
            Some(route) => route.replies.push_back(reply),
            None => routes.push(Route {
                method,
                path: path.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
        self
    }

    /// Queue a plain-text reply.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        self.respond_bytes(method, path, status, body.as_bytes())
    }

    /// Queue a reply with a raw body, which need not be valid UTF-8.
    pub fn respond_bytes(&self, method: Method, path: &str, status: u16, body: &[u8]) -> &Self {
        let response = ApiResponse::new(status, reason_for(status), body.to_vec());
        self.push_reply(method, path, Ok(response))
    }

    /// Queue a JSON reply.
    pub fn respond_json(
        &self,
        method: Method,
        path: &str,
        status: u16,
        body: &serde_json::Value,
    ) -> &Self {
        self.respond(method, path, status, &body.to_string())
    }

    /// Queue a transport failure (the request never completes).
    pub fn fail(&self, method: Method, path: &str, message: &str) -> &Self {
        self.push_reply(method, path, Err(ConsoleError::Transport(message.to_string())))
    }

    /// Run `hook` for every request, before its reply is produced.
    pub fn on_send(&self, hook: impl FnMut(&ApiRequest) + 'static) {
        *self.on_send.borrow_mut() = Some(Box::new(hook));
    }

    /// All requests seen so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    /// Number of requests seen for `(method, path)`.
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Most recent request for `(method, path)`.
    pub fn last(&self, method: Method, path: &str) -> Option<ApiRequest> {
        self.requests
            .borrow()
            .iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
            .cloned()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ConsoleError> {
        self.requests.borrow_mut().push(request.clone());

        if let Some(hook) = self.on_send.borrow_mut().as_mut() {
            hook(request);
        }

        let mut routes = self.routes.borrow_mut();
        let Some(route) = routes
            .iter_mut()
            .find(|r| r.method == request.method && r.path == request.path)
        else {
            return Ok(ApiResponse::new(
                404,
                "Not Found",
                br#"{"detail":"Not Found"}"#.to_vec(),
            ));
        };

        if route.replies.len() > 1 {
            route.replies.pop_front().unwrap_or_else(unscripted)
        } else {
            route.replies.front().cloned().unwrap_or_else(unscripted)
        }
    }
}

fn unscripted() -> Reply {
    Err(ConsoleError::Transport("no scripted reply".to_string()))
}

/// Canonical status text for the codes tests commonly use.
pub fn reason_for(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_reply_repeats_and_earlier_replies_pop() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "/a", 200, "first")
            .respond(Method::Get, "/a", 200, "second");

        let request = ApiRequest::get("/a");
        assert_eq!(mock.send(&request).unwrap().text().unwrap(), "first");
        assert_eq!(mock.send(&request).unwrap().text().unwrap(), "second");
        assert_eq!(mock.send(&request).unwrap().text().unwrap(), "second");
        assert_eq!(mock.count(Method::Get, "/a"), 3);
    }

    #[test]
    fn unknown_route_is_404() {
        let mock = MockTransport::new();
        let response = mock.send(&ApiRequest::get("/missing")).unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.reason, "Not Found");
    }

    #[test]
    fn hook_sees_each_request() {
        use std::rc::Rc;
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mock = MockTransport::new();
        let sink = Rc::clone(&seen);
        mock.on_send(move |r| sink.borrow_mut().push(r.path.clone()));

        let _ = mock.send(&ApiRequest::get("/x"));
        assert_eq!(seen.borrow().as_slice(), ["/x".to_string()]);
    }
}
