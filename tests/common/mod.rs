#![allow(dead_code)]

use reqwest::Method;
use sauce_storage::transport::{HttpRequest, HttpResponse, RequestBody, Transport};
use sauce_storage::{Credentials, StorageClient, StorageError};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{Read, Write};
use tempfile::NamedTempFile;

pub const HOST: &str = "saucelabs.com";

/// What the stub saw for one request.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Scripted transport: GETs and POSTs each pop the next queued response.
#[derive(Default)]
pub struct StubTransport {
    gets: RefCell<VecDeque<HttpResponse>>,
    posts: RefCell<VecDeque<HttpResponse>>,
    requests: RefCell<Vec<Recorded>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get(&self, response: HttpResponse) -> &Self {
        self.gets.borrow_mut().push_back(response);
        self
    }

    pub fn on_post(&self, response: HttpResponse) -> &Self {
        self.posts.borrow_mut().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.borrow().clone()
    }

    pub fn count(&self, method: Method) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == method)
            .count()
    }
}

impl Transport for StubTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, StorageError> {
        let body = match request.body {
            RequestBody::Empty => Vec::new(),
            RequestBody::File(mut file) => {
                let mut buf = Vec::new();
                file.read_to_end(&mut buf).unwrap();
                buf
            }
        };
        let queue = if request.method == Method::POST {
            &self.posts
        } else {
            &self.gets
        };
        self.requests.borrow_mut().push(Recorded {
            method: request.method.clone(),
            path: request.url.path().to_string(),
            query: request.url.query().map(str::to_string),
            authorization: request.authorization,
            content_type: request.content_type.to_string(),
            body,
        });
        let response = queue
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected {} request", request.method));
        Ok(response)
    }
}

pub fn client(stub: &StubTransport) -> StorageClient<&StubTransport> {
    StorageClient::with_transport(stub, HOST, Credentials::new("alice", "secret"))
}

pub fn listing(files: Value) -> HttpResponse {
    HttpResponse::ok(serde_json::to_vec(&json!({ "files": files })).unwrap())
}

pub fn upload_ok(name: &str, md5: &str) -> HttpResponse {
    HttpResponse::ok(
        serde_json::to_vec(&json!({
            "username": "alice",
            "filename": name,
            "size": 11,
            "md5": md5,
            "etag": "etag-1",
        }))
        .unwrap(),
    )
}

pub fn local_file(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}

/// MD5 of "hello world".
pub const HELLO_MD5: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";
