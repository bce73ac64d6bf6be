//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*const c_char` instead of `String`, pointer + length instead of `Vec`,
//! and enums with explicit discriminants. `OwnedCompletion` keeps the
//! backing allocations alive while a callback reads an `FfiCompletion`.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use rest_core::{Completion, RequestError, Resource, RestClient};

/// Opaque handle to a transport session. Owns the runtime that requests
/// are spawned onto and the single shared `RestClient`.
pub struct FfiSession {
    pub(crate) client: RestClient,
    pub(crate) runtime: tokio::runtime::Runtime,
}

/// Opaque handle to a `Resource`.
pub struct FfiResource {
    pub(crate) inner: Resource,
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// Whether a verb call was dispatched.
///
/// Only `Ok` guarantees the callback will fire.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiStatus {
    Ok = 0,
    NullArg = 1,
    InvalidUtf8 = 2,
    Panic = 3,
}

/// `RequestError` as a C enum, with `None` for success.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorKind {
    None = 0,
    Unauthorized = 1,
    NotFound = 2,
    ServerError = 3,
    ConnectionFailure = 4,
}

impl From<Option<RequestError>> for FfiErrorKind {
    fn from(error: Option<RequestError>) -> Self {
        match error {
            None => FfiErrorKind::None,
            Some(RequestError::Unauthorized) => FfiErrorKind::Unauthorized,
            Some(RequestError::NotFound) => FfiErrorKind::NotFound,
            Some(RequestError::ServerError) => FfiErrorKind::ServerError,
            Some(RequestError::ConnectionFailure) => FfiErrorKind::ConnectionFailure,
        }
    }
}

/// The outcome handed to a completion callback.
///
/// Every pointer is borrowed and valid only until the callback returns.
/// `headers` is null when `headers_len` is 0, and `body` is null when
/// `has_body` is false or the body is empty.
#[repr(C)]
pub struct FfiCompletion {
    pub error: FfiErrorKind,
    pub has_status: bool,
    pub status: u16,
    pub headers: *const FfiHeader,
    pub headers_len: u32,
    pub has_body: bool,
    pub body: *const u8,
    pub body_len: usize,
}

/// Completion callback. `completion` is never null.
pub type FfiCompletionCallback =
    extern "C" fn(user_data: *mut c_void, completion: *const FfiCompletion);

/// Caller context carried into the spawned task untouched.
pub(crate) struct UserData(*mut c_void);

// The pointer is only ever handed back to the caller's own callback.
unsafe impl Send for UserData {}

impl UserData {
    pub(crate) fn new(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    pub(crate) fn get(&self) -> *mut c_void {
        self.0
    }
}

/// A `Completion` converted to C layout, together with the storage its
/// pointers refer to.
pub(crate) struct OwnedCompletion {
    _strings: Vec<CString>,
    _headers: Vec<FfiHeader>,
    _body: Option<Vec<u8>>,
    pub(crate) raw: FfiCompletion,
}

impl OwnedCompletion {
    pub(crate) fn new(completion: Completion) -> Self {
        let mut strings = Vec::new();
        let mut headers = Vec::new();
        for (key, value) in completion.headers.unwrap_or_default() {
            let key = CString::new(key).unwrap_or_default();
            let value = CString::new(value).unwrap_or_default();
            headers.push(FfiHeader {
                key: key.as_ptr(),
                value: value.as_ptr(),
            });
            strings.push(key);
            strings.push(value);
        }

        let body = completion.body;
        let (body_ptr, body_len) = match &body {
            Some(bytes) if !bytes.is_empty() => (bytes.as_ptr(), bytes.len()),
            _ => (std::ptr::null(), 0),
        };

        let raw = FfiCompletion {
            error: completion.error.into(),
            has_status: completion.status.is_some(),
            status: completion.status.unwrap_or(0),
            headers: if headers.is_empty() {
                std::ptr::null()
            } else {
                headers.as_ptr()
            },
            headers_len: headers.len() as u32,
            has_body: body.is_some(),
            body: body_ptr,
            body_len,
        };

        Self {
            _strings: strings,
            _headers: headers,
            _body: body,
            raw,
        }
    }
}
