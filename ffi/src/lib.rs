//! C-ABI wrapper around `rest-core`.
//!
//! # Overview
//! Exposes the five verbs through `extern "C"` functions so any language
//! with a C FFI can issue requests and receive the outcome through a plain
//! function pointer, without touching Rust's async runtime directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - A session owns a multi-thread tokio runtime plus one `RestClient`, so
//!   all requests through it share one connection pool.
//! - A verb returns `FfiStatus::Ok` only after the request is spawned; the
//!   callback then fires exactly once on a runtime worker thread. Any other
//!   status means nothing was dispatched.
//! - Completion data is borrowed for the duration of the callback and freed
//!   by this library afterwards.

pub mod types;

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use rest_core::{Headers, HttpMethod, ReqwestTransport, Resource, RestClient, TransportConfig};
use tracing_subscriber::EnvFilter;

use types::*;

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Install a `tracing` subscriber that writes to stderr, filtered by
/// `RUST_LOG` (default `info`).
///
/// Returns false if a global subscriber was already installed.
#[unsafe(no_mangle)]
pub extern "C" fn rest_init_logging() -> bool {
    catch_unwind(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok()
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

/// Create a transport session. `timeout_ms` of 0 means no request timeout.
///
/// Returns null if the runtime or HTTP client cannot be built.
/// The caller must free the returned pointer with `rest_session_free`.
#[unsafe(no_mangle)]
pub extern "C" fn rest_session_new(timeout_ms: u64) -> *mut FfiSession {
    catch_unwind(|| {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("rest-ffi")
            .build()
        {
            Ok(runtime) => runtime,
            Err(_) => return std::ptr::null_mut(),
        };

        let config = TransportConfig {
            timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
            ..TransportConfig::default()
        };
        let transport = {
            let _guard = runtime.enter();
            match ReqwestTransport::new(&config) {
                Ok(transport) => transport,
                Err(_) => return std::ptr::null_mut(),
            }
        };

        let client = RestClient::new(Arc::new(transport), runtime.handle().clone());
        Box::into_raw(Box::new(FfiSession { client, runtime }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a session created by `rest_session_new`. Safe to call with null.
///
/// Requests still in flight are dropped and their callbacks never fire.
/// Must not be called from inside a completion callback.
#[unsafe(no_mangle)]
pub extern "C" fn rest_session_free(session: *mut FfiSession) {
    if !session.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            let FfiSession { runtime, .. } = *unsafe { Box::from_raw(session) };
            runtime.shutdown_background();
        }));
    }
}

// ---------------------------------------------------------------------------
// Resource lifecycle
// ---------------------------------------------------------------------------

/// Create a resource from `scheme`, `host` and a pre-encoded `path`.
///
/// Returns null if any argument is null or not valid UTF-8.
/// The caller must free the returned pointer with `rest_resource_free`.
#[unsafe(no_mangle)]
pub extern "C" fn rest_resource_new(
    scheme: *const c_char,
    host: *const c_char,
    path: *const c_char,
) -> *mut FfiResource {
    catch_unwind(|| {
        let (Ok(scheme), Ok(host), Ok(path)) = (
            unsafe { read_str(scheme) },
            unsafe { read_str(host) },
            unsafe { read_str(path) },
        ) else {
            return std::ptr::null_mut();
        };
        Box::into_raw(Box::new(FfiResource {
            inner: Resource::new(scheme, host, path),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a resource created by `rest_resource_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rest_resource_free(resource: *mut FfiResource) {
    if !resource.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(resource) });
        });
    }
}

// ---------------------------------------------------------------------------
// Verbs
// ---------------------------------------------------------------------------

/// Issue a GET. A null `callback` discards the outcome.
#[unsafe(no_mangle)]
pub extern "C" fn rest_get(
    session: *const FfiSession,
    resource: *const FfiResource,
    headers: *const FfiHeader,
    headers_len: u32,
    callback: Option<FfiCompletionCallback>,
    user_data: *mut c_void,
) -> FfiStatus {
    dispatch(
        session,
        resource,
        HttpMethod::Get,
        (headers, headers_len),
        (std::ptr::null(), 0),
        callback,
        user_data,
    )
}

/// Issue a PUT. A null `body` sends no body; a null `callback` discards the
/// outcome.
#[unsafe(no_mangle)]
pub extern "C" fn rest_put(
    session: *const FfiSession,
    resource: *const FfiResource,
    headers: *const FfiHeader,
    headers_len: u32,
    body: *const u8,
    body_len: usize,
    callback: Option<FfiCompletionCallback>,
    user_data: *mut c_void,
) -> FfiStatus {
    dispatch(
        session,
        resource,
        HttpMethod::Put,
        (headers, headers_len),
        (body, body_len),
        callback,
        user_data,
    )
}

/// Issue a POST. A null `body` sends no body; a null `callback` discards
/// the outcome.
#[unsafe(no_mangle)]
pub extern "C" fn rest_post(
    session: *const FfiSession,
    resource: *const FfiResource,
    headers: *const FfiHeader,
    headers_len: u32,
    body: *const u8,
    body_len: usize,
    callback: Option<FfiCompletionCallback>,
    user_data: *mut c_void,
) -> FfiStatus {
    dispatch(
        session,
        resource,
        HttpMethod::Post,
        (headers, headers_len),
        (body, body_len),
        callback,
        user_data,
    )
}

/// Issue a DELETE. A null `callback` discards the outcome.
#[unsafe(no_mangle)]
pub extern "C" fn rest_delete(
    session: *const FfiSession,
    resource: *const FfiResource,
    headers: *const FfiHeader,
    headers_len: u32,
    callback: Option<FfiCompletionCallback>,
    user_data: *mut c_void,
) -> FfiStatus {
    dispatch(
        session,
        resource,
        HttpMethod::Delete,
        (headers, headers_len),
        (std::ptr::null(), 0),
        callback,
        user_data,
    )
}

/// Issue a HEAD. A null `callback` discards the outcome.
#[unsafe(no_mangle)]
pub extern "C" fn rest_head(
    session: *const FfiSession,
    resource: *const FfiResource,
    headers: *const FfiHeader,
    headers_len: u32,
    callback: Option<FfiCompletionCallback>,
    user_data: *mut c_void,
) -> FfiStatus {
    dispatch(
        session,
        resource,
        HttpMethod::Head,
        (headers, headers_len),
        (std::ptr::null(), 0),
        callback,
        user_data,
    )
}

/// Validate arguments, copy everything the request needs out of C memory,
/// and hand it to the session's `RestClient`.
fn dispatch(
    session: *const FfiSession,
    resource: *const FfiResource,
    method: HttpMethod,
    (headers, headers_len): (*const FfiHeader, u32),
    (body, body_len): (*const u8, usize),
    callback: Option<FfiCompletionCallback>,
    user_data: *mut c_void,
) -> FfiStatus {
    catch_unwind(AssertUnwindSafe(|| {
        if session.is_null() || resource.is_null() {
            return FfiStatus::NullArg;
        }
        let session = unsafe { &*session };
        let resource = unsafe { &(*resource).inner };
        let headers = match unsafe { read_headers(headers, headers_len) } {
            Ok(headers) => headers,
            Err(status) => return status,
        };
        let body = if body.is_null() {
            None
        } else {
            Some(unsafe { std::slice::from_raw_parts(body, body_len) }.to_vec())
        };

        let user_data = UserData::new(user_data);
        let completion = move |completion| {
            if let Some(callback) = callback {
                let owned = OwnedCompletion::new(completion);
                callback(user_data.get(), &owned.raw);
            }
        };

        let client = &session.client;
        match method {
            HttpMethod::Get => client.get(resource, headers, completion),
            HttpMethod::Put => client.put(resource, headers, body, completion),
            HttpMethod::Post => client.post(resource, headers, body, completion),
            HttpMethod::Delete => client.delete(resource, headers, completion),
            HttpMethod::Head => client.head(resource, headers, completion),
        }
        FfiStatus::Ok
    }))
    .unwrap_or(FfiStatus::Panic)
}

/// Read a borrowed C string as an owned `String`.
unsafe fn read_str(ptr: *const c_char) -> Result<String, FfiStatus> {
    if ptr.is_null() {
        return Err(FfiStatus::NullArg);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(str::to_string)
        .map_err(|_| FfiStatus::InvalidUtf8)
}

/// Copy a caller-supplied header array. A null pointer or zero length means
/// no headers.
unsafe fn read_headers(ptr: *const FfiHeader, len: u32) -> Result<Option<Headers>, FfiStatus> {
    if ptr.is_null() || len == 0 {
        return Ok(None);
    }
    let raw = unsafe { std::slice::from_raw_parts(ptr, len as usize) };
    let mut headers = Headers::with_capacity(raw.len());
    for header in raw {
        let key = unsafe { read_str(header.key) }?;
        let value = unsafe { read_str(header.value) }?;
        headers.insert(key, value);
    }
    Ok(Some(headers))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
