//! FFI bindings for Journal Insights
//!
//! This module provides C-compatible functions for calling the engine from the
//! mobile and web clients. All functions use C strings (null-terminated) and
//! return allocated memory that must be freed by the caller using
//! `insights_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::calendar::parse_day;
use crate::classification::Classification;
use crate::config::InsightsConfig;
use crate::error::InsightsError;
use crate::pipeline::{entries_to_dashboard, DashboardProcessor};
use crate::scoring;
use crate::types::Entry;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Return the string or record the error and return NULL
fn result_to_cstr(result: Result<String, InsightsError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute an encoded dashboard from a JSON array of entries.
///
/// # Safety
/// - `json` and `today` (`YYYY-MM-DD`) must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `insights_free_string`.
/// - Returns NULL on error; call `insights_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insights_entries_to_dashboard(
    json: *const c_char,
    today: *const c_char,
    utc_offset_minutes: i32,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let today_str = match cstr_to_string(today) {
        Some(s) => s,
        None => {
            set_last_error("Invalid date string pointer");
            return ptr::null_mut();
        }
    };

    result_to_cstr(entries_to_dashboard(json_str, today_str, utc_offset_minutes))
}

/// Mood score (0-5) for a classifier label; neutral (3) for NULL or unknown labels.
///
/// # Safety
/// - `label` must be a valid null-terminated C string or NULL.
#[no_mangle]
pub unsafe extern "C" fn insights_score_label(label: *const c_char) -> i32 {
    let label = cstr_to_string(label);
    i32::from(scoring::score(label.as_deref()))
}

/// Apply classifier output to an entry document and return the updated entry.
///
/// # Safety
/// - `entry_json` and `classifier_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `insights_free_string`.
/// - Returns NULL on error; call `insights_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insights_apply_classification(
    entry_json: *const c_char,
    classifier_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let entry = cstr_to_string(entry_json);
    let classifier = cstr_to_string(classifier_json);
    let (entry_str, classifier_str) = match (entry, classifier) {
        (Some(entry), Some(classifier)) => (entry, classifier),
        _ => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let result = (|| -> Result<String, InsightsError> {
        let entry: Entry = serde_json::from_str(&entry_str)?;
        let classification = Classification::from_provider_json(&classifier_str)?;
        Ok(serde_json::to_string(&entry.with_classification(&classification))?)
    })();

    result_to_cstr(result)
}

// ============================================================================
// Stateful API
// ============================================================================

/// Opaque handle to a DashboardProcessor
pub struct DashboardProcessorHandle {
    processor: DashboardProcessor,
}

/// Create a new DashboardProcessor from a JSON configuration.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string, or NULL for defaults.
/// - Returns a pointer to a newly allocated processor.
/// - Must be freed with `insights_processor_free`.
/// - Returns NULL on error; call `insights_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insights_processor_new(
    config_json: *const c_char,
) -> *mut DashboardProcessorHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        Ok(InsightsConfig::default())
    } else {
        match cstr_to_string(config_json) {
            Some(s) => InsightsConfig::from_json(&s),
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        }
    };

    match config.and_then(DashboardProcessor::with_config) {
        Ok(processor) => Box::into_raw(Box::new(DashboardProcessorHandle { processor })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a DashboardProcessor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `insights_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn insights_processor_free(processor: *mut DashboardProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Compute an encoded dashboard with a stateful processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `insights_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - `today` must be a valid null-terminated `YYYY-MM-DD` C string, or NULL
///   for the current day on the processor's calendar.
/// - Returns a newly allocated string that must be freed with `insights_free_string`.
/// - Returns NULL on error; call `insights_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insights_processor_process(
    processor: *mut DashboardProcessorHandle,
    json: *const c_char,
    today: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let day = if today.is_null() {
        Ok(handle.processor.today())
    } else {
        match cstr_to_string(today) {
            Some(s) => parse_day(&s),
            None => {
                set_last_error("Invalid date string pointer");
                return ptr::null_mut();
            }
        }
    };

    result_to_cstr(day.and_then(|day| handle.processor.process_json(&json_str, day)))
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Journal Insights functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an `insights_*` function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn insights_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next `insights_*` call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn insights_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn insights_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entries_json() -> CString {
        CString::new(
            r#"[
                {"id": "a", "timestamp": "2024-06-10T09:00:00Z",
                 "moodLabel": "joy", "sleepHours": 7},
                {"id": "b", "timestamp": "2024-06-09T21:00:00Z", "moodLabel": "sadness"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_entries_to_dashboard() {
        let json = sample_entries_json();
        let today = CString::new("2024-06-10").unwrap();

        unsafe {
            let result = insights_entries_to_dashboard(json.as_ptr(), today.as_ptr(), 0);
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let payload: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert_eq!(payload["dashboard"]["summary"]["current_streak"], 2);

            insights_free_string(result);
        }
    }

    #[test]
    fn test_ffi_processor_lifecycle() {
        unsafe {
            let config =
                CString::new(r#"{"trend_window_days": 3, "utc_offset_minutes": 0}"#).unwrap();
            let processor = insights_processor_new(config.as_ptr());
            assert!(!processor.is_null());

            let json = sample_entries_json();
            let today = CString::new("2024-06-10").unwrap();
            let result = insights_processor_process(processor, json.as_ptr(), today.as_ptr());
            assert!(!result.is_null());

            let payload: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(result).to_str().unwrap()).unwrap();
            assert_eq!(payload["dashboard"]["trend"].as_array().unwrap().len(), 3);

            insights_free_string(result);
            insights_processor_free(processor);

            let defaults = insights_processor_new(ptr::null());
            assert!(!defaults.is_null());
            insights_processor_free(defaults);
        }
    }

    #[test]
    fn test_ffi_invalid_config() {
        unsafe {
            let config = CString::new(r#"{"trend_window_days": 0}"#).unwrap();
            let processor = insights_processor_new(config.as_ptr());
            assert!(processor.is_null());
            assert!(!insights_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_apply_classification() {
        let entry = CString::new(r#"{"id": "a", "timestamp": "2024-06-10T09:00:00Z"}"#).unwrap();
        let output = CString::new(
            r#"[[{"label": "fear", "score": 0.7}, {"label": "joy", "score": 0.2}]]"#,
        )
        .unwrap();

        unsafe {
            let result = insights_apply_classification(entry.as_ptr(), output.as_ptr());
            assert!(!result.is_null());

            let updated: Entry =
                serde_json::from_str(CStr::from_ptr(result).to_str().unwrap()).unwrap();
            assert_eq!(updated.mood_label.as_deref(), Some("fear"));
            assert_eq!(updated.mood_confidence, Some(0.7));

            insights_free_string(result);
        }
    }

    #[test]
    fn test_ffi_score_label() {
        let joy = CString::new("Joy").unwrap();
        unsafe {
            assert_eq!(insights_score_label(joy.as_ptr()), 5);
            assert_eq!(insights_score_label(ptr::null()), 3);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid_json = CString::new("not json").unwrap();
            let today = CString::new("2024-06-10").unwrap();

            let result = insights_entries_to_dashboard(invalid_json.as_ptr(), today.as_ptr(), 0);
            assert!(result.is_null());

            let error = insights_last_error();
            assert!(!error.is_null());

            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(!error_str.is_empty());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = insights_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
