//! FFI bindings for the Auxa lighting engine
//!
//! C-compatible functions for calling the engine from the host app. All
//! functions take null-terminated C strings and return allocated memory that
//! must be freed by the caller using `auxa_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::encoder::SettingsEncoder;
use crate::engine::{profile_to_lighting, profile_to_settings, LightingEngine};
use crate::error::LightingError;
use crate::profile::UserProfile;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Run `f` on the profile JSON argument, translating errors into the
/// thread-local error slot and a NULL return.
unsafe fn call_with_profile<F>(json: *const c_char, f: F) -> *mut c_char
where
    F: FnOnce(String) -> Result<String, LightingError>,
{
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid profile JSON string pointer");
            return ptr::null_mut();
        }
    };

    match f(json_str) {
        Ok(result) => string_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute the full settings payload for a profile document.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `auxa_free_string`.
/// - Returns NULL on error; call `auxa_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn auxa_profile_to_settings(json: *const c_char) -> *mut c_char {
    call_with_profile(json, profile_to_settings)
}

/// Compute only the lighting settings for a profile document.
///
/// # Safety
/// Same contract as `auxa_profile_to_settings`.
#[no_mangle]
pub unsafe extern "C" fn auxa_lighting_settings(json: *const c_char) -> *mut c_char {
    call_with_profile(json, profile_to_lighting)
}

/// Validate a profile document and return the report as JSON.
///
/// An invalid sensitivity score is reported, not returned as an error; NULL
/// is returned only for unreadable JSON.
///
/// # Safety
/// Same contract as `auxa_profile_to_settings`.
#[no_mangle]
pub unsafe extern "C" fn auxa_validate_profile(json: *const c_char) -> *mut c_char {
    call_with_profile(json, |json_str| {
        let report = UserProfile::from_json(&json_str)?.validate();
        Ok(serde_json::to_string(&report)?)
    })
}

// ============================================================================
// Engine handle
// ============================================================================

/// Opaque handle to a LightingEngine
pub struct LightingEngineHandle {
    engine: LightingEngine,
}

/// Create an engine. `instance_id` may be NULL to generate one.
///
/// # Safety
/// - `instance_id` must be NULL or a valid null-terminated C string.
/// - Must be freed with `auxa_engine_free`.
#[no_mangle]
pub unsafe extern "C" fn auxa_engine_new(instance_id: *const c_char) -> *mut LightingEngineHandle {
    clear_last_error();

    let encoder = match cstr_to_string(instance_id) {
        Some(id) => SettingsEncoder::with_instance_id(id),
        None => SettingsEncoder::new(),
    };
    let handle = Box::new(LightingEngineHandle {
        engine: LightingEngine::with_encoder(encoder),
    });
    Box::into_raw(handle)
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `auxa_engine_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn auxa_engine_free(engine: *mut LightingEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Evaluate a profile document with an engine's instance id.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `auxa_engine_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `auxa_free_string`.
#[no_mangle]
pub unsafe extern "C" fn auxa_engine_evaluate(
    engine: *const LightingEngineHandle,
    json: *const c_char,
) -> *mut c_char {
    if engine.is_null() {
        clear_last_error();
        set_last_error("Null engine handle");
        return ptr::null_mut();
    }
    let handle = &*engine;
    call_with_profile(json, |json_str| handle.engine.evaluate_json(&json_str))
}

// ============================================================================
// Memory, errors, version
// ============================================================================

/// Free a string returned by an Auxa function.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an Auxa function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn auxa_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the last error message.
///
/// # Safety
/// - The returned pointer is valid until the next Auxa call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn auxa_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn auxa_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile_json() -> CString {
        CString::new(
            r#"{
                "lightSensitivity": 4,
                "overwhelmedByLight": "yes",
                "primaryUsage": ["Home"],
                "notificationPreference": "always"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_profile_to_settings() {
        let json = sample_profile_json();

        unsafe {
            let result = auxa_profile_to_settings(json.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let payload: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert_eq!(payload["sensitivityLevel"], "high");
            assert_eq!(
                payload["settings"]["notifications"]["notifyOnAdjustment"],
                true
            );

            auxa_free_string(result);
        }
    }

    #[test]
    fn test_ffi_lighting_settings() {
        let json = sample_profile_json();

        unsafe {
            let result = auxa_lighting_settings(json.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.contains("calmMode"));
            assert!(result_str.contains("locationBased"));

            auxa_free_string(result);
        }
    }

    #[test]
    fn test_ffi_validate_profile() {
        let json = CString::new(r#"{"lightSensitivity": 9, "primaryUsage": ["Moon"]}"#).unwrap();

        unsafe {
            let result = auxa_validate_profile(json.as_ptr());
            assert!(!result.is_null());

            let report: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(result).to_str().unwrap()).unwrap();
            assert_eq!(report["valid"], false);
            assert_eq!(report["unrecognized_tags"][0]["value"], "Moon");

            auxa_free_string(result);
        }
    }

    #[test]
    fn test_ffi_engine_lifecycle() {
        let instance = CString::new("kiosk-1").unwrap();
        let json = sample_profile_json();

        unsafe {
            let engine = auxa_engine_new(instance.as_ptr());
            assert!(!engine.is_null());

            let result = auxa_engine_evaluate(engine, json.as_ptr());
            assert!(!result.is_null());
            let payload: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(result).to_str().unwrap()).unwrap();
            assert_eq!(payload["producer"]["instanceId"], "kiosk-1");

            auxa_free_string(result);
            auxa_engine_free(engine);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid = CString::new(r#"{"lightSensitivity": 0}"#).unwrap();
            let result = auxa_profile_to_settings(invalid.as_ptr());
            assert!(result.is_null());

            let error = auxa_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.starts_with("Invalid profile"));

            let result = auxa_profile_to_settings(ptr::null());
            assert!(result.is_null());
            assert!(!auxa_last_error().is_null());

            let result = auxa_engine_evaluate(ptr::null(), invalid.as_ptr());
            assert!(result.is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = auxa_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
