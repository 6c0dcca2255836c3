//! # vdpa-binding Common
//!
//! Shared utilities for the vDPA network binding components.
//!
//! ## Logging
//!
//! ```rust,no_run
//! use vdpa_binding_common::init_logging;
//!
//! init_logging("info").unwrap();
//! tracing::info!("binding sidecar ready");
//! ```

pub mod logging;

pub use logging::{
    init_logging,
    init_logging_json,
    init_logging_to_file,
    VDPA_LOG_FILE_PATH,
};
