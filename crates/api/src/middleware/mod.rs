//! HTTP middleware components.

pub mod logging;
pub mod metrics;
pub mod security_headers;
pub mod trace_id;
pub mod user_auth;

#[allow(unused_imports)] // Re-exports for downstream use
pub use metrics::{init_metrics, metrics_handler, metrics_middleware};
#[allow(unused_imports)] // Re-exports for downstream use
pub use security_headers::security_headers_middleware;
#[allow(unused_imports)] // Re-exports for downstream use
pub use trace_id::{trace_id, RequestId, REQUEST_ID_HEADER};
#[allow(unused_imports)] // Re-exports for downstream use
pub use user_auth::{
    acting_user_id, optional_user_auth, require_admin_auth, require_user_auth, UserAuth,
};
