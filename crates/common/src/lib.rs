/**
 * Typed access to the FileFlow REST backend.
 *  - `ApiClient` dispatches requests, attaching credentials
 *    and handling session expiry in one place
 *  - `v1` holds one request type per endpoint
 */
pub mod api;
/**
 * Login, registration and logout flows that
 *  keep the session store in step with the backend.
 */
pub mod auth;
/**
 * Debounced search-as-you-type.
 */
pub mod search;
/**
 * Upload-then-share orchestration.
 */
pub mod send;
/**
 * The single source of truth for who is logged in.
 */
pub mod session;
/**
 * Three-phase upload orchestration with progress events.
 */
pub mod upload;
pub mod validation;

pub mod prelude {
    pub use crate::api::v1::{FolderCategory, Transaction, User};
    pub use crate::api::{ApiClient, ApiError, ApiRequest, LoginRedirect};
    pub use crate::search::{Debouncer, SearchResults, SearchSession, DEFAULT_DEBOUNCE};
    pub use crate::send::{Attachment, FileSender, SendError, SendReceipt, SendRequest};
    pub use crate::session::{Session, SessionStore};
    pub use crate::upload::{
        UploadError, UploadEvent, UploadPhase, UploadTask, UploadedFile, Uploader,
    };
    pub use crate::validation::{ValidationError, MAX_UPLOAD_BYTES};
}
