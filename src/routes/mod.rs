/// Router Module Index
///
/// One router module per resource, mirroring the URL namespaces. Authentication
/// is enforced per-handler by the `AuthUser` extractor, so public and protected
/// methods can share a path (e.g. GET vs POST `/blog/`).
pub mod blog;
pub mod category;
pub mod comment;
pub mod user;
