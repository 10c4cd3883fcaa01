//! Request extractors for authentication and device context.

pub mod auth;
pub mod device;
pub mod rbac;

pub use auth::AuthUser;
pub use device::Device;
pub use rbac::RequireAdmin;
