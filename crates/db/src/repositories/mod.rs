//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod address_repo;
pub mod approval_repo;
pub mod category_repo;
pub mod comment_repo;
pub mod event_repo;
pub mod notification_repo;
pub mod prescription_repo;
pub mod project_client_repo;
pub mod project_repo;
pub mod resource_repo;
pub mod role_repo;
pub mod session_repo;
pub mod space_repo;
pub mod upload_repo;
pub mod user_repo;

pub use address_repo::AddressRepo;
pub use approval_repo::ApprovalRepo;
pub use category_repo::CategoryRepo;
pub use comment_repo::CommentRepo;
pub use event_repo::EventRepo;
pub use notification_repo::NotificationRepo;
pub use prescription_repo::PrescriptionRepo;
pub use project_client_repo::ProjectClientRepo;
pub use project_repo::ProjectRepo;
pub use resource_repo::ResourceRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use space_repo::SpaceRepo;
pub use upload_repo::{ClientPhotoRepo, ProjectFileRepo};
pub use user_repo::UserRepo;
