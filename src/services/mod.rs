//! Business logic over the store collaborators. Services raise modeled
//! domain conditions as typed errors; controllers stay thin.

pub mod comments;
pub mod offers;
pub mod users;

pub use comments::CommentService;
pub use offers::OfferService;
pub use users::UserService;
