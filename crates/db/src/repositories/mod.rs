//! Database repositories.

mod blog;
mod blog_category;
mod blog_comment;
mod blog_like;
mod captcha;
mod comment_like;
mod session;
mod user;
mod user_profile;

pub use blog::BlogRepository;
pub use blog_category::BlogCategoryRepository;
pub use blog_comment::BlogCommentRepository;
pub use blog_like::BlogLikeRepository;
pub use captcha::CaptchaRepository;
pub use comment_like::CommentLikeRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
pub use user_profile::UserProfileRepository;
