//! Database entities.

#![allow(missing_docs)]

pub mod blog;
pub mod blog_category;
pub mod blog_comment;
pub mod blog_like;
pub mod captcha;
pub mod comment_like;
pub mod session;
pub mod user;
pub mod user_profile;

pub use blog::Entity as Blog;
pub use blog_category::Entity as BlogCategory;
pub use blog_comment::Entity as BlogComment;
pub use blog_like::Entity as BlogLike;
pub use captcha::Entity as Captcha;
pub use comment_like::Entity as CommentLike;
pub use session::Entity as Session;
pub use user::Entity as User;
pub use user_profile::Entity as UserProfile;
