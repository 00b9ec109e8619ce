//! Business logic services.

#![allow(missing_docs)]

pub mod blog;
pub mod captcha;
pub mod comment;
pub mod email;
pub mod like;
pub mod media;
pub mod profile;
pub mod session;
pub mod user;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use blog::{AuthorRef, BlogDetail, BlogService, BlogSummary, CategoryRef, PublishInput};
pub use captcha::{CaptchaService, IssueCaptchaInput};
pub use comment::{CommentNode, CommentService, CreateCommentInput};
pub use email::{EmailMessage, LogMailer, Mailer, SmtpMailer, mailer_from_config};
pub use like::{LikeService, LikeToggle};
pub use media::{EditorImage, ImageFormat, MediaService, Upload};
pub use profile::{ChangePasswordInput, ProfileService, SettingsChange, SettingsUpdate, SettingsView};
pub use session::{SessionService, StartedSession};
pub use user::{LoginInput, RegisterInput, UserService};
