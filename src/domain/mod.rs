pub mod user;
pub mod resume;
pub mod resume_template;
pub mod announcement;

pub use user::*;
pub use resume::*;
pub use resume_template::*;
pub use announcement::*;
