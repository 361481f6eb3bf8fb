pub mod assignment;
pub mod hackathon;
pub mod organization;
pub mod policy;
pub mod rating;
pub mod submission;
pub mod team;
pub mod timeline;
pub mod user;

pub use assignment::*;
pub use hackathon::*;
pub use organization::*;
pub use rating::*;
pub use submission::*;
pub use team::*;
pub use timeline::*;
pub use user::*;
