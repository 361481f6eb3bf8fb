pub mod assignments;
pub mod auth;
pub mod hackathons;
pub mod organizations;
pub mod ratings;
pub mod root;
pub mod submissions;
pub mod teams;
pub mod users;
