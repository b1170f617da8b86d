pub mod career;
pub mod cocurricular;
pub mod faculty;
pub mod hod;
pub mod internship;
pub mod meeting;
pub mod mentorship;
pub mod message;
pub mod principal;
pub mod problem;
pub mod project;
pub mod request;
pub mod semester;
pub mod student;
