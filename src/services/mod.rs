pub mod internship;
pub mod placement;
pub mod recommend;
pub mod records;
pub mod student;
pub mod upload;
