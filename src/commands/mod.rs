pub mod decrypt;
pub mod delete;
pub mod encrypt;
pub mod extract;
pub mod info;
pub mod insert;
pub mod merge;
pub mod remove;
pub mod reverse;
pub mod rotate;
pub mod scale;
pub mod split;
