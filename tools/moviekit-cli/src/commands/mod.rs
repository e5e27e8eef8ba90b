pub mod check;
pub mod concat;
pub mod edit;
pub mod info;
pub mod screenshot;
