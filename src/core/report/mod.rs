pub mod aggregate;
pub mod html;
pub mod table;
