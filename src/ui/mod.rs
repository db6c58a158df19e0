mod banner;
mod colors;
mod footer;
mod form;
mod header;
pub mod plain;
mod popup;
mod render;
mod results;
mod section;

pub use render::render;
