pub mod font;
pub mod fragment;
pub mod raster;
pub mod surface;
pub mod text_layout;
