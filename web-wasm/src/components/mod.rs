pub mod camera_view;
pub mod error_banner;
pub mod header;
pub mod mode_selector;
pub mod result_panel;
pub mod upload_area;
