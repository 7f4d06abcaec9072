pub mod api_utils;
pub mod download;
