pub mod health;
pub mod upload;

pub use health::{health_check, metrics_endpoint};
pub use upload::{delete_image, upload_image, upload_images};
