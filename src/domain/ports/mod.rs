mod image_scaler_port;
mod notification_port;
mod remote_fetch_port;
mod vault_port;

pub use image_scaler_port::ImageScalerPort;
pub use notification_port::NotificationPort;
pub use remote_fetch_port::RemoteFetchPort;
pub use vault_port::{VaultPort, numbered_variant};
