/// Record types persisted by the controller
pub mod audio;
pub mod device;
pub mod location;
pub mod photo;
pub mod request;
pub mod video;

pub use audio::Audio;
pub use device::Device;
pub use location::Location;
pub use photo::Photo;
pub use request::Request;
pub use video::Video;
