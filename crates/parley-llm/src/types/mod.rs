pub mod content;
pub mod message;
pub mod shape;

pub use content::{sniff_image_mime, Content, ContentPart, ImageUrl};
pub use message::Message;
pub use shape::{ModelFamily, RequestShape};
