pub mod birth;
pub mod message;

pub use birth::{BirthDetails, BirthForm, FormError, Gender};
pub use message::{Message, MessageBody, RenderMode, Sender};
