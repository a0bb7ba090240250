//! Domain layer: value objects, messages, the session state machine and the
//! transport interface the session depends on.

pub mod error;
pub mod log;
pub mod message;
pub mod repository;
pub mod state;
pub mod transport;
pub mod value_object;

pub use error::{ClientError, SendRejection, TransportError, ValueObjectError};
pub use log::{LoggedMessage, MessageLog};
pub use message::{ChatMessage, MessageType};
pub use repository::NicknameRepository;
pub use state::{SessionEvent, SessionState, StateError};
pub use transport::{Connector, Delivery, Transport};
pub use value_object::{MessageContent, Nickname, RoomId};
