//! 预约表单处理：校验、提交、通知。
//!
//! `BookingHandler` 通过构造参数拿到三个协作者：输入面（表单）、通知槽、存储层。
//! 同一个 handler 同一时刻只允许一次提交在途。

mod handler;
mod notify;
mod session;
mod store;
mod surface;
pub mod validate;

pub use handler::{Ack, BookingError, BookingSettings};
pub use notify::Notification;
pub use session::{BookingSession, SessionRegistry};
pub use store::{AppointmentStore, StoreError};
