//! Services built on top of the registries.

pub mod link_service;
pub mod notification;
pub mod sweeper;

pub use link_service::LinkService;
pub use notification::{
    LinkNotification, NotificationKind, NotificationSink, Notifier, NullSink, UserInboxSink,
};
pub use sweeper::{EvictionSweeper, SweepReport};
