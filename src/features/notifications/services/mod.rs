mod dispatcher;
mod notification_service;

pub use dispatcher::NotificationDispatcher;
pub use notification_service::NotificationService;
