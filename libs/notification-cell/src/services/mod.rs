pub mod dispatcher;
pub mod notifier;

pub use dispatcher::NotificationDispatcher;
pub use notifier::{LogNotifier, Notifier, WebhookNotifier};
