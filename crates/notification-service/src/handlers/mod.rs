mod notifications;

pub use notifications::{
    create_notification, delete_notification, list_user_notifications, update_status,
};
