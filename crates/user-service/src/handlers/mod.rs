mod users;

pub use users::{
    create_user, delete_user, get_user, list_users, login, search_users, update_status,
    update_user,
};
