pub mod emails;
pub mod health_check;

pub use emails::{
    handle_create_email, handle_delete_email, handle_get_email, handle_get_email_batch,
    handle_update_email, json_error_handler, method_not_allowed,
};
pub use health_check::health_check;
