mod identity;

pub use identity::{get_current_user, CurrentUser};
