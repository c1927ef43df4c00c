//! Who is acting: the closed role set and the session store that holds the active role.
//! Keep the public surface thin and split implementation across sub-modules.

mod role;
mod session;

pub use role::{Role, RoleParseError};
pub use session::{SessionStore, ROLE_KEY};
