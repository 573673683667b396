pub mod password;
pub mod secret_hash;
pub mod time;
pub mod validate;

pub use password::{hash_password, validate_password, verify_password};
pub use secret_hash::secret_hash;
pub use time::now_iso;
pub use validate::*;
