pub mod bridge;
pub mod claims;
pub mod codec;
pub mod cookies;
pub mod role;
pub mod set_cookie;

pub use bridge::{Credentials, login, rotate_access_token};
pub use claims::{SessionClaims, SessionView, UserProfile};
pub use codec::SessionCodec;
pub use role::Role;
