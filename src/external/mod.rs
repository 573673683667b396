pub mod cognito;
pub mod identity;
pub mod memory;

pub use cognito::CognitoProvider;
pub use identity::{
    AuthTokens, DynIdentityProvider, IdentityError, IdentityProvider, IdentityResult,
};
pub use memory::MemoryProvider;
