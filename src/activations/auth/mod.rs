mod activation;
mod methods;

pub use activation::Auth;
pub use methods::AuthMethod;
