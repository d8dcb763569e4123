// Authentication primitives: password hashing, JWT and webhook signatures

pub mod jwt;
pub mod password;
pub mod signature;
