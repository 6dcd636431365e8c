pub mod gate;
pub mod jwt;
pub mod middleware;
pub mod password;
