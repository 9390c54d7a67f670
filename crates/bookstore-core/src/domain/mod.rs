//! 도서 재고 운영을 위한 도메인 모델.

mod book;
mod role;
mod user;

pub use book::*;
pub use role::*;
pub use user::*;
