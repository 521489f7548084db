pub mod backlog;
pub mod export;
pub mod init;
pub mod sprint;
pub mod task;
pub mod ticket;
pub mod user;
