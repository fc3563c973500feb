// Upload endpoint: multipart intake → scoped slot on disk.

pub mod form;
pub mod handlers;
