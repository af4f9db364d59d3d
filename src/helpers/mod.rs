pub mod distance;
pub mod handler_404;
