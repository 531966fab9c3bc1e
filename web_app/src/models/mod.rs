pub mod call_request;
pub mod subscription;
