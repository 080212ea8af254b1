pub mod webhook_request;
pub mod webhook_route;
