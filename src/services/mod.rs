pub mod api;
pub mod board;
pub mod booking_flow;
pub mod booking_form;
pub mod cancellation;
pub mod grouping;
pub mod poller;
