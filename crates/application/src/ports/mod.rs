mod doh_dispatcher;

pub use doh_dispatcher::DohDispatcher;
