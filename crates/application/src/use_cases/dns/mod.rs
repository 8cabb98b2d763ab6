mod handle_dns_query;
mod resolve_query;

pub use handle_dns_query::HandleDnsQueryUseCase;
pub use resolve_query::ResolveQueryUseCase;
