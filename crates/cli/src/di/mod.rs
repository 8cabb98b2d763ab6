mod dns;
mod tls;

pub use dns::DnsServices;
pub use tls::CertificateServices;
