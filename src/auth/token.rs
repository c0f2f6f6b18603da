//! Access token models handed from the credential issuer to the fetcher.

pub mod record;
pub mod secret;
