// Routing segregation: Public (no gates), Authenticated (authentication
// gate), Admin (authentication gate + role gates). Gate order per route is
// fixed at composition time; a rejection at any gate terminates the request
// before later gates or the handler run.
pub mod admin;
pub mod authenticated;
pub mod public;
