//! Shared contracts between the LedgerLift client and the cleanup backend:
//! rule and fix catalogs, the validation report aggregate, endpoint DTOs and
//! the client error taxonomy. Nothing in here depends on the browser, so the
//! reconciliation logic is testable on the host.

pub mod api;
pub mod fixes;
pub mod report;
pub mod rules;
