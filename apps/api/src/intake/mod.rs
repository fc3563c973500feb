// Input interface: resume selection, job description entry, submission lifecycle.
// Validation happens here, before any network call.

pub mod form;
pub mod notification;
pub mod validation;
