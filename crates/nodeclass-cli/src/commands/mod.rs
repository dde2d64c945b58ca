//! Command handlers grouped by concern.

pub(crate) mod classify;
pub(crate) mod password;
pub(crate) mod records;
pub(crate) mod users;
