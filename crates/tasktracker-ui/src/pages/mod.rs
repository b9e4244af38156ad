//! One controller module per page: a state struct, the events its requests
//! resolve to, pure reducers over both, and the spawn helpers that run the
//! requests on the runtime.

pub mod dashboard;
pub mod login;
pub mod project_detail;
pub mod project_form;
pub mod signup;
