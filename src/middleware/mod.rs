pub mod csrf;
pub mod https;
pub mod request_id;

pub use csrf::{csrf_protect, CsrfToken, CSRF_COOKIE, CSRF_FORM_FIELD, CSRF_HEADER};
pub use https::https_redirect;
pub use request_id::{make_span_with_request_id, request_id_middleware, RequestId};
