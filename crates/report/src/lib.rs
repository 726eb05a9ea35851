//! Daily digest: turns one aggregation cycle into a dated row list, a
//! German-language HTML mail body, and an outgoing email.

pub mod digest;
pub mod mailer;

pub use digest::{render_html, DailyReport, ReportRow};
pub use mailer::{DispatchError, ReportMailer};
